//! High-level service facade deciding what to announce and handing it to the relay.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};

use crate::message::{EraTable, date_heading, notification_message};
use crate::model::{Day, TrashCategory};
use crate::ports::{Delivery, RelayPort};
use crate::schedule::CollectionScheduleCalculator;
use crate::window::NotificationWindow;

/// Dates with known collections, used by [`NotifyService::self_test`].
const REFERENCE_CASES: [((i32, u32, u32), &[TrashCategory]); 8] = [
    ((2025, 4, 7), &[TrashCategory::Burnable]),
    ((2025, 4, 2), &[TrashCategory::PetBottle]),
    ((2025, 4, 4), &[TrashCategory::NonBurnable]),
    ((2025, 4, 11), &[TrashCategory::Recyclable]),
    ((2026, 1, 2), &[]),
    ((2026, 1, 16), &[TrashCategory::NonBurnable]),
    ((2026, 1, 9), &[TrashCategory::Recyclable]),
    ((2026, 2, 6), &[TrashCategory::NonBurnable]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What happened to a single message.
pub enum DeliveryStatus {
    /// The relay accepted it.
    Sent,
    /// No endpoint configured, nothing sent.
    Skipped,
    /// The relay failed; the error has been logged.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a scheduled notification run.
pub enum NotifyOutcome {
    /// The run happened between the morning and evening hours.
    OutsideWindow {
        /// Hour of the run.
        hour: u32,
    },
    /// Nothing is collected on the day in question.
    NoCollection {
        /// Day that was checked.
        day: Day,
        /// Its date.
        date: NaiveDate,
    },
    /// A message was built and handed to the relay.
    Delivered {
        /// Day announced.
        day: Day,
        /// Its date.
        date: NaiveDate,
        /// Categories announced.
        categories: Vec<TrashCategory>,
        /// Relay result.
        status: DeliveryStatus,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Counters for a digest run.
pub struct DigestReport {
    /// Collection days in the requested range.
    pub total: usize,
    /// Messages accepted by the relay.
    pub sent: usize,
    /// Messages the relay failed on.
    pub failed: usize,
    /// Messages not sent because no endpoint is configured.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One reference date checked by the self-test.
pub struct SelfTestCase {
    /// Date checked.
    pub date: NaiveDate,
    /// Categories the city calendar lists.
    pub expected: Vec<TrashCategory>,
    /// Categories the calculator returned.
    pub actual: Vec<TrashCategory>,
}

impl SelfTestCase {
    /// Whether the calculator agrees with the calendar.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Results of [`NotifyService::self_test`].
pub struct SelfTestReport {
    /// Every case in reference order.
    pub cases: Vec<SelfTestCase>,
}

impl SelfTestReport {
    /// Number of passing cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|case| case.passed()).count()
    }

    /// Whether every case passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(SelfTestCase::passed)
    }
}

/// Public entry point for scheduled notifications.
pub struct NotifyService {
    calculator: CollectionScheduleCalculator,
    eras: EraTable,
    window: NotificationWindow,
    relay: Arc<dyn RelayPort>,
}

impl NotifyService {
    /// Create a new service bound to the provided relay.
    #[must_use]
    pub fn new(
        calculator: CollectionScheduleCalculator,
        eras: EraTable,
        window: NotificationWindow,
        relay: Arc<dyn RelayPort>,
    ) -> Self {
        Self {
            calculator,
            eras,
            window,
            relay,
        }
    }

    /// Notification text for `day` relative to `today`, if anything is collected.
    #[must_use]
    pub fn message_for(&self, day: Day, today: NaiveDate) -> Option<String> {
        let date = day.resolve(today)?;
        let categories = self.calculator.categories_for(date);
        notification_message(day.label(), &categories, date, &self.eras)
    }

    /// Post a message and report whether the relay accepted it.
    ///
    /// Failures and a missing endpoint are logged and yield `false`.
    pub async fn deliver(&self, message: &str) -> bool {
        self.dispatch(message).await == DeliveryStatus::Sent
    }

    /// Run one scheduled notification at `now`.
    ///
    /// `forced` bypasses the notification window. Relay failures never propagate.
    pub async fn run(&self, now: NaiveDateTime, forced: Option<Day>) -> NotifyOutcome {
        let today = now.date();
        let tomorrow = Day::Tomorrow.resolve(today);
        let today_categories = self.calculator.categories_for(today);
        let tomorrow_categories = tomorrow
            .map(|date| self.calculator.categories_for(date))
            .unwrap_or_default();

        tracing::debug!(
            %today,
            ?today_categories,
            ?tomorrow,
            ?tomorrow_categories,
            "looked up collection days"
        );

        let Some(day) = forced.or_else(|| self.window.day_at(now)) else {
            tracing::info!(hour = now.hour(), "outside notification window");
            return NotifyOutcome::OutsideWindow { hour: now.hour() };
        };

        let (date, categories) = match (day, tomorrow) {
            (Day::Today, _) => (today, today_categories),
            (Day::Tomorrow, Some(tomorrow)) => (tomorrow, tomorrow_categories),
            (Day::Tomorrow, None) => {
                tracing::warn!(%today, "no calendar date after today");
                return NotifyOutcome::NoCollection { day, date: today };
            }
        };

        let Some(message) = notification_message(day.label(), &categories, date, &self.eras)
        else {
            tracing::info!(%day, %date, "no collection");
            return NotifyOutcome::NoCollection { day, date };
        };

        let status = self.dispatch(&message).await;
        NotifyOutcome::Delivered {
            day,
            date,
            categories,
            status,
        }
    }

    /// Send one message per collection day in the `days` days starting at `from`.
    ///
    /// Successive sends are spaced by `interval`. A failed send does not stop the run.
    pub async fn digest(&self, from: NaiveDate, days: u32, interval: Duration) -> DigestReport {
        let Some(end) = days
            .checked_sub(1)
            .and_then(|span| from.checked_add_days(Days::new(u64::from(span))))
        else {
            return DigestReport::default();
        };

        let collection_days = self.calculator.collection_days(from, end);
        let mut report = DigestReport {
            total: collection_days.len(),
            ..DigestReport::default()
        };

        for (index, collection) in collection_days.iter().enumerate() {
            if index > 0 && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }

            let heading = date_heading(collection.date);
            let Some(message) =
                notification_message(&heading, &collection.categories, collection.date, &self.eras)
            else {
                continue;
            };

            match self.dispatch(&message).await {
                DeliveryStatus::Sent => report.sent += 1,
                DeliveryStatus::Failed => report.failed += 1,
                DeliveryStatus::Skipped => {
                    // Unconfigured stays unconfigured for the rest of the run.
                    report.skipped = report.total - report.sent - report.failed;
                    break;
                }
            }
        }

        tracing::info!(
            %from,
            %end,
            total = report.total,
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped,
            "digest finished"
        );
        report
    }

    /// Check the calculator against dates taken from the city calendar.
    #[must_use]
    pub fn self_test(&self) -> SelfTestReport {
        let cases: Vec<SelfTestCase> = REFERENCE_CASES
            .iter()
            .filter_map(|&((year, month, day), expected)| {
                let date = NaiveDate::from_ymd_opt(year, month, day)?;
                let case = SelfTestCase {
                    date,
                    expected: expected.to_vec(),
                    actual: self.calculator.categories_for(date),
                };
                if case.passed() {
                    tracing::info!(%date, actual = ?case.actual, "self-test case passed");
                } else {
                    tracing::error!(
                        %date,
                        expected = ?case.expected,
                        actual = ?case.actual,
                        "self-test case failed"
                    );
                }
                Some(case)
            })
            .collect();

        let report = SelfTestReport { cases };
        tracing::info!(
            total = report.cases.len(),
            passed = report.passed(),
            "self-test finished"
        );
        report
    }

    async fn dispatch(&self, message: &str) -> DeliveryStatus {
        let relay = self.relay.name();
        match self.relay.send(message).await {
            Ok(Delivery::Sent { status }) => {
                tracing::info!(relay, status, "notification sent");
                DeliveryStatus::Sent
            }
            Ok(Delivery::NotConfigured) => {
                tracing::warn!(relay, "webhook URL not configured, skipping");
                DeliveryStatus::Skipped
            }
            Err(err) => {
                tracing::error!(relay, error = %err, "failed to send notification");
                DeliveryStatus::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveTime;

    use super::*;
    use crate::ports::RelayError;
    use crate::schedule::OverrideTable;

    #[derive(Clone, Copy)]
    enum Reply {
        Accept,
        Unconfigured,
        Reject,
    }

    /// Relay that records messages and answers from a script.
    struct ScriptedRelay {
        replies: Mutex<VecDeque<Reply>>,
        sent: Mutex<Vec<String>>,
    }

    impl ScriptedRelay {
        fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().collect()),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn messages(&self) -> Vec<String> {
            self.sent.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl RelayPort for ScriptedRelay {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn send(&self, message: &str) -> Result<Delivery, RelayError> {
            self.sent.lock().expect("lock").push(message.to_owned());
            let reply = self
                .replies
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or(Reply::Accept);
            match reply {
                Reply::Accept => Ok(Delivery::Sent { status: 204 }),
                Reply::Unconfigured => Ok(Delivery::NotConfigured),
                Reply::Reject => Err(RelayError::Status {
                    status: 500,
                    body: "boom".to_owned(),
                }),
            }
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
        day.and_time(NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time"))
    }

    fn service(relay: Arc<ScriptedRelay>) -> NotifyService {
        NotifyService::new(
            CollectionScheduleCalculator::default(),
            EraTable::saga_default(),
            NotificationWindow::default(),
            relay,
        )
    }

    #[tokio::test]
    async fn morning_run_announces_today() {
        let relay = ScriptedRelay::new(None);
        let service = service(Arc::clone(&relay));

        let outcome = service.run(at(date(2025, 4, 7), 7), None).await;

        assert_eq!(
            outcome,
            NotifyOutcome::Delivered {
                day: Day::Today,
                date: date(2025, 4, 7),
                categories: vec![TrashCategory::Burnable],
                status: DeliveryStatus::Sent,
            }
        );
        let messages = relay.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("今日は燃えるごみの回収日です。"));
    }

    #[tokio::test]
    async fn evening_run_announces_tomorrow() {
        let relay = ScriptedRelay::new(None);
        let service = service(Arc::clone(&relay));

        // Thursday evening, Friday 2025-04-04 is the first Friday.
        let outcome = service.run(at(date(2025, 4, 3), 19), None).await;

        assert!(matches!(
            outcome,
            NotifyOutcome::Delivered {
                day: Day::Tomorrow,
                status: DeliveryStatus::Sent,
                ..
            }
        ));
        assert!(relay.messages()[0].starts_with("明日は燃えないゴミの回収日です。"));
    }

    #[tokio::test]
    async fn midday_run_does_nothing() {
        let relay = ScriptedRelay::new(None);
        let service = service(Arc::clone(&relay));

        let outcome = service.run(at(date(2025, 4, 7), 12), None).await;

        assert_eq!(outcome, NotifyOutcome::OutsideWindow { hour: 12 });
        assert!(relay.messages().is_empty());
    }

    #[tokio::test]
    async fn forced_day_ignores_window() {
        let relay = ScriptedRelay::new(None);
        let service = service(Arc::clone(&relay));

        let outcome = service.run(at(date(2025, 4, 7), 12), Some(Day::Today)).await;

        assert!(matches!(
            outcome,
            NotifyOutcome::Delivered {
                day: Day::Today,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn no_collection_skips_relay() {
        let relay = ScriptedRelay::new(None);
        let service = service(Arc::clone(&relay));

        // First Friday of the override month.
        let outcome = service.run(at(date(2026, 1, 2), 6), None).await;

        assert_eq!(
            outcome,
            NotifyOutcome::NoCollection {
                day: Day::Today,
                date: date(2026, 1, 2),
            }
        );
        assert!(relay.messages().is_empty());
    }

    #[tokio::test]
    async fn relay_failure_is_reported_not_raised() {
        let relay = ScriptedRelay::new([Reply::Reject]);
        let service = service(Arc::clone(&relay));

        let outcome = service.run(at(date(2025, 4, 7), 6), None).await;

        assert!(matches!(
            outcome,
            NotifyOutcome::Delivered {
                status: DeliveryStatus::Failed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn deliver_maps_to_bool() {
        let relay = ScriptedRelay::new([Reply::Accept, Reply::Unconfigured, Reply::Reject]);
        let service = service(relay);

        assert!(service.deliver("a").await);
        assert!(!service.deliver("b").await);
        assert!(!service.deliver("c").await);
    }

    #[tokio::test]
    async fn digest_continues_after_failure() {
        let relay = ScriptedRelay::new([Reply::Accept, Reply::Reject, Reply::Accept]);
        let service = service(Arc::clone(&relay));

        // 2025-04-01..=2025-04-07 has four collection days.
        let report = service.digest(date(2025, 4, 1), 7, Duration::ZERO).await;

        assert_eq!(
            report,
            DigestReport {
                total: 4,
                sent: 3,
                failed: 1,
                skipped: 0,
            }
        );
        let messages = relay.messages();
        assert_eq!(messages.len(), 4);
        assert!(messages[0].starts_with("4月2日(水)はペットボトルの回収日です。"));
    }

    #[tokio::test]
    async fn digest_stops_when_unconfigured() {
        let relay = ScriptedRelay::new([Reply::Unconfigured]);
        let service = service(Arc::clone(&relay));

        let report = service.digest(date(2025, 4, 1), 7, Duration::ZERO).await;

        assert_eq!(report.skipped, 4);
        assert_eq!(report.sent, 0);
        assert_eq!(relay.messages().len(), 1);
    }

    #[tokio::test]
    async fn empty_digest() {
        let relay = ScriptedRelay::new(None);
        let service = service(Arc::clone(&relay));

        assert_eq!(
            service.digest(date(2025, 4, 1), 0, Duration::ZERO).await,
            DigestReport::default()
        );
        // Saturday and Sunday only.
        assert_eq!(
            service.digest(date(2025, 4, 5), 2, Duration::ZERO).await,
            DigestReport::default()
        );
        assert!(relay.messages().is_empty());
    }

    #[test]
    fn self_test_passes_with_default_tables() {
        let report = service(ScriptedRelay::new(None)).self_test();
        assert_eq!(report.cases.len(), 8);
        assert!(report.all_passed());
    }

    #[test]
    fn self_test_flags_missing_override() {
        let service = NotifyService::new(
            CollectionScheduleCalculator::new(OverrideTable::default()),
            EraTable::saga_default(),
            NotificationWindow::default(),
            ScriptedRelay::new(None),
        );
        let report = service.self_test();
        assert!(!report.all_passed());
        assert_eq!(report.passed(), 6);
    }

    #[test]
    fn message_for_tomorrow() {
        let service = service(ScriptedRelay::new(None));
        let message = service
            .message_for(Day::Tomorrow, date(2026, 1, 15))
            .expect("message");
        assert!(message.starts_with("明日は燃えないゴミの回収日です。"));
        assert!(service.message_for(Day::Today, date(2025, 4, 5)).is_none());
    }

    #[tokio::test]
    async fn tomorrow_on_last_date_announces_nothing() {
        let relay = ScriptedRelay::new(None);
        let service = service(Arc::clone(&relay));

        assert!(service.message_for(Day::Tomorrow, NaiveDate::MAX).is_none());

        let now = NaiveDate::MAX.and_time(NaiveTime::from_hms_opt(20, 0, 0).expect("valid time"));
        let outcome = service.run(now, None).await;

        assert_eq!(
            outcome,
            NotifyOutcome::NoCollection {
                day: Day::Tomorrow,
                date: NaiveDate::MAX,
            }
        );
        assert!(relay.messages().is_empty());
    }
}
