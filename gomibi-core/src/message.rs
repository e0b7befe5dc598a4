//! Notification text and the reference calendar document for each fiscal era.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::TrashCategory;

/// Community site listing collection days for Saga City.
pub const INFO_SITE_URL: &str = "http://saga.5374.jp/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Reference document in force from a given date on.
pub struct Era {
    /// First date the document applies to.
    pub from: NaiveDate,
    /// Location of the collection calendar PDF.
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Eras ordered by their start date.
pub struct EraTable {
    eras: Vec<Era>,
}

impl EraTable {
    /// Build a table; entries are sorted by start date.
    #[must_use]
    pub fn new(eras: impl IntoIterator<Item = Era>) -> Self {
        let mut eras: Vec<Era> = eras.into_iter().collect();
        eras.sort_by_key(|era| era.from);
        Self { eras }
    }

    /// Collection calendars published by Saga City.
    #[must_use]
    pub fn saga_default() -> Self {
        let mut eras = vec![Era {
            from: NaiveDate::MIN,
            url: "https://www.city.saga.lg.jp/site_files/file/2023/202302/p1gp9ub2hm1d49iac165s13lrt4l7.pdf"
                .to_owned(),
        }];
        // FY2024 and FY2025 start on April 1st.
        if let Some(from) = NaiveDate::from_ymd_opt(2024, 4, 1) {
            eras.push(Era {
                from,
                url: "https://www.city.saga.lg.jp/site_files/file/2024/202402/p1hljj82u8kkh1a7217vu14s61lrp8.pdf"
                    .to_owned(),
            });
        }
        if let Some(from) = NaiveDate::from_ymd_opt(2025, 4, 1) {
            eras.push(Era {
                from,
                url: "https://www.city.saga.lg.jp/site_files/file/2025/202503/p1imh8o2fr1o401dob41qscd378.pdf"
                    .to_owned(),
            });
        }
        Self::new(eras)
    }

    /// URL of the last era starting on or before `date`.
    #[must_use]
    pub fn url_for(&self, date: NaiveDate) -> Option<&str> {
        self.eras
            .iter()
            .rev()
            .find(|era| era.from <= date)
            .map(|era| era.url.as_str())
    }

    /// All eras in start-date order.
    #[must_use]
    pub fn eras(&self) -> &[Era] {
        &self.eras
    }
}

/// Build the notification text for a collection day.
///
/// `subject` opens the first line, e.g. "今日" or a formatted date. Returns `None`
/// when `categories` is empty.
#[must_use]
pub fn notification_message(
    subject: &str,
    categories: &[TrashCategory],
    date: NaiveDate,
    eras: &EraTable,
) -> Option<String> {
    if categories.is_empty() {
        return None;
    }

    let labels = categories
        .iter()
        .map(|category| category.label())
        .collect::<Vec<_>>()
        .join("、");

    let mut lines = vec![
        format!("{subject}は{labels}の回収日です。"),
        format!("さらに情報は {INFO_SITE_URL} で確認できます。"),
    ];
    if let Some(url) = eras.url_for(date) {
        lines.push(format!("詳細はこちらをご覧ください: {url}"));
    }

    let mut message = lines.join("\n");
    message.push('\n');
    Some(message)
}

/// Short Japanese heading for a date, e.g. "4月7日(月)".
#[must_use]
pub fn date_heading(date: NaiveDate) -> String {
    let weekday = match date.weekday() {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    };
    format!("{}月{}日({weekday})", date.month(), date.day())
}
