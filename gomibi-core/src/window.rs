//! Decides which day a scheduled run notifies about.

use chrono::{NaiveDateTime, Timelike};

use crate::config::ConfigError;
use crate::model::Day;

/// Hour of the morning run.
pub const DEFAULT_MORNING_HOUR: u32 = 7;
/// Hour from which runs announce the next day.
pub const DEFAULT_EVENING_HOUR: u32 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Hour boundaries for the morning and evening notification.
///
/// Runs up to and including the morning hour notify about today, runs from the
/// evening hour on notify about tomorrow. Hours in between notify about nothing.
pub struct NotificationWindow {
    morning_hour: u32,
    evening_hour: u32,
}

impl Default for NotificationWindow {
    fn default() -> Self {
        Self {
            morning_hour: DEFAULT_MORNING_HOUR,
            evening_hour: DEFAULT_EVENING_HOUR,
        }
    }
}

impl NotificationWindow {
    /// Create a window from explicit hours.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHour`] for hours above 23 and
    /// [`ConfigError::InvertedWindow`] unless `morning_hour < evening_hour`.
    pub fn new(morning_hour: u32, evening_hour: u32) -> Result<Self, ConfigError> {
        for hour in [morning_hour, evening_hour] {
            if hour > 23 {
                return Err(ConfigError::InvalidHour(hour));
            }
        }
        if morning_hour >= evening_hour {
            return Err(ConfigError::InvertedWindow {
                morning_hour,
                evening_hour,
            });
        }
        Ok(Self {
            morning_hour,
            evening_hour,
        })
    }

    /// Last hour that still notifies about today.
    #[must_use]
    pub fn morning_hour(&self) -> u32 {
        self.morning_hour
    }

    /// First hour that notifies about tomorrow.
    #[must_use]
    pub fn evening_hour(&self) -> u32 {
        self.evening_hour
    }

    /// Day to notify about for a run starting in `hour`.
    #[must_use]
    pub fn day_for_hour(&self, hour: u32) -> Option<Day> {
        if hour <= self.morning_hour {
            Some(Day::Today)
        } else if hour >= self.evening_hour {
            Some(Day::Tomorrow)
        } else {
            None
        }
    }

    /// Day to notify about for a run at `now`.
    #[must_use]
    pub fn day_at(&self, now: NaiveDateTime) -> Option<Day> {
        self.day_for_hour(now.hour())
    }
}
