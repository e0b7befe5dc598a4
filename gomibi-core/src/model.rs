//! Domain data structures for waste categories and collection days.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Waste categories collected by the city.
pub enum TrashCategory {
    /// Burnable household waste.
    Burnable,
    /// PET bottles.
    PetBottle,
    /// Non-burnable waste.
    NonBurnable,
    /// Paper, cloth, bottles and cans.
    Recyclable,
}

impl TrashCategory {
    /// All categories in rule-table order.
    pub const ALL: [TrashCategory; 4] = [
        TrashCategory::Burnable,
        TrashCategory::PetBottle,
        TrashCategory::NonBurnable,
        TrashCategory::Recyclable,
    ];

    /// Canonical English name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TrashCategory::Burnable => "Burnable",
            TrashCategory::PetBottle => "PetBottle",
            TrashCategory::NonBurnable => "NonBurnable",
            TrashCategory::Recyclable => "Recyclable",
        }
    }

    /// Label used in notifications, as printed in the city's collection calendar.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TrashCategory::Burnable => "燃えるごみ",
            TrashCategory::PetBottle => "ペットボトル",
            TrashCategory::NonBurnable => "燃えないゴミ",
            TrashCategory::Recyclable => "資源物（紙・布類、ビン・缶）",
        }
    }
}

impl fmt::Display for TrashCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Calendar attributes consumed by the recurrence rules.
pub struct DateInfo {
    /// The date the attributes were derived from.
    pub date: NaiveDate,
    /// Day of the week.
    pub weekday: Weekday,
    /// Day of the month, 1-31.
    pub day_of_month: u32,
    /// Month, 1-12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Which occurrence of its weekday this date is within the month, 1-5.
    pub week_of_month: u32,
}

impl DateInfo {
    /// Derive all rule inputs from a date.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        let day_of_month = date.day();
        Self {
            date,
            weekday: date.weekday(),
            day_of_month,
            month: date.month(),
            year: date.year(),
            week_of_month: day_of_month.div_ceil(7),
        }
    }

    /// Weekday as a number where 0 is Sunday and 6 is Saturday.
    #[must_use]
    pub fn weekday_number(&self) -> u32 {
        self.weekday.num_days_from_sunday()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Which day a notification talks about.
pub enum Day {
    /// The current date.
    Today,
    /// The day after the current date.
    Tomorrow,
}

impl Day {
    /// Word used at the start of a notification.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Day::Today => "今日",
            Day::Tomorrow => "明日",
        }
    }

    /// Resolve the concrete date relative to `today`.
    ///
    /// `None` for [`Day::Tomorrow`] when `today` is the last representable date.
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Day::Today => Some(today),
            Day::Tomorrow => today.succ_opt(),
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Day::Today => "today",
            Day::Tomorrow => "tomorrow",
        };
        write!(formatter, "{slug}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A date on which at least one category is collected.
pub struct CollectionDay {
    /// Date of the collection.
    pub date: NaiveDate,
    /// Categories collected, in rule-table order.
    pub categories: Vec<TrashCategory>,
}
