//! Recurrence rules for collection days and the dated override table.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::{CollectionDay, DateInfo, TrashCategory};

/// One static recurrence rule.
struct RecurrenceRule {
    category: TrashCategory,
    weekdays: &'static [Weekday],
    /// Qualifying occurrences of the weekday within the month; `None` matches every week.
    weeks: Option<&'static [u32]>,
    /// Whether an [`OverrideTable`] entry replaces the week condition for its month.
    overridable: bool,
}

/// Rule table, in the order categories are reported.
const RULES: [RecurrenceRule; 4] = [
    RecurrenceRule {
        category: TrashCategory::Burnable,
        weekdays: &[Weekday::Mon, Weekday::Thu],
        weeks: None,
        overridable: false,
    },
    RecurrenceRule {
        category: TrashCategory::PetBottle,
        weekdays: &[Weekday::Wed],
        weeks: Some(&[1, 3]),
        overridable: false,
    },
    RecurrenceRule {
        category: TrashCategory::NonBurnable,
        weekdays: &[Weekday::Fri],
        weeks: Some(&[1]),
        overridable: true,
    },
    RecurrenceRule {
        category: TrashCategory::Recyclable,
        weekdays: &[Weekday::Fri],
        weeks: Some(&[2, 4]),
        overridable: false,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Moves the non-burnable collection of one month to a fixed day.
pub struct MonthOverride {
    /// Calendar year the override applies to.
    pub year: i32,
    /// Month the override applies to, 1-12.
    pub month: u32,
    /// Day of the month on which the collection happens instead.
    pub day: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Override entries keyed by `(year, month)`.
pub struct OverrideTable {
    entries: BTreeMap<(i32, u32), u32>,
}

impl OverrideTable {
    /// Build a table from entries. A later entry for the same month replaces an earlier one.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = MonthOverride>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| ((entry.year, entry.month), entry.day))
            .collect();
        Self { entries }
    }

    /// Overrides currently known for Saga City.
    ///
    /// January 2026: the first Friday is a holiday, collection moves to the 16th.
    #[must_use]
    pub fn saga_default() -> Self {
        Self::new([MonthOverride {
            year: 2026,
            month: 1,
            day: 16,
        }])
    }

    /// Override day for the given month, if any.
    #[must_use]
    pub fn day_for(&self, year: i32, month: u32) -> Option<u32> {
        self.entries.get(&(year, month)).copied()
    }

    /// Number of months with an override.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Maps dates to the categories collected on them.
pub struct CollectionScheduleCalculator {
    overrides: OverrideTable,
}

impl Default for CollectionScheduleCalculator {
    fn default() -> Self {
        Self::new(OverrideTable::saga_default())
    }
}

impl CollectionScheduleCalculator {
    /// Create a calculator consulting the given override table.
    #[must_use]
    pub fn new(overrides: OverrideTable) -> Self {
        Self { overrides }
    }

    /// Categories collected on `date`, in rule-table order. Empty when nothing is collected.
    #[must_use]
    pub fn categories_for(&self, date: NaiveDate) -> Vec<TrashCategory> {
        self.categories_for_info(&DateInfo::of(date))
    }

    /// Same as [`Self::categories_for`] for already derived date attributes.
    #[must_use]
    pub fn categories_for_info(&self, info: &DateInfo) -> Vec<TrashCategory> {
        RULES
            .iter()
            .filter(|rule| self.matches(rule, info))
            .map(|rule| rule.category)
            .collect()
    }

    /// All collection days in the inclusive range, in date order.
    #[must_use]
    pub fn collection_days(&self, start: NaiveDate, end: NaiveDate) -> Vec<CollectionDay> {
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter_map(|date| {
                let categories = self.categories_for(date);
                (!categories.is_empty()).then_some(CollectionDay { date, categories })
            })
            .collect()
    }

    fn matches(&self, rule: &RecurrenceRule, info: &DateInfo) -> bool {
        if !rule.weekdays.contains(&info.weekday) {
            return false;
        }

        if rule.overridable
            && let Some(day) = self.overrides.day_for(info.year, info.month)
        {
            return info.day_of_month == day;
        }

        rule.weeks
            .is_none_or(|weeks| weeks.contains(&info.week_of_month))
    }
}
