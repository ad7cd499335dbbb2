//! Month grid for the calendar view.
//!
//! A grid always covers whole weeks: from the Sunday on or before the first
//! of the month to the Saturday on or after its last day.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use super::event::Event;
use super::store::EventStore;
use crate::error::ValidationError;
use crate::language::Language;
use crate::storage::KeyValueStore;

/// A calendar month, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| ValidationError::InvalidMonth(format!("{year:04}-{month:02}")))
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    pub fn prev(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// The month `months` away from this one, or `None` past the
    /// representable date range.
    pub fn offset(&self, months: i32) -> Option<Self> {
        let step = Months::new(months.unsigned_abs());
        let first = if months >= 0 {
            self.first.checked_add_months(step)
        } else {
            self.first.checked_sub_months(step)
        }?;
        Some(Self { first })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Heading for the month in the given UI language.
    pub fn label(&self, language: Language) -> String {
        match language {
            Language::En => self.first.format("%B %Y").to_string(),
            Language::Zh => format!("{}年{}月", self.year(), self.month()),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = ValidationError;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for Month {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridDay {
    pub date: NaiveDate,
    /// False for the leading/trailing days of neighbouring months.
    pub in_month: bool,
    pub is_today: bool,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub month: Month,
    pub days: Vec<GridDay>,
}

impl MonthGrid {
    pub fn build<S: KeyValueStore>(month: Month, store: &EventStore<S>, today: NaiveDate) -> Self {
        let first = month.first_day();
        let last = month.last_day();
        let lead = u64::from(first.weekday().num_days_from_sunday());
        let trail = u64::from(6 - last.weekday().num_days_from_sunday());
        let start = first
            .checked_sub_days(chrono::Days::new(lead))
            .unwrap_or(first);
        let end = last.checked_add_days(chrono::Days::new(trail)).unwrap_or(last);

        let days = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|date| GridDay {
                date,
                in_month: month.contains(date),
                is_today: date == today,
                events: store.events_on(date).into_iter().cloned().collect(),
            })
            .collect();

        Self { month, days }
    }

    /// Rows of seven days, Sunday first.
    pub fn weeks(&self) -> impl Iterator<Item = &[GridDay]> {
        self.days.chunks(7)
    }
}
