//! Season calendar: classifies calendar dates into named seasons and resolves
//! the season year a date belongs to.

use std::fmt;

use chrono::{Datelike, NaiveDate};

/// A year-agnostic calendar point (month + day), ordered by month then day.
///
/// Season boundaries carry no year. Interval tests attach the check date's own
/// year to both endpoints, which reduces to plain `(month, day)` ordering and
/// keeps a `02-29` endpoint usable in non-leap years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// A named recurring season, possibly wrapping the year boundary
/// (e.g. Nov 1 - Feb 28).
#[derive(Debug, Clone)]
pub struct Season {
    pub name: String,
    pub start: MonthDay,
    pub end: MonthDay,
}

/// Check whether `date` falls inside the closed interval `[start, end]`, with
/// both endpoints carrying the date's own year.
///
/// When `end < start` the interval wraps the year boundary and covers
/// `[start, Dec 31]` plus `[Jan 1, end]` of the date's year. `start == end`
/// matches exactly that single day via the ordinary branch.
pub fn in_interval(date: NaiveDate, start: MonthDay, end: MonthDay) -> bool {
    let day = MonthDay::from_date(date);
    if end < start {
        day >= start || day <= end
    } else {
        start <= day && day <= end
    }
}

/// Ordered season definitions plus the start of the designated anchor season.
///
/// Definition order is application order: when definitions overlap, the first
/// defined season wins. Immutable after construction.
#[derive(Debug, Clone)]
pub struct SeasonCalendar {
    seasons: Vec<Season>,
    anchor_start: MonthDay,
}

impl SeasonCalendar {
    pub fn new(seasons: Vec<Season>, anchor_start: MonthDay) -> Self {
        Self {
            seasons,
            anchor_start,
        }
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    /// Name of the first season containing `date`, or `None` when the date
    /// falls outside every season.
    pub fn season_for(&self, date: NaiveDate) -> Option<&str> {
        self.seasons
            .iter()
            .find(|s| in_interval(date, s.start, s.end))
            .map(|s| s.name.as_str())
    }

    /// Season year for `date`.
    ///
    /// Dates on or after the anchor season's start (through Dec 31) belong to
    /// the *next* calendar year's cycle; all earlier dates belong to the
    /// current one. This models seasons that begin late in one year but count
    /// for the following year.
    pub fn season_year_for(&self, date: NaiveDate) -> i32 {
        if MonthDay::from_date(date) >= self.anchor_start {
            date.year() + 1
        } else {
            date.year()
        }
    }
}
