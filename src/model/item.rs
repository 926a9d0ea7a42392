use chrono::{Days, NaiveDate};

use crate::error::{Result, TimelineError};

/// Identifier of an item, unique within one item list.
pub type ItemId = u64;

/// Date format accepted for item dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single dated entry on the timeline.
///
/// Both dates are inclusive calendar days: an item with `start == end`
/// occupies exactly one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Item {
    /// Create an item from already parsed dates. `start <= end` is the
    /// caller's responsibility.
    pub fn new(id: ItemId, name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            start,
            end,
        }
    }

    /// Build an item from `YYYY-MM-DD` strings, rejecting unparseable dates
    /// and reversed ranges.
    pub fn parse(id: ItemId, name: impl Into<String>, start: &str, end: &str) -> Result<Self> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        let item = Self::new(id, name, start, end);
        item.validate()?;
        Ok(item)
    }

    /// Check the `start <= end` invariant.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(TimelineError::InvariantViolation(format!(
                "item {} starts on {} after it ends on {}",
                self.id, self.start, self.end
            )));
        }
        Ok(())
    }

    /// Number of days between start and end (0 for a one-day item).
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Inclusive overlap test: items that touch on the same day overlap.
    pub fn overlaps(&self, other: &Item) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| TimelineError::InvalidDate {
        value: s.to_string(),
    })
}

/// Shift a date by a signed number of days without panicking at the
/// calendar limits.
pub fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or(TimelineError::DateOutOfRange)
}
