// SPDX-License-Identifier: MIT

//! Inclusive date range for collection runs.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CollectError, Result};

/// A closed interval of calendar dates, `start <= end` guaranteed at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end` before any work happens.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CollectError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Every date in the range, ascending, both endpoints included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    /// Number of days in the range (at least 1).
    pub fn day_count(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// The range widened by `days` on each side, saturating at the calendar
    /// bounds.
    pub fn padded(&self, days: u64) -> DateRange {
        DateRange {
            start: self
                .start
                .checked_sub_days(Days::new(days))
                .unwrap_or(self.start),
            end: self
                .end
                .checked_add_days(Days::new(days))
                .unwrap_or(self.end),
        }
    }

    /// Filename-friendly label, e.g. `2024-03-01_to_2024-03-07`.
    pub fn label(&self) -> String {
        format!("{}_to_{}", self.start, self.end)
    }
}
