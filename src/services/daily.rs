// SPDX-License-Identifier: MIT

//! Day-granular sleep fetch.
//!
//! The per-day queries are the authoritative data source for extraction.
//! Fetching is best-effort: a failed day is skipped so partial coverage
//! survives instead of aborting the whole subject. One attempt per day, no
//! retry, no caching across runs.

use chrono::NaiveDate;

use crate::error::CollectError;
use crate::models::{DateRange, SleepLogRecord};
use crate::services::FitbitClient;

/// Result of walking a date range day by day.
#[derive(Debug)]
pub struct DailyFetchReport {
    /// All records retrieved, in ascending day order
    pub records: Vec<SleepLogRecord>,
    /// Days that returned an error, with the error that skipped them
    pub skipped: Vec<(NaiveDate, CollectError)>,
}

impl DailyFetchReport {
    /// Render the skipped days to a diagnostic artifact body.
    pub fn skipped_summary(&self) -> String {
        let mut lines = String::new();
        for (day, error) in &self.skipped {
            lines.push_str(&format!("{}: {}\n", day, error));
        }
        lines
    }
}

/// Fetches the requested span one day at a time.
pub struct DailyFetcher {
    client: FitbitClient,
}

impl DailyFetcher {
    pub fn new(client: FitbitClient) -> Self {
        Self { client }
    }

    /// Query every date in the range (inclusive, ascending).
    ///
    /// A day may contain zero, one, or multiple sessions; all are kept.
    /// Errors never propagate out of here: they land in the report's
    /// skipped list.
    pub async fn fetch(&self, access_token: &str, range: &DateRange) -> DailyFetchReport {
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for day in range.days() {
            match self.client.sleep_for_date(access_token, day).await {
                Ok(response) => {
                    tracing::debug!(day = %day, sessions = response.sleep.len(), "fetched day");
                    records.extend(response.sleep);
                }
                Err(error) => {
                    tracing::warn!(day = %day, error = %error, "skipping day");
                    skipped.push((day, error));
                }
            }
        }

        DailyFetchReport { records, skipped }
    }
}
