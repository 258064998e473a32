// SPDX-License-Identifier: MIT

//! Provider-shaped sleep log records, as returned by the Fitbit Web API
//! (`/1.2/user/-/sleep/date/...`).
//!
//! The stage set inside `levels.summary` is open: the provider decides which
//! stage names appear (`deep`/`light`/`rem`/`wake` for staged logs,
//! `asleep`/`restless`/`awake` for classic ones, and whatever future names it
//! invents). It is therefore held as an ordered map keyed by stage name,
//! never a fixed enum.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response envelope for both the by-range and by-date sleep endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepResponse {
    /// Zero or more sleep sessions (a day can hold naps plus main sleep)
    #[serde(default)]
    pub sleep: Vec<SleepLogRecord>,
}

/// One raw sleep session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepLogRecord {
    pub log_id: u64,
    /// Date the sleep is attributed to, `YYYY-MM-DD`
    pub date_of_sleep: String,
    pub start_time: String,
    pub end_time: String,
    /// Session length in milliseconds
    #[serde(default)]
    pub duration: u64,
    /// Provider-defined sleep-efficiency percentage. Not a composite
    /// wellness score and never relabeled as one.
    #[serde(default)]
    pub efficiency: Option<u32>,
    /// Primary overnight session vs. nap
    #[serde(default)]
    pub is_main_sleep: bool,
    /// Record classification: `"stages"` or `"classic"`
    #[serde(default, rename = "type")]
    pub sleep_type: Option<String>,
    /// How the log was created: `"auto_detected"` or `"manual"`
    #[serde(default)]
    pub log_type: Option<String>,
    #[serde(default)]
    pub minutes_asleep: Option<u32>,
    #[serde(default)]
    pub minutes_awake: Option<u32>,
    #[serde(default)]
    pub minutes_after_wakeup: Option<u32>,
    #[serde(default)]
    pub minutes_to_fall_asleep: Option<u32>,
    #[serde(default)]
    pub time_in_bed: Option<u32>,
    #[serde(default)]
    pub levels: Option<SleepLevels>,
}

/// Per-stage aggregates plus the two event timelines of one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepLevels {
    /// Stage name -> aggregate; key set is provider-determined
    #[serde(default)]
    pub summary: BTreeMap<String, StageSummary>,
    /// Fine-grained timeline (typically 30-second granularity)
    #[serde(default)]
    pub data: Vec<LevelEvent>,
    /// Sub-threshold short-wake events
    #[serde(default)]
    pub short_data: Vec<LevelEvent>,
}

/// Aggregate for one stage of one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirty_day_avg_minutes: Option<u64>,
}

/// One element of a level timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelEvent {
    pub date_time: String,
    /// Stage label (same open set as the summary keys)
    pub level: String,
    pub seconds: u64,
}
