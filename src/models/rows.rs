// SPDX-License-Identifier: MIT

//! Flattened tabular projections and per-subject collection results.

use std::collections::BTreeMap;

use crate::models::Credential;

/// Aggregate cells for one stage of one summary row.
///
/// `pct` is `None` when the record's total stage minutes were zero, so a
/// blank lands in the export instead of a division artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct StageCells {
    pub minutes: u64,
    pub count: u32,
    pub pct: Option<f64>,
}

/// One row of the per-session summary table.
///
/// The fixed columns are listed here; the stage columns
/// (`<stage>_minutes` / `<stage>_count` / `<stage>_pct`) come from the
/// `stages` map and therefore vary record by record.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub subject_id: String,
    pub log_id: u64,
    pub date_of_sleep: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_ms: u64,
    /// Provider-defined sleep-efficiency percentage (kept under its own name)
    pub efficiency: Option<u32>,
    pub is_main_sleep: bool,
    pub sleep_type: Option<String>,
    pub log_type: Option<String>,
    pub minutes_asleep: Option<u32>,
    pub minutes_awake: Option<u32>,
    pub minutes_after_wakeup: Option<u32>,
    pub minutes_to_fall_asleep: Option<u32>,
    pub time_in_bed: Option<u32>,
    pub total_stage_minutes: u64,
    /// Stage name -> cells, ordered by stage name
    pub stages: BTreeMap<String, StageCells>,
}

/// One row of a level timeline table (fine-grained or short).
#[derive(Debug, Clone, PartialEq)]
pub struct LevelEventRow {
    pub subject_id: String,
    pub log_id: u64,
    pub date_of_sleep: String,
    pub timestamp: String,
    pub level: String,
    pub seconds: u64,
}

/// Terminal status of one subject's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectStatus {
    /// At least one summary row was collected
    Ok,
    /// Credential refresh was rejected; no data endpoint was called
    AuthFailed,
    /// Required scope absent; no data endpoint was called
    ScopeMissing,
    /// Pipeline ran but produced no rows
    NoData,
}

impl SubjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectStatus::Ok => "ok",
            SubjectStatus::AuthFailed => "auth_failed",
            SubjectStatus::ScopeMissing => "scope_missing",
            SubjectStatus::NoData => "no_data",
        }
    }
}

/// A named byte blob destined for the bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// A plain-text artifact.
    pub fn text(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes: contents.into().into_bytes(),
        }
    }
}

/// Everything one subject's pipeline produced.
///
/// Never shared across subjects; the orchestrator accumulates one per
/// subject and merges only after that subject's pipeline terminates.
#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    pub subject_id: String,
    pub status: SubjectStatus,
    pub summary_rows: Vec<SummaryRow>,
    pub level_data_rows: Vec<LevelEventRow>,
    pub level_short_rows: Vec<LevelEventRow>,
    /// `Some` exactly when the refresh call succeeded; carried regardless of
    /// data success so the caller can persist the latest token
    pub updated_credential: Option<Credential>,
    /// Diagnostic artifacts, unprefixed (the assembler namespaces them)
    pub diagnostics: Vec<Artifact>,
}
