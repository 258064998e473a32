// SPDX-License-Identifier: MIT

//! Data models for the collection pipeline.

pub mod credential;
pub mod range;
pub mod rows;
pub mod sleep;

pub use credential::{load_subjects, subject_id_from_filename, Credential, SubjectRequest};
pub use range::DateRange;
pub use rows::{
    Artifact, CollectionOutcome, LevelEventRow, StageCells, SubjectStatus, SummaryRow,
};
pub use sleep::{LevelEvent, SleepLevels, SleepLogRecord, SleepResponse, StageSummary};
