// SPDX-License-Identifier: MIT

//! Bulk collector for Fitbit sleep data.
//!
//! Retrieves per-subject sleep logs across a date range for a batch of
//! research subjects, each with their own OAuth credential, and bundles
//! normalized CSV exports plus refreshed credentials into one downloadable
//! archive. Per-subject failures are isolated: one bad credential never
//! stops the rest of the batch.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{CollectError, Result};
pub use models::{load_subjects, DateRange, SubjectRequest};
pub use services::{ArchiveAssembler, Bundle, CollectionOrchestrator};

/// Run the whole pipeline: collect every subject, then assemble the bundle.
pub async fn run_collection(
    config: &Config,
    subjects: Vec<SubjectRequest>,
    range: &DateRange,
) -> Result<Bundle> {
    let orchestrator = CollectionOrchestrator::new(config)?;
    let outcomes = orchestrator.run(subjects, range).await;
    ArchiveAssembler::new(config.include_diagnostics).assemble(&outcomes, range)
}
