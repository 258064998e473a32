// SPDX-License-Identifier: MIT

//! Fitbit sleep data bulk collector.
//!
//! Reads `token_<subjectId>.json` credential files from a directory,
//! collects sleep data for every subject over the requested date range,
//! writes the export archive to disk, and rewrites each token file with its
//! refreshed credential.

use std::env;
use std::fs;
use std::path::PathBuf;

use chrono::{Days, NaiveDate, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitbit_sleep_collector::{
    load_subjects, ArchiveAssembler, CollectionOrchestrator, Config, DateRange,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env();

    let token_dir = PathBuf::from(env::var("TOKEN_DIR").unwrap_or_else(|_| "./tokens".to_string()));
    let output_dir = PathBuf::from(env::var("OUTPUT_DIR").unwrap_or_else(|_| ".".to_string()));

    let today = Utc::now().date_naive();
    let end = parse_date_var("END_DATE")?.unwrap_or(today);
    let start = parse_date_var("START_DATE")?
        .unwrap_or_else(|| end.checked_sub_days(Days::new(7)).unwrap_or(end));
    let range = DateRange::new(start, end)?;

    tracing::info!(
        token_dir = %token_dir.display(),
        start = %range.start(),
        end = %range.end(),
        "Starting sleep data collection"
    );

    // Gather token_<subjectId>.json files; anything else in the directory is
    // ignored, but a malformed token file rejects the batch up front.
    let mut files = Vec::new();
    for entry in fs::read_dir(&token_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with("token_") && name.ends_with(".json") {
            files.push((name, fs::read(entry.path())?));
        }
    }
    let subjects = load_subjects(&files)?;
    tracing::info!(subjects = subjects.len(), "Credential files loaded");

    let orchestrator = CollectionOrchestrator::new(&config)?;
    let outcomes = orchestrator.run(subjects, &range).await;

    // Persist refreshed credentials next to where they came from: the old
    // refresh tokens stop working after this run.
    for outcome in &outcomes {
        if let Some(credential) = &outcome.updated_credential {
            let path = token_dir.join(format!("token_{}.json", outcome.subject_id));
            fs::write(&path, serde_json::to_vec_pretty(credential)?)?;
        }
    }

    let bundle = ArchiveAssembler::new(config.include_diagnostics).assemble(&outcomes, &range)?;
    let archive_path = output_dir.join(&bundle.file_name);
    fs::write(&archive_path, bundle.to_tar_gz()?)?;

    tracing::info!(
        archive = %archive_path.display(),
        artifacts = bundle.artifacts.len(),
        "Collection complete"
    );
    Ok(())
}

/// Parse an optional `YYYY-MM-DD` environment variable.
fn parse_date_var(name: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    match env::var(name) {
        Ok(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map(Some),
        Err(_) => Ok(None),
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitbit_sleep_collector=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
