// SPDX-License-Identifier: MIT

//! Per-subject collection orchestration.
//!
//! Drives the sequence for each subject:
//! 1. Refresh the credential (fatal on failure)
//! 2. Scope gate + availability probe (scope failure fatal, probe failure
//!    recorded)
//! 3. Per-day fetch and flatten, accumulating the three row sets
//!
//! Failures are strictly per-subject: one subject's failure never aborts
//! the remaining subjects.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::StreamExt;

use crate::config::Config;
use crate::error::{CollectError, Result};
use crate::models::{
    Artifact, CollectionOutcome, Credential, DateRange, SubjectRequest, SubjectStatus,
};
use crate::services::flatten::flatten;
use crate::services::{DailyFetcher, FitbitClient, RangeFetcher, TokenLifecycleManager};

/// Runs the collection pipeline for a batch of subjects.
pub struct CollectionOrchestrator {
    tokens: TokenLifecycleManager,
    prober: RangeFetcher,
    daily: DailyFetcher,
    concurrency: usize,
}

impl CollectionOrchestrator {
    /// Build the orchestrator and its shared HTTP client.
    pub fn new(config: &Config) -> Result<Self> {
        let client = FitbitClient::new(config)?;
        Ok(Self {
            tokens: TokenLifecycleManager::new(client.clone()),
            prober: RangeFetcher::new(client.clone()),
            daily: DailyFetcher::new(client),
            concurrency: config.concurrency.max(1),
        })
    }

    /// Run every subject's pipeline and return one outcome per subject, in
    /// input order.
    ///
    /// Subjects are data-independent, so they run through a bounded worker
    /// pool (`concurrency` wide; 1 matches the reference sequential
    /// behavior). Accumulation stays subject-local; progress is logged as a
    /// monotonically increasing completed/total count.
    pub async fn run(
        &self,
        subjects: Vec<SubjectRequest>,
        range: &DateRange,
    ) -> Vec<CollectionOutcome> {
        let total = subjects.len();
        let completed = AtomicUsize::new(0);
        let completed = &completed;

        futures_util::stream::iter(subjects)
            .map(|subject| async move {
                let outcome = self.collect_subject(subject, range).await;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::info!(
                    subject_id = %outcome.subject_id,
                    status = outcome.status.as_str(),
                    summary_rows = outcome.summary_rows.len(),
                    completed = done,
                    total,
                    "subject pipeline finished"
                );
                outcome
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// One subject's full pipeline. Never fails: every error becomes a
    /// terminal status plus a diagnostic artifact.
    async fn collect_subject(
        &self,
        subject: SubjectRequest,
        range: &DateRange,
    ) -> CollectionOutcome {
        let SubjectRequest {
            subject_id,
            credential,
        } = subject;
        let mut diagnostics = Vec::new();

        // 1. Refresh. A rejected or unreachable token endpoint halts this
        //    subject before any data endpoint is touched.
        let refreshed = match self.tokens.refresh(&credential).await {
            Ok(refreshed) => refreshed,
            Err(error) => {
                tracing::warn!(subject_id = %subject_id, error = %error, "credential refresh failed");
                diagnostics.push(Artifact::text(
                    "auth_error.txt",
                    format!("credential refresh failed: {}\n", error),
                ));
                return failed_outcome(subject_id, SubjectStatus::AuthFailed, None, diagnostics);
            }
        };

        // 2. Scope gate + availability probe. Missing scope halts before any
        //    data call; a failed probe is diagnostic-only.
        match self.prober.probe(&refreshed, range).await {
            Ok(diagnostic) => {
                tracing::debug!(
                    subject_id = %subject_id,
                    records = diagnostic.record_count,
                    rate_limit = diagnostic.rate_limit_remaining.as_deref().unwrap_or(""),
                    "range probe complete"
                );
                diagnostics.push(diagnostic.to_artifact());
            }
            Err(error @ CollectError::ScopeMissing(_)) => {
                tracing::warn!(subject_id = %subject_id, error = %error, "required scope missing");
                diagnostics.push(Artifact::text("scope_error.txt", format!("{}\n", error)));
                return failed_outcome(
                    subject_id,
                    SubjectStatus::ScopeMissing,
                    Some(refreshed),
                    diagnostics,
                );
            }
            Err(error) => {
                tracing::warn!(subject_id = %subject_id, error = %error, "range probe failed");
                diagnostics.push(Artifact::text(
                    "probe_error.txt",
                    format!("range probe failed: {}\n", error),
                ));
            }
        }

        // 3. Authoritative per-day fetch, then flatten.
        let report = self.daily.fetch(&refreshed.access_token, range).await;
        if !report.skipped.is_empty() {
            diagnostics.push(Artifact::text(
                "skipped_days.txt",
                report.skipped_summary(),
            ));
        }

        let mut summary_rows = Vec::new();
        let mut level_data_rows = Vec::new();
        let mut level_short_rows = Vec::new();
        for record in &report.records {
            let flattened = flatten(&subject_id, record);
            summary_rows.push(flattened.summary);
            level_data_rows.extend(flattened.level_data);
            level_short_rows.extend(flattened.level_short);
        }

        let status = if summary_rows.is_empty() {
            SubjectStatus::NoData
        } else {
            SubjectStatus::Ok
        };

        CollectionOutcome {
            subject_id,
            status,
            summary_rows,
            level_data_rows,
            level_short_rows,
            updated_credential: Some(refreshed),
            diagnostics,
        }
    }
}

/// Outcome for a subject whose pipeline stopped before producing rows.
fn failed_outcome(
    subject_id: String,
    status: SubjectStatus,
    updated_credential: Option<Credential>,
    diagnostics: Vec<Artifact>,
) -> CollectionOutcome {
    CollectionOutcome {
        subject_id,
        status,
        summary_rows: Vec::new(),
        level_data_rows: Vec::new(),
        level_short_rows: Vec::new(),
        updated_credential,
        diagnostics,
    }
}
