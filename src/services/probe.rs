// SPDX-License-Identifier: MIT

//! Pre-flight scope gate and range probe.
//!
//! The probe exists for diagnostics only: it checks the credential's granted
//! scopes before any network traffic, then issues one padded-range query to
//! capture the rate-limit allowance and a coarse record count. Its result
//! never populates output rows; the per-day fetch stays authoritative.

use crate::error::{CollectError, Result};
use crate::models::{Artifact, Credential, DateRange};
use crate::services::FitbitClient;

/// Scope required to read sleep data.
pub const SLEEP_READ_SCOPE: &str = "sleep";

/// Diagnostic result of one range probe.
#[derive(Debug, Clone)]
pub struct RangeDiagnostic {
    /// The padded range actually queried
    pub probed: DateRange,
    /// Coarse record count over the padded range
    pub record_count: usize,
    /// Rate-limit-remaining header, verbatim, when the provider sent one
    pub rate_limit_remaining: Option<String>,
}

impl RangeDiagnostic {
    /// Render to the text artifact included in the bundle.
    pub fn to_artifact(&self) -> Artifact {
        let rate_limit = self.rate_limit_remaining.as_deref().unwrap_or("(not sent)");
        Artifact::text(
            "range_probe.txt",
            format!(
                "probed range: {} to {}\nrecords in range: {}\nrate limit remaining: {}\n",
                self.probed.start(),
                self.probed.end(),
                self.record_count,
                rate_limit
            ),
        )
    }
}

/// Validates scope and probes availability ahead of the per-day fetch.
pub struct RangeFetcher {
    client: FitbitClient,
}

impl RangeFetcher {
    pub fn new(client: FitbitClient) -> Self {
        Self { client }
    }

    /// Scope-gate the credential, then issue one query over the range padded
    /// by a day on each side.
    ///
    /// A missing `sleep` scope fails before any network call. Everything
    /// else that can go wrong here (non-2xx, malformed body, transport) is
    /// non-fatal to the subject: the orchestrator records it and proceeds to
    /// the per-day fetch.
    pub async fn probe(
        &self,
        credential: &Credential,
        range: &DateRange,
    ) -> Result<RangeDiagnostic> {
        if !credential.has_scope(SLEEP_READ_SCOPE) {
            return Err(CollectError::ScopeMissing(SLEEP_READ_SCOPE.to_string()));
        }

        let probed = range.padded(1);
        let (response, rate_limit_remaining) = self
            .client
            .sleep_for_range(&credential.access_token, &probed)
            .await?;

        Ok(RangeDiagnostic {
            probed,
            record_count: response.sleep.len(),
            rate_limit_remaining,
        })
    }
}
