// SPDX-License-Identifier: MIT

//! Credential refresh lifecycle.

use crate::error::Result;
use crate::models::Credential;
use crate::services::FitbitClient;

/// Refreshes credentials through the provider's token endpoint.
///
/// Refresh is modeled as a pure transformation: the input credential is
/// never mutated, the merged result comes back as a new value. The provider
/// rotates refresh tokens, so the returned credential is the only one that
/// will authenticate on the next run; callers must persist it.
pub struct TokenLifecycleManager {
    client: FitbitClient,
}

impl TokenLifecycleManager {
    pub fn new(client: FitbitClient) -> Self {
        Self { client }
    }

    /// Exchange the credential's refresh token for a fresh access token and
    /// return the merged credential.
    ///
    /// On any failure the error propagates untouched and the input
    /// credential remains valid for the caller to inspect; no data endpoint
    /// may be called for this subject afterwards.
    pub async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let payload = self
            .client
            .refresh_token(
                &credential.client_id,
                &credential.client_secret,
                &credential.refresh_token,
            )
            .await?;

        let refreshed = credential.merged_with(&payload)?;
        tracing::debug!(
            rotated = refreshed.refresh_token != credential.refresh_token,
            "access token refreshed"
        );
        Ok(refreshed)
    }
}
