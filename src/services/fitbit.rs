// SPDX-License-Identifier: MIT

//! Fitbit Web API client.
//!
//! Handles:
//! - Refresh-token grant against the OAuth token endpoint
//! - Sleep-by-date-range and sleep-by-single-date queries
//! - Rate-limit header capture for diagnostics
//!
//! The base URL is configurable so tests can point at a local mock server;
//! every request carries the configured bounded timeout.

use base64::engine::general_purpose;
use base64::Engine as _;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::{CollectError, Result};
use crate::models::{DateRange, SleepResponse};

/// Response header carrying the remaining request allowance.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "fitbit-rate-limit-remaining";

/// Fitbit API client.
#[derive(Clone)]
pub struct FitbitClient {
    http: reqwest::Client,
    base_url: String,
}

impl FitbitClient {
    /// Create a client from the collector configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                CollectError::Internal(anyhow::anyhow!("failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange a refresh token for a new token payload.
    ///
    /// POST `{base}/oauth2/token` with the client identity as HTTP basic
    /// auth and a `grant_type=refresh_token` form body. Success is HTTP 200
    /// with a JSON object containing at least `access_token`; the raw object
    /// is returned so the caller can merge every issued field.
    pub async fn refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<Map<String, Value>> {
        let auth_header =
            general_purpose::STANDARD.encode(format!("{}:{}", client_id, client_secret));

        let response = self
            .http
            .post(format!("{}/oauth2/token", self.base_url))
            .header("Authorization", format!("Basic {}", auth_header))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| CollectError::AuthTransport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CollectError::AuthTransport(e.to_string()))?;

        if status.as_u16() != 200 {
            return Err(CollectError::AuthRejected {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(payload)) if payload.contains_key("access_token") => Ok(payload),
            Ok(_) => Err(CollectError::MalformedResponse(
                "token response has no access_token".to_string(),
            )),
            Err(e) => Err(CollectError::MalformedResponse(format!(
                "token response is not JSON: {}",
                e
            ))),
        }
    }

    /// Fetch sleep logs for a whole date range in one query.
    ///
    /// Returns the parsed response plus the rate-limit-remaining header,
    /// captured verbatim when present.
    pub async fn sleep_for_range(
        &self,
        access_token: &str,
        range: &DateRange,
    ) -> Result<(SleepResponse, Option<String>)> {
        let url = format!(
            "{}/1.2/user/-/sleep/date/{}/{}.json",
            self.base_url,
            range.start(),
            range.end()
        );

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CollectError::Transport(e.to_string()))?;

        let rate_limit_remaining = response
            .headers()
            .get(RATE_LIMIT_REMAINING_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let parsed = check_response_json(response).await?;
        Ok((parsed, rate_limit_remaining))
    }

    /// Fetch sleep logs for a single date.
    pub async fn sleep_for_date(
        &self,
        access_token: &str,
        date: NaiveDate,
    ) -> Result<SleepResponse> {
        let url = format!("{}/1.2/user/-/sleep/date/{}.json", self.base_url, date);

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CollectError::Transport(e.to_string()))?;

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CollectError::Api {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| CollectError::MalformedResponse(format!("JSON parse error: {}", e)))
}
