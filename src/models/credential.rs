// SPDX-License-Identifier: MIT

//! OAuth credential model and subject loading.
//!
//! Credential files follow the `token_<subjectId>.json` naming convention;
//! the subject id exists purely to namespace outputs, never to authorize
//! anything. A refresh produces a *new* credential value (the old one is
//! never mutated), so stale references cannot survive a rotation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CollectError, Result};

/// Filename prefix for credential files.
pub const TOKEN_FILE_PREFIX: &str = "token_";
/// Filename suffix for credential files.
pub const TOKEN_FILE_SUFFIX: &str = ".json";

/// One subject's OAuth credential set.
///
/// The named fields are the ones the pipeline reads; everything else the
/// provider issued (`expires_in`, `user_id`, `token_type`, ...) rides along
/// in `extra` so a refreshed credential round-trips every key from the
/// original token file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Current access token
    pub access_token: String,
    /// Current refresh token (single-use: rotated on every refresh)
    pub refresh_token: String,
    /// Granted scopes, space-separated (the provider's convention)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// All other provider-issued fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credential {
    /// The set of API capabilities this credential was granted.
    pub fn granted_scopes(&self) -> HashSet<&str> {
        self.scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .collect()
    }

    /// Whether the credential was granted the named scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.granted_scopes().contains(scope)
    }

    /// Merge a token-endpoint response payload over this credential,
    /// returning the merged credential as a new value.
    ///
    /// Keys in the payload replace keys in the credential (this is how a
    /// rotated refresh token displaces the stale one); keys the payload does
    /// not mention are kept, including the client identity.
    pub fn merged_with(&self, payload: &Map<String, Value>) -> Result<Credential> {
        let mut merged = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                return Err(CollectError::Internal(anyhow::anyhow!(
                    "credential did not serialize to a JSON object"
                )))
            }
        };
        for (key, value) in payload {
            merged.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(merged)).map_err(|e| {
            CollectError::MalformedResponse(format!("merged credential is invalid: {}", e))
        })
    }
}

/// One unit of work: a subject label plus the credential that fetches
/// their data.
#[derive(Debug, Clone)]
pub struct SubjectRequest {
    /// Output-namespacing label derived from the credential filename
    pub subject_id: String,
    /// The subject's credential
    pub credential: Credential,
}

impl SubjectRequest {
    /// Parse one `token_<subjectId>.json` file into a subject request.
    pub fn from_token_file(filename: &str, bytes: &[u8]) -> Result<Self> {
        let subject_id = subject_id_from_filename(filename)?.to_string();
        let credential = serde_json::from_slice(bytes).map_err(|e| {
            CollectError::Input(format!("{}: invalid credential JSON: {}", filename, e))
        })?;
        Ok(Self {
            subject_id,
            credential,
        })
    }
}

/// Derive the subject id from a credential filename.
///
/// Only `token_<subjectId>.json` resolves; anything else is an input error.
pub fn subject_id_from_filename(filename: &str) -> Result<&str> {
    filename
        .strip_prefix(TOKEN_FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(TOKEN_FILE_SUFFIX))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            CollectError::Input(format!(
                "cannot derive a subject id from {:?}: expected token_<subjectId>.json",
                filename
            ))
        })
}

/// Parse a batch of `(filename, bytes)` pairs into subject requests.
///
/// The whole batch is validated up front: one unresolvable filename or
/// unparseable credential rejects the batch before any pipeline starts.
pub fn load_subjects(files: &[(String, Vec<u8>)]) -> Result<Vec<SubjectRequest>> {
    files
        .iter()
        .map(|(filename, bytes)| SubjectRequest::from_token_file(filename, bytes))
        .collect()
}
