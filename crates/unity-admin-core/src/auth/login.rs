//! Credential exchange against the login endpoint.
//!
//! The login endpoint does not follow the envelope convention of the rest
//! of the API: it may answer with a bare OAuth2 token document or with the
//! token nested under `data`. It is called directly, outside the request
//! pipeline, and never carries a bearer header.

use reqwest::{header, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::SessionStore;
use crate::api::envelope::{ErrorBody, SUCCESS_CODE};

/// Field holding the credential in either response shape
const ACCESS_TOKEN_FIELD: &str = "access_token";

/// Message used when the exchange fails without a remote explanation
const NO_CREDENTIAL_MESSAGE: &str = "Login succeeded but no credential was obtained";

#[derive(Error, Debug)]
pub enum LoginError {
    /// The remote reported a structured failure; the message is its own.
    #[error("{0}")]
    Rejected(String),

    #[error("{}", NO_CREDENTIAL_MESSAGE)]
    NoCredential,

    #[error("Unable to reach the login endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to persist credential: {0}")]
    Storage(anyhow::Error),
}

type TokenExtractor = fn(&Value) -> Option<&str>;

/// Where a credential may live in a successful login response, in the
/// order they are tried.
const TOKEN_EXTRACTORS: &[(&str, TokenExtractor)] = &[
    ("top-level", top_level_token),
    ("data", nested_data_token),
];

fn top_level_token(body: &Value) -> Option<&str> {
    body.get(ACCESS_TOKEN_FIELD)?.as_str()
}

fn nested_data_token(body: &Value) -> Option<&str> {
    body.get("data")?.get(ACCESS_TOKEN_FIELD)?.as_str()
}

/// Run the extraction strategies in order; first non-empty match wins.
pub(crate) fn extract_token(body: &Value) -> Option<&str> {
    TOKEN_EXTRACTORS.iter().find_map(|(name, extract)| {
        let token = extract(body).filter(|t| !t.is_empty())?;
        debug!(strategy = name, "Credential extracted from login response");
        Some(token)
    })
}

/// Classify a login response body. Returns the credential on success.
fn credential_from_body(body: &Value) -> Result<String, LoginError> {
    if let Some(code) = body.get("code").and_then(Value::as_i64) {
        if code != SUCCESS_CODE {
            let message = body
                .get("msg")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            return Err(message.map_or(LoginError::NoCredential, LoginError::Rejected));
        }
    }

    extract_token(body)
        .map(str::to_string)
        .ok_or(LoginError::NoCredential)
}

impl SessionStore {
    /// Exchange `username`/`password` for a credential and store it.
    ///
    /// The store is only mutated when a credential was obtained.
    pub async fn login(
        &self,
        http: &Client,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<(), LoginError> {
        let response = http
            .post(url)
            .header(header::ACCEPT, "application/json")
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message());
            warn!(status = status.as_u16(), "Login rejected");
            return Err(message.map_or(LoginError::NoCredential, LoginError::Rejected));
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, "Login response is not JSON");
            LoginError::NoCredential
        })?;

        let token = credential_from_body(&body).inspect_err(|e| {
            warn!(error = %e, "Login failed");
        })?;

        self.set_credential(&token).map_err(LoginError::Storage)?;
        info!(username, "Login successful");
        Ok(())
    }
}
