// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bare HTTP calls against the identity provider.
//!
//! These requests never pass through the request pipeline's 401 hook: a
//! renewal that triggered another renewal would recurse.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::credential::UserRecord;
use crate::error::AuthError;
use crate::transport::response::ApiPayload;

/// Successful login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "crate::credential::default_token_type")]
    pub token_type: String,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: u64,
    pub user: UserRecord,
    /// Anti-forgery token, when the provider issues one at login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

/// Successful refresh payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Error payload from the provider.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// HTTP client for the identity endpoints (login, refresh, logout).
pub struct IdentityClient {
    http: reqwest::Client,
    config: Arc<AuthConfig>,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client, config: Arc<AuthConfig>) -> Self {
        Self { http, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Exchange credentials for a token set and user record.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self
            .http
            .post(self.url(&self.config.login_path))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Transport { attempts: 1, source: e })?;

        let status = resp.status().as_u16();
        let bytes =
            resp.bytes().await.map_err(|e| AuthError::Transport { attempts: 1, source: e })?;
        if !(200..300).contains(&status) {
            return Err(AuthError::Api { status, attempts: 1, message: provider_error(&bytes) });
        }
        let value = ApiPayload::from_slice(&bytes)?.into_inner();
        serde_json::from_value(value).map_err(|e| AuthError::Decode(e.to_string()))
    }

    /// Exchange a refresh token for a new token set. One attempt; the
    /// coordinator owns retries.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let resp = self
            .http
            .post(self.url(&self.config.refresh_path))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Transport { attempts: 1, source: e })?;

        let status = resp.status().as_u16();
        let bytes =
            resp.bytes().await.map_err(|e| AuthError::Transport { attempts: 1, source: e })?;
        if !(200..300).contains(&status) {
            return Err(AuthError::Api { status, attempts: 1, message: provider_error(&bytes) });
        }
        let value = ApiPayload::from_slice(&bytes)?.into_inner();
        serde_json::from_value(value).map_err(|e| AuthError::Decode(e.to_string()))
    }

    /// Best-effort server-side logout. Callers clear local state regardless
    /// of the outcome.
    pub async fn logout(&self, access_token: Option<&str>) -> Result<(), AuthError> {
        let mut req = self.http.post(self.url(&self.config.logout_path));
        if let Some(token) = access_token {
            req = req.bearer_auth(token);
        }
        let resp =
            req.send().await.map_err(|e| AuthError::Transport { attempts: 1, source: e })?;
        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let bytes = resp.bytes().await.unwrap_or_default();
            return Err(AuthError::Api { status, attempts: 1, message: provider_error(&bytes) });
        }
        Ok(())
    }
}

/// Extract a provider error message, falling back to the raw body text.
fn provider_error(bytes: &[u8]) -> String {
    match serde_json::from_slice::<ProviderError>(bytes) {
        Ok(err) => match err.error_description {
            Some(desc) => format!("{}: {desc}", err.error),
            None => err.error,
        },
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
