// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request pipeline: every business call goes through here.
//!
//! Pre-send, the pipeline attaches the bearer token and, on mutating
//! methods, the anti-forgery token. Post-receive it resolves recoverable
//! 401s through the refresh coordinator (replaying the original request
//! once), retries transient transport failures with bounded geometric
//! backoff, and propagates everything else unchanged.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::config::AuthConfig;
use crate::credential::coordinator::RefreshCoordinator;
use crate::credential::store::CredentialStore;
use crate::error::AuthError;
use crate::transport::response::ApiPayload;
use crate::transport::retry::RetryPolicy;

/// Header carrying the anti-forgery token on mutating requests.
const CSRF_HEADER: &str = "X-CSRF-Token";

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<AuthConfig>,
    store: Arc<CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(
        http: reqwest::Client,
        config: Arc<AuthConfig>,
        store: Arc<CredentialStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        let retry = RetryPolicy::from_config(&config);
        Self { http, config, store, coordinator, retry }
    }

    pub async fn get(&self, path: &str) -> Result<Value, AuthError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, AuthError> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, AuthError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, AuthError> {
        self.request(Method::DELETE, path, None).await
    }

    /// Issue a request through the full pipeline and return the
    /// envelope-unwrapped payload.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, AuthError> {
        // Renew proactively when the stored token is already past expiry
        // under the configured skew: same single-flight path, saves a
        // guaranteed 401 round trip.
        if self.store.access_token().is_some() && self.store.is_expired(self.config.expiry_skew())
        {
            self.coordinator.ensure_fresh_token().await?;
        }

        // "Already retried" marker: a request gets exactly one
        // refresh-and-replay, then any further 401 is a hard failure.
        let mut refreshed = false;
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let resp = match self.execute(&method, path, body).await {
                Ok(resp) => resp,
                Err(e) if self.retry.should_retry(attempt) => {
                    tracing::debug!(attempt, path, err = %e, "transport failure, backing off");
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    continue;
                }
                Err(e) => return Err(AuthError::Transport { attempts: attempt, source: e }),
            };

            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED {
                if refreshed {
                    return Err(AuthError::Unauthenticated { status: status.as_u16() });
                }
                refreshed = true;
                if self.coordinator.ensure_fresh_token().await.is_err() {
                    // The coordinator has already torn the session down;
                    // surface the original failure.
                    return Err(AuthError::Unauthenticated { status: status.as_u16() });
                }
                // Replay the original request once. `execute` re-reads the
                // store, so the replay carries the token the renewal that
                // unblocked us installed.
                continue;
            }
            if status == StatusCode::FORBIDDEN {
                // Correctly authenticated, not allowed: never retried,
                // never a renewal trigger.
                return Err(AuthError::Forbidden { status: status.as_u16() });
            }
            if status.is_server_error() && self.retry.should_retry(attempt) {
                tracing::debug!(attempt, path, status = status.as_u16(), "server error, backing off");
                tokio::time::sleep(self.retry.delay_for(attempt)).await;
                continue;
            }

            let status_code = status.as_u16();
            let bytes = match resp.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => return Err(AuthError::Transport { attempts: attempt, source: e }),
            };
            if !status.is_success() {
                return Err(AuthError::Api {
                    status: status_code,
                    attempts: attempt,
                    message: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }
            return Ok(ApiPayload::from_slice(&bytes)?.into_inner());
        }
    }

    /// One send: attach credentials and dispatch.
    async fn execute(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut req = self.http.request(method.clone(), self.url(path));
        match self.store.access_token() {
            Some(token) => req = req.bearer_auth(token),
            None => {
                if !self.is_public(path) {
                    // The server stays the authority: send anyway and let
                    // it reject.
                    tracing::warn!(path, "no access token for protected endpoint, sending anyway");
                }
            }
        }
        if is_mutating(method) {
            if let Some(csrf) = self.store.csrf_token() {
                req = req.header(CSRF_HEADER, csrf);
            }
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        req.send().await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn is_public(&self, path: &str) -> bool {
        self.config.public_paths.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

fn is_mutating(method: &Method) -> bool {
    !matches!(method.as_str(), "GET" | "HEAD" | "OPTIONS")
}
