// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential lifecycle: store, persistence, and single-flight renewal.

pub mod coordinator;
pub mod persist;
pub mod store;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Token material as issued by the identity provider.
///
/// `expires_in` is the server-supplied lifetime in seconds; the store
/// derives an absolute expiry from it at store-time. Never assume a fixed
/// lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// Cached user identity and role grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub email: String,
    /// A user may hold several roles.
    #[serde(default)]
    pub roles: Vec<String>,
}

pub fn default_token_type() -> String {
    "bearer".to_owned()
}

/// Current time as milliseconds since the Unix epoch.
pub fn epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}
