// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the authentication core.
///
/// Deserializable from the host's config file; every field except
/// `base_url` has a sensible default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the console API (identity and business endpoints).
    pub base_url: String,

    /// Login endpoint path, relative to `base_url`.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Token refresh endpoint path.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Logout endpoint path.
    #[serde(default = "default_logout_path")]
    pub logout_path: String,

    /// Path prefixes that never require a bearer token.
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    /// Per-attempt HTTP timeout in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Maximum send attempts for transient transport failures
    /// (the first try counts).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial retry backoff in milliseconds. Doubles per attempt.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff cap in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Clock-skew allowance for proactive expiry checks, in seconds.
    #[serde(default = "default_expiry_skew_secs")]
    pub expiry_skew_secs: u64,

    /// Seconds of inactivity before the session is force-expired.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Seconds before the idle timeout at which an `idle_warning`
    /// event fires.
    #[serde(default = "default_idle_warning_lead_secs")]
    pub idle_warning_lead_secs: u64,

    /// Maximum session lifetime in seconds, regardless of activity.
    #[serde(default = "default_absolute_timeout_secs")]
    pub absolute_timeout_secs: u64,

    /// Maximum session lifetime under the "remember me" flag.
    #[serde(default = "default_remember_timeout_secs")]
    pub remember_timeout_secs: u64,

    /// Session monitor sampling interval in milliseconds.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// JSON file for credential persistence. When unset, or when the file
    /// becomes unwritable, credentials live in memory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist_path: Option<PathBuf>,
}

fn default_login_path() -> String {
    "/auth/login".to_owned()
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_owned()
}

fn default_logout_path() -> String {
    "/auth/logout".to_owned()
}

fn default_public_paths() -> Vec<String> {
    vec!["/auth/".to_owned()]
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    4
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    8000
}

fn default_expiry_skew_secs() -> u64 {
    30
}

fn default_idle_timeout_secs() -> u64 {
    30 * 60
}

fn default_idle_warning_lead_secs() -> u64 {
    2 * 60
}

fn default_absolute_timeout_secs() -> u64 {
    24 * 60 * 60
}

fn default_remember_timeout_secs() -> u64 {
    30 * 24 * 60 * 60
}

fn default_sample_interval_ms() -> u64 {
    15_000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            logout_path: default_logout_path(),
            public_paths: default_public_paths(),
            http_timeout_secs: default_http_timeout_secs(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            expiry_skew_secs: default_expiry_skew_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            idle_warning_lead_secs: default_idle_warning_lead_secs(),
            absolute_timeout_secs: default_absolute_timeout_secs(),
            remember_timeout_secs: default_remember_timeout_secs(),
            sample_interval_ms: default_sample_interval_ms(),
            persist_path: None,
        }
    }
}

impl AuthConfig {
    /// Config with defaults for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn expiry_skew(&self) -> Duration {
        Duration::from_secs(self.expiry_skew_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn idle_warning_lead(&self) -> Duration {
        Duration::from_secs(self.idle_warning_lead_secs)
    }

    pub fn absolute_timeout(&self) -> Duration {
        Duration::from_secs(self.absolute_timeout_secs)
    }

    pub fn remember_timeout(&self) -> Duration {
        Duration::from_secs(self.remember_timeout_secs)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}
