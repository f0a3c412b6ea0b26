// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session persistence: load/save a JSON snapshot with atomic writes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::credential::UserRecord;

/// Persisted session state: one JSON object of independently readable
/// scalar keys. Conventionally only the [`CredentialStore`] mutates it.
///
/// [`CredentialStore`]: crate::credential::store::CredentialStore
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry as milliseconds since the Unix epoch. 0 = no token stored.
    #[serde(default)]
    pub expires_at_ms: u64,
    /// Anti-forgery token. A separate credential with its own lifetime,
    /// not rotated by token renewal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRecord>,
    /// Last observed user interaction, epoch milliseconds.
    #[serde(default)]
    pub last_activity_ms: u64,
    /// When the session was established, epoch milliseconds.
    #[serde(default)]
    pub logged_in_at_ms: u64,
    /// Whether the extended absolute-timeout window applies.
    #[serde(default)]
    pub remember: bool,
}

/// Load a persisted session from a JSON file.
pub fn load(path: &Path) -> anyhow::Result<PersistedSession> {
    let contents = std::fs::read_to_string(path)?;
    let session: PersistedSession = serde_json::from_str(&contents)?;
    Ok(session)
}

/// Save a persisted session to a JSON file atomically (write tmp + rename).
///
/// Uses a unique temp filename (PID + counter) to avoid corruption when
/// concurrent saves race on the same `.tmp` file — a shorter write can
/// leave trailing bytes from a longer previous write.
pub fn save(path: &Path, session: &PersistedSession) -> anyhow::Result<()> {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(session)?;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
