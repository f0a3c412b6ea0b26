// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential store: the single owner of persisted session fields.
//!
//! All fields of a credential record are written in one critical section,
//! so no reader observes a partially-written record. When the backing file
//! cannot be read or written, operations degrade to memory-only for the
//! current process lifetime instead of failing, and the rest of the system
//! keeps working.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use crate::credential::persist::{self, PersistedSession};
use crate::credential::{epoch_ms, TokenSet, UserRecord};

pub struct CredentialStore {
    inner: RwLock<PersistedSession>,
    path: Option<PathBuf>,
    /// Set after the first failed write; downgrades further warnings.
    degraded: AtomicBool,
}

impl CredentialStore {
    /// Create a store, seeding in-memory state from `path` when readable.
    pub fn new(path: Option<PathBuf>) -> Self {
        let inner = match &path {
            Some(p) => match persist::load(p) {
                Ok(session) => session,
                Err(e) => {
                    tracing::debug!(path = %p.display(), "no persisted session: {e}");
                    PersistedSession::default()
                }
            },
            None => PersistedSession::default(),
        };
        Self { inner: RwLock::new(inner), path, degraded: AtomicBool::new(false) }
    }

    /// Overwrite the credential record with a freshly issued token set.
    ///
    /// The absolute expiry is derived here, at store-time, from the
    /// server-supplied lifetime and a single clock sample. Every field is
    /// replaced, never merged.
    pub fn store(&self, tokens: &TokenSet) {
        let now = epoch_ms();
        {
            let mut inner = self.inner.write();
            inner.access_token = Some(tokens.access_token.clone());
            inner.refresh_token = tokens.refresh_token.clone();
            inner.token_type = Some(tokens.token_type.clone());
            inner.expires_at_ms = now.saturating_add(tokens.expires_in.saturating_mul(1000));
        }
        self.persist();
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.read().refresh_token.clone()
    }

    pub fn token_type(&self) -> Option<String> {
        self.inner.read().token_type.clone()
    }

    /// Whether the access token is absent or past expiry, allowing for
    /// `skew` of clock drift. `now + skew >= expires_at`.
    pub fn is_expired(&self, skew: Duration) -> bool {
        let inner = self.inner.read();
        if inner.access_token.is_none() {
            return true;
        }
        epoch_ms().saturating_add(skew.as_millis() as u64) >= inner.expires_at_ms
    }

    pub fn store_user(&self, user: &UserRecord) {
        self.inner.write().user = Some(user.clone());
        self.persist();
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.inner.read().user.clone()
    }

    pub fn store_csrf(&self, token: &str) {
        self.inner.write().csrf_token = Some(token.to_owned());
        self.persist();
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.inner.read().csrf_token.clone()
    }

    /// Record a user interaction. Called from discrete events only; the
    /// monitor compares against this stored value rather than sampling the
    /// clock inside derived computations.
    pub fn touch_activity(&self) {
        self.inner.write().last_activity_ms = epoch_ms();
        self.persist();
    }

    pub fn last_activity(&self) -> u64 {
        self.inner.read().last_activity_ms
    }

    /// Stamp the session start and reset the activity clock.
    pub fn mark_login(&self, remember: bool) {
        let now = epoch_ms();
        {
            let mut inner = self.inner.write();
            inner.logged_in_at_ms = now;
            inner.last_activity_ms = now;
            inner.remember = remember;
        }
        self.persist();
    }

    pub fn logged_in_at(&self) -> u64 {
        self.inner.read().logged_in_at_ms
    }

    pub fn remember(&self) -> bool {
        self.inner.read().remember
    }

    /// Whether a session is live: cached user plus an access token.
    pub fn has_session(&self) -> bool {
        let inner = self.inner.read();
        inner.user.is_some() && inner.access_token.is_some()
    }

    /// Remove every field. Idempotent.
    pub fn clear(&self) {
        *self.inner.write() = PersistedSession::default();
        self.persist();
    }

    fn persist(&self) {
        let Some(ref path) = self.path else {
            return;
        };
        let snapshot = self.inner.read().clone();
        match persist::save(path, &snapshot) {
            Ok(()) => {
                self.degraded.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                if self.degraded.swap(true, Ordering::Relaxed) {
                    tracing::debug!("session persistence still unavailable: {e}");
                } else {
                    tracing::warn!(
                        path = %path.display(),
                        "session persistence unavailable, continuing in memory: {e}"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
