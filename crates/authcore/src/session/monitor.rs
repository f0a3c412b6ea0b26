// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background watchdog for idle and absolute timeouts.
//!
//! The two windows are tracked independently and whichever elapses first
//! forces the session to expire. Activity only ever arrives through
//! [`SessionMonitor::record_activity`], a discrete side-effecting step
//! that stamps the store, and each sampling tick compares stored
//! timestamps against one clock read taken at the top of the tick. Derived
//! computations never read the live clock.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::AuthConfig;
use crate::credential::epoch_ms;
use crate::credential::store::CredentialStore;
use crate::events::{EventHub, TerminationReason};
use crate::session::SessionState;

pub struct SessionMonitor {
    config: Arc<AuthConfig>,
    store: Arc<CredentialStore>,
    hub: Arc<EventHub>,
    state: RwLock<SessionState>,
}

impl SessionMonitor {
    pub fn new(config: Arc<AuthConfig>, store: Arc<CredentialStore>, hub: Arc<EventHub>) -> Self {
        Self { config, store, hub, state: RwLock::new(SessionState::Active) }
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Record a user interaction (click, key press, navigation). Resets
    /// the idle window; never called from inside a derivation pass.
    pub fn record_activity(&self) {
        if !self.store.has_session() {
            return;
        }
        self.store.touch_activity();
        *self.state.write() = SessionState::Active;
        self.hub.clear_warning();
    }

    /// Reset after a fresh login.
    pub(crate) fn reset(&self) {
        *self.state.write() = SessionState::Active;
        self.hub.clear_warning();
    }

    /// Run the sampling loop until `shutdown` is cancelled.
    pub fn spawn(self: &Arc<Self>, shutdown: CancellationToken) {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.config.sample_interval());
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => monitor.tick(),
                }
            }
        });
    }

    /// One sampling pass over the stored timestamps.
    pub(crate) fn tick(&self) {
        if !self.store.has_session() {
            return;
        }
        let now = epoch_ms();

        let absolute = if self.store.remember() {
            self.config.remember_timeout()
        } else {
            self.config.absolute_timeout()
        };
        let age_ms = now.saturating_sub(self.store.logged_in_at());
        if age_ms >= absolute.as_millis() as u64 {
            self.expire(TerminationReason::AbsoluteTimeout);
            return;
        }

        let idle_timeout_ms = self.config.idle_timeout().as_millis() as u64;
        let idle_ms = now.saturating_sub(self.store.last_activity());
        if idle_ms >= idle_timeout_ms {
            self.expire(TerminationReason::IdleTimeout);
            return;
        }

        let remaining_ms = idle_timeout_ms - idle_ms;
        if remaining_ms <= self.config.idle_warning_lead().as_millis() as u64 {
            let mut state = self.state.write();
            if *state == SessionState::Active {
                *state = SessionState::IdleWarning;
                drop(state);
                self.hub.idle_warning(remaining_ms / 1000);
            }
        }
    }

    fn expire(&self, reason: TerminationReason) {
        *self.state.write() = SessionState::Expired;
        self.hub.terminate(&self.store, reason);
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
