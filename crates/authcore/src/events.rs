// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle events, fanned out to host subscribers via broadcast.
//!
//! `session_terminated` is the only contract the host needs to implement a
//! redirect-to-login; it fires exactly once per termination cause.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::credential::store::CredentialStore;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Logout,
    IdleTimeout,
    AbsoluteTimeout,
    RefreshFailed,
}

/// Events delivered to host subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A session was established (login or restored credentials).
    SessionStarted { user_id: String },
    /// The idle timeout is close; the session expires unless activity
    /// is recorded within `expires_in_secs`.
    IdleWarning { expires_in_secs: u64 },
    /// The session ended. Fired exactly once per cause.
    SessionTerminated { reason: TerminationReason },
}

/// Broadcast hub for session events.
pub struct EventHub {
    event_tx: broadcast::Sender<SessionEvent>,
    /// True while a session is live; guards the exactly-once
    /// terminated signal.
    active: AtomicBool,
    /// Whether an idle warning was already emitted for this session.
    warned: AtomicBool,
}

impl EventHub {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self { event_tx, active: AtomicBool::new(false), warned: AtomicBool::new(false) }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Mark a session live without emitting an event (restored from disk).
    pub(crate) fn mark_active(&self) {
        self.active.store(true, Ordering::SeqCst);
        self.warned.store(false, Ordering::SeqCst);
    }

    /// Signal the start of a new session.
    pub fn session_started(&self, user_id: &str) {
        self.mark_active();
        let _ = self.event_tx.send(SessionEvent::SessionStarted { user_id: user_id.to_owned() });
    }

    /// Emit an idle warning, at most once per quiet period.
    pub(crate) fn idle_warning(&self, expires_in_secs: u64) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        if !self.warned.swap(true, Ordering::SeqCst) {
            let _ = self.event_tx.send(SessionEvent::IdleWarning { expires_in_secs });
        }
    }

    /// Re-arm the idle warning after activity resumed.
    pub(crate) fn clear_warning(&self) {
        self.warned.store(false, Ordering::SeqCst);
    }

    /// Terminate the session: signal every subscriber, then clear the
    /// store. The signal goes out first so no subscriber can observe an
    /// empty store ahead of the event. Returns false when no session was
    /// live (the signal already fired for this cause).
    pub fn terminate(&self, store: &CredentialStore, reason: TerminationReason) -> bool {
        if !self.active.swap(false, Ordering::SeqCst) {
            return false;
        }
        tracing::info!(?reason, "session terminated");
        let _ = self.event_tx.send(SessionEvent::SessionTerminated { reason });
        store.clear();
        true
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
