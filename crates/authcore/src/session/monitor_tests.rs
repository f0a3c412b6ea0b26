// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::*;
use crate::credential::{TokenSet, UserRecord};
use crate::events::SessionEvent;

fn test_config(idle_secs: u64, absolute_secs: u64) -> Arc<AuthConfig> {
    let mut config = AuthConfig::new("http://localhost");
    config.idle_timeout_secs = idle_secs;
    config.absolute_timeout_secs = absolute_secs;
    config.remember_timeout_secs = 3600;
    config.idle_warning_lead_secs = 0;
    Arc::new(config)
}

fn live_store() -> Arc<CredentialStore> {
    let store = Arc::new(CredentialStore::new(None));
    store.store(&TokenSet {
        access_token: "tok".to_owned(),
        refresh_token: Some("refresh".to_owned()),
        token_type: "bearer".to_owned(),
        expires_in: 3600,
    });
    store.store_user(&UserRecord {
        user_id: "u1".to_owned(),
        email: "pat@example.com".to_owned(),
        roles: vec![],
    });
    store
}

fn live_hub() -> Arc<EventHub> {
    let hub = Arc::new(EventHub::new());
    hub.mark_active();
    hub
}

#[test]
fn idle_timeout_expires_the_session_once() {
    let store = live_store();
    store.mark_login(false);
    let hub = live_hub();
    let mut rx = hub.subscribe();
    let monitor = SessionMonitor::new(test_config(0, 3600), Arc::clone(&store), hub);

    monitor.tick();

    assert_eq!(monitor.state(), SessionState::Expired);
    assert!(!store.has_session());
    assert_eq!(
        rx.try_recv().ok(),
        Some(SessionEvent::SessionTerminated { reason: TerminationReason::IdleTimeout })
    );

    // Store is cleared, so a second tick sees no session and stays quiet.
    monitor.tick();
    assert!(rx.try_recv().is_err());
}

#[test]
fn absolute_timeout_wins_over_idle() {
    let store = live_store();
    store.mark_login(false);
    let hub = live_hub();
    let mut rx = hub.subscribe();
    let monitor = SessionMonitor::new(test_config(0, 0), Arc::clone(&store), hub);

    monitor.tick();

    assert_eq!(
        rx.try_recv().ok(),
        Some(SessionEvent::SessionTerminated { reason: TerminationReason::AbsoluteTimeout })
    );
}

#[test]
fn remember_extends_the_absolute_window() {
    let store = live_store();
    store.mark_login(true);
    let hub = live_hub();
    let mut rx = hub.subscribe();
    // Absolute window of zero would expire instantly without `remember`.
    let monitor = SessionMonitor::new(test_config(3600, 0), Arc::clone(&store), hub);

    monitor.tick();

    assert_eq!(monitor.state(), SessionState::Active);
    assert!(store.has_session());
    assert!(rx.try_recv().is_err());
}

#[test]
fn idle_warning_fires_once_per_quiet_period() {
    let store = live_store();
    store.mark_login(false);
    let hub = live_hub();
    let mut rx = hub.subscribe();
    let mut config = AuthConfig::new("http://localhost");
    config.idle_timeout_secs = 3600;
    config.absolute_timeout_secs = 7200;
    // Lead covers the whole window, so the warning is due immediately.
    config.idle_warning_lead_secs = 3600;
    let monitor = SessionMonitor::new(Arc::new(config), Arc::clone(&store), hub);

    monitor.tick();
    assert_eq!(monitor.state(), SessionState::IdleWarning);
    assert!(matches!(rx.try_recv(), Ok(SessionEvent::IdleWarning { .. })));

    monitor.tick();
    assert!(rx.try_recv().is_err(), "warning must not repeat while idle");

    // Activity re-arms the warning.
    monitor.record_activity();
    assert_eq!(monitor.state(), SessionState::Active);
    monitor.tick();
    assert!(matches!(rx.try_recv(), Ok(SessionEvent::IdleWarning { .. })));
}

#[test]
fn without_a_session_the_monitor_is_a_noop() {
    let store = Arc::new(CredentialStore::new(None));
    let hub = Arc::new(EventHub::new());
    let mut rx = hub.subscribe();
    let monitor = SessionMonitor::new(test_config(0, 0), store, hub);

    monitor.tick();

    assert_eq!(monitor.state(), SessionState::Active);
    assert!(rx.try_recv().is_err());
}
