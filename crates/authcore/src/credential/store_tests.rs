// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;
use crate::credential::{TokenSet, UserRecord};

fn tokens(access: &str, expires_in: u64) -> TokenSet {
    TokenSet {
        access_token: access.to_owned(),
        refresh_token: Some("refresh-1".to_owned()),
        token_type: "bearer".to_owned(),
        expires_in,
    }
}

fn sample_user() -> UserRecord {
    UserRecord {
        user_id: "u-42".to_owned(),
        email: "pat@example.com".to_owned(),
        roles: vec!["admin".to_owned()],
    }
}

#[test]
fn store_then_get_round_trips() {
    let store = CredentialStore::new(None);
    store.store(&tokens("access-123", 3600));
    assert_eq!(store.access_token().as_deref(), Some("access-123"));
    assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
    assert_eq!(store.token_type().as_deref(), Some("bearer"));
    assert!(!store.is_expired(Duration::ZERO));
}

#[test]
fn missing_token_counts_as_expired() {
    let store = CredentialStore::new(None);
    assert!(store.is_expired(Duration::ZERO));
}

#[test]
fn zero_lifetime_expires_immediately() {
    let store = CredentialStore::new(None);
    store.store(&tokens("access-123", 0));
    assert!(store.is_expired(Duration::ZERO));
}

#[test]
fn skew_brings_expiry_forward() {
    let store = CredentialStore::new(None);
    store.store(&tokens("access-123", 5));
    assert!(!store.is_expired(Duration::ZERO));
    assert!(store.is_expired(Duration::from_secs(60)));
}

#[test]
fn overwrite_replaces_every_field() {
    let store = CredentialStore::new(None);
    store.store(&tokens("first", 3600));
    let rotated = TokenSet {
        access_token: "second".to_owned(),
        refresh_token: None,
        token_type: "bearer".to_owned(),
        expires_in: 60,
    };
    store.store(&rotated);
    assert_eq!(store.access_token().as_deref(), Some("second"));
    // Overwritten, not merged.
    assert_eq!(store.refresh_token(), None);
}

#[test]
fn user_and_csrf_round_trip() {
    let store = CredentialStore::new(None);
    assert_eq!(store.user(), None);
    store.store_user(&sample_user());
    store.store_csrf("csrf-abc");
    assert_eq!(store.user().map(|u| u.user_id), Some("u-42".to_owned()));
    assert_eq!(store.csrf_token().as_deref(), Some("csrf-abc"));
}

#[test]
fn clear_is_idempotent() {
    let store = CredentialStore::new(None);
    store.store(&tokens("access-123", 3600));
    store.store_user(&sample_user());
    store.clear();
    assert_eq!(store.access_token(), None);
    assert_eq!(store.user(), None);
    assert!(!store.has_session());
    // Second clear: same observable state, no error.
    store.clear();
    assert_eq!(store.access_token(), None);
    assert_eq!(store.user(), None);
}

#[test]
fn session_requires_user_and_token() {
    let store = CredentialStore::new(None);
    assert!(!store.has_session());
    store.store(&tokens("access-123", 3600));
    assert!(!store.has_session());
    store.store_user(&sample_user());
    assert!(store.has_session());
}

#[test]
fn persists_across_instances() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");

    let store = CredentialStore::new(Some(path.clone()));
    store.store(&tokens("access-123", 3600));
    store.store_user(&sample_user());
    store.mark_login(true);

    let reloaded = CredentialStore::new(Some(path));
    assert_eq!(reloaded.access_token().as_deref(), Some("access-123"));
    assert_eq!(reloaded.user().map(|u| u.email), Some("pat@example.com".to_owned()));
    assert!(reloaded.remember());
    assert!(reloaded.logged_in_at() > 0);
    assert!(reloaded.has_session());
    Ok(())
}

#[test]
fn clear_removes_the_persisted_record() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");

    let store = CredentialStore::new(Some(path.clone()));
    store.store(&tokens("access-123", 3600));
    store.clear();

    let reloaded = CredentialStore::new(Some(path));
    assert_eq!(reloaded.access_token(), None);
    assert!(!reloaded.has_session());
    Ok(())
}

#[test]
fn unavailable_storage_degrades_to_memory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    // The parent "directory" is a regular file, so every save fails.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory")?;
    let path = blocker.join("session.json");

    let store = CredentialStore::new(Some(path));
    store.store(&tokens("access-123", 3600));
    store.store_user(&sample_user());

    // Operations keep working for the process lifetime.
    assert_eq!(store.access_token().as_deref(), Some("access-123"));
    assert!(store.has_session());
    assert!(!store.is_expired(Duration::ZERO));
    store.clear();
    assert!(!store.has_session());
    Ok(())
}
