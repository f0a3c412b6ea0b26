// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight token renewal.
//!
//! A page that fires several calls at once can discover an expired token at
//! effectively the same instant. Naively each call would hit the renewal
//! endpoint itself: wasted renewals, and a race where a later renewal
//! response clobbers a token an earlier one just installed. The coordinator
//! guarantees at most one renewal call is in flight at any time; every
//! concurrent caller awaits the same outcome.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::credential::store::CredentialStore;
use crate::credential::{default_token_type, TokenSet};
use crate::error::AuthError;
use crate::events::{EventHub, TerminationReason};
use crate::transport::identity::IdentityClient;
use crate::transport::retry::{self, RetryPolicy};

/// Outcome fanned out to every waiter of an in-flight renewal.
#[derive(Debug, Clone)]
enum RefreshOutcome {
    Refreshed { access_token: String },
    Failed { reason: String },
}

pub struct RefreshCoordinator {
    store: Arc<CredentialStore>,
    identity: Arc<IdentityClient>,
    hub: Arc<EventHub>,
    retry: RetryPolicy,
    /// The shared pending renewal. Some(..) while a renewal is in flight;
    /// destroyed the instant it settles.
    pending: Mutex<Option<broadcast::Sender<RefreshOutcome>>>,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<CredentialStore>,
        identity: Arc<IdentityClient>,
        hub: Arc<EventHub>,
        retry: RetryPolicy,
    ) -> Arc<Self> {
        Arc::new(Self { store, identity, hub, retry, pending: Mutex::new(None) })
    }

    /// Return a fresh access token, renewing at most once across all
    /// concurrent callers.
    ///
    /// Waiters subscribe under the same lock the leader settles under, so
    /// the fan-out cannot be missed. On failure the session is terminated
    /// (`refresh_failed`) and every waiter sees the same error.
    pub async fn ensure_fresh_token(&self) -> Result<String, AuthError> {
        let (tx, refresh_token) = {
            let mut pending = self.pending.lock().await;
            if let Some(tx) = pending.as_ref() {
                // Join the renewal already in flight instead of starting
                // a second one.
                let mut rx = tx.subscribe();
                drop(pending);
                return match rx.recv().await {
                    Ok(RefreshOutcome::Refreshed { access_token }) => Ok(access_token),
                    Ok(RefreshOutcome::Failed { reason }) => {
                        Err(AuthError::RefreshFailed { reason })
                    }
                    Err(_) => Err(AuthError::RefreshFailed {
                        reason: "renewal abandoned".to_owned(),
                    }),
                };
            }

            let Some(refresh_token) = self.store.refresh_token() else {
                drop(pending);
                // A live session without a refresh token cannot be renewed.
                // With no session at all this is a plain error and no
                // termination signal fires.
                self.hub.terminate(&self.store, TerminationReason::RefreshFailed);
                return Err(AuthError::NoSession);
            };

            let (tx, _rx) = broadcast::channel(1);
            *pending = Some(tx.clone());
            (tx, refresh_token)
        };

        let result = self.renew(&refresh_token).await;

        // Settle: destroy the pending slot and fan out under the same lock
        // waiters subscribe under.
        {
            let mut pending = self.pending.lock().await;
            *pending = None;
            match &result {
                Ok(token) => {
                    let _ = tx.send(RefreshOutcome::Refreshed { access_token: token.clone() });
                }
                Err(e) => {
                    let _ = tx.send(RefreshOutcome::Failed { reason: e.to_string() });
                }
            }
        }

        if result.is_err() {
            self.hub.terminate(&self.store, TerminationReason::RefreshFailed);
        }
        result
    }

    /// Perform the renewal call and install the result.
    ///
    /// Transient transport failures are retried a bounded number of times;
    /// a provider rejection (invalid or revoked refresh token) is
    /// immediately fatal.
    async fn renew(&self, refresh_token: &str) -> Result<String, AuthError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.identity.refresh(refresh_token).await {
                Ok(resp) => {
                    let tokens = TokenSet {
                        access_token: resp.access_token,
                        // Providers may omit rotation; keep the proven
                        // refresh token then.
                        refresh_token: resp
                            .refresh_token
                            .or_else(|| Some(refresh_token.to_owned())),
                        token_type: resp.token_type.unwrap_or_else(default_token_type),
                        expires_in: resp.expires_in,
                    };
                    self.store.store(&tokens);
                    tracing::debug!("access token renewed");
                    return Ok(tokens.access_token);
                }
                Err(e) if retry::is_transient(&e) && self.retry.should_retry(attempt) => {
                    tracing::debug!(attempt, err = %e, "transient renewal failure, backing off");
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                }
                Err(e) => {
                    tracing::warn!(err = %e, "token renewal failed");
                    return Err(AuthError::RefreshFailed { reason: e.to_string() });
                }
            }
        }
    }
}
