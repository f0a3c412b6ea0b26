// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authcore: client-side authentication core for the console.
//!
//! Wraps every outbound API call with credential attachment, single-flight
//! token renewal, and bounded retry, and derives the current user's
//! effective permissions from a role hierarchy. The host owns rendering
//! and routing; this crate owns the session. All authorization decisions
//! here are advisory: the server is always the authority.

pub mod authz;
pub mod config;
pub mod credential;
pub mod error;
pub mod events;
pub mod session;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::authz::{AccessCheck, RoleHierarchy};
use crate::config::AuthConfig;
use crate::credential::coordinator::RefreshCoordinator;
use crate::credential::store::CredentialStore;
use crate::credential::{TokenSet, UserRecord};
use crate::error::AuthError;
use crate::events::{EventHub, SessionEvent, TerminationReason};
use crate::session::monitor::SessionMonitor;
use crate::session::SessionState;
use crate::transport::client::ApiClient;
use crate::transport::identity::IdentityClient;
use crate::transport::retry::RetryPolicy;

/// Composition root: owns the store, coordinator, pipeline, and monitor.
///
/// Explicitly constructed and torn down (no module-level globals), so the
/// single-flight state is resettable between test cases. Wrap in an `Arc`
/// to share with the host's tasks.
pub struct AuthCore {
    config: Arc<AuthConfig>,
    store: Arc<CredentialStore>,
    hub: Arc<EventHub>,
    identity: Arc<IdentityClient>,
    api: ApiClient,
    monitor: Arc<SessionMonitor>,
    roles: RoleHierarchy,
}

impl AuthCore {
    /// Build the core with the default role hierarchy.
    pub fn new(config: AuthConfig) -> Self {
        Self::with_hierarchy(config, RoleHierarchy::default())
    }

    /// Build the core with a host-supplied role hierarchy.
    pub fn with_hierarchy(config: AuthConfig, roles: RoleHierarchy) -> Self {
        let config = Arc::new(config);
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .unwrap_or_default();

        let store = Arc::new(CredentialStore::new(config.persist_path.clone()));
        let hub = Arc::new(EventHub::new());
        if store.has_session() {
            // Restored credentials: the session is live, but no
            // session_started event fires for it.
            hub.mark_active();
        }

        let identity = Arc::new(IdentityClient::new(http.clone(), Arc::clone(&config)));
        let coordinator = RefreshCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&identity),
            Arc::clone(&hub),
            RetryPolicy::from_config(&config),
        );
        let api =
            ApiClient::new(http, Arc::clone(&config), Arc::clone(&store), coordinator);
        let monitor = Arc::new(SessionMonitor::new(
            Arc::clone(&config),
            Arc::clone(&store),
            Arc::clone(&hub),
        ));

        Self { config, store, hub, identity, api, monitor, roles }
    }

    /// Authenticate against the identity provider and establish a session.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<UserRecord, AuthError> {
        let resp = self.identity.login(email, password).await?;
        let tokens = TokenSet {
            access_token: resp.access_token,
            refresh_token: Some(resp.refresh_token),
            token_type: resp.token_type,
            expires_in: resp.expires_in,
        };
        self.store.store(&tokens);
        if let Some(ref csrf) = resp.csrf_token {
            self.store.store_csrf(csrf);
        }
        self.store.store_user(&resp.user);
        self.store.mark_login(remember);
        self.monitor.reset();
        self.hub.session_started(&resp.user.user_id);
        tracing::info!(user = %resp.user.user_id, "session started");
        Ok(resp.user)
    }

    /// End the session. The server-side call is best-effort; local
    /// teardown proceeds regardless of its outcome.
    pub async fn logout(&self) {
        if let Err(e) = self.identity.logout(self.store.access_token().as_deref()).await {
            tracing::debug!(err = %e, "logout endpoint failed, clearing locally");
        }
        self.hub.terminate(&self.store, TerminationReason::Logout);
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.store.user()
    }

    /// A cached user plus an un-expired access token.
    pub fn is_authenticated(&self) -> bool {
        self.store.user().is_some() && !self.store.is_expired(Duration::ZERO)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.store.user().map(|u| self.roles.has_role(&u, role)).unwrap_or(false)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.store.user().map(|u| self.roles.has_permission(&u, permission)).unwrap_or(false)
    }

    pub fn has_access(&self, check: &AccessCheck) -> bool {
        self.store.user().map(|u| self.roles.has_access(&u, check)).unwrap_or(false)
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.hub.subscribe()
    }

    /// The request pipeline. Every business call goes through it; callers
    /// never attach credentials manually.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Record a user interaction for the idle-timeout window.
    pub fn record_activity(&self) {
        self.monitor.record_activity();
    }

    pub fn session_state(&self) -> SessionState {
        self.monitor.state()
    }

    /// Start the session monitor; it runs until `shutdown` is cancelled.
    pub fn spawn_monitor(&self, shutdown: CancellationToken) {
        self.monitor.spawn(shutdown);
    }

    /// The credential store, for hosts that need direct (read) access.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}
