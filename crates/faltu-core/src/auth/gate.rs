use anyhow::Result;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Claims, CredentialStore, Identity};
use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No check has run yet
    Unknown,
    Authenticated(Identity),
    Unauthenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Owner of the stored credential.
///
/// The gate is the only writer of the `CredentialStore`. Consumers read the
/// current `AuthState` through `subscribe()` or ask for the token with
/// `credential()`. A stored token that fails to decode or has expired is
/// cleared on the next check, so the store holds either a usable token or
/// nothing.
pub struct AuthGate {
    store: Box<dyn CredentialStore>,
    login_url: String,
    state: watch::Sender<AuthState>,
}

impl AuthGate {
    pub fn new(store: Box<dyn CredentialStore>, login_url: impl Into<String>) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self {
            store,
            login_url: login_url.into(),
            state,
        }
    }

    /// Build a gate whose login endpoint is the client's Google login URL
    pub fn for_client(store: Box<dyn CredentialStore>, api: &ApiClient) -> Self {
        Self::new(store, api.login_url())
    }

    /// The stored token, valid or not. Storage errors read as absent.
    pub fn get_credential(&self) -> Option<String> {
        match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to load stored credential");
                None
            }
        }
    }

    /// Local validity check: the token decodes and its `exp` is not in the past.
    pub fn is_valid(token: &str) -> bool {
        Self::is_valid_at(token, Utc::now().timestamp())
    }

    pub fn is_valid_at(token: &str, now: i64) -> bool {
        Claims::decode(token)
            .map(|claims| !claims.is_expired_at(now))
            .unwrap_or(false)
    }

    pub fn derive_identity(token: &str) -> Option<Identity> {
        Claims::decode(token).map(|claims| claims.identity())
    }

    /// Re-evaluate the stored credential and publish the result.
    ///
    /// Anything other than a usable token is removed from the store: an
    /// expired or malformed token, or a store that cannot be read back.
    pub fn check(&self) -> AuthState {
        let new_state = match self.store.load() {
            Ok(Some(token)) if Self::is_valid(&token) => match Self::derive_identity(&token) {
                Some(identity) => AuthState::Authenticated(identity),
                None => AuthState::Unauthenticated,
            },
            Ok(Some(_)) => {
                debug!("Stored credential is expired or malformed, clearing it");
                self.clear_store();
                AuthState::Unauthenticated
            }
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "Stored credential is unreadable, clearing it");
                self.clear_store();
                AuthState::Unauthenticated
            }
        };
        self.state.send_replace(new_state.clone());
        new_state
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear invalid credential");
        }
    }

    /// The current token if it is still valid. Runs a check first.
    pub fn credential(&self) -> Option<String> {
        if self.check().is_authenticated() {
            self.get_credential()
        } else {
            None
        }
    }

    /// An API client carrying the current token, or `Unauthorized`.
    pub fn authorized(&self, api: &ApiClient) -> Result<ApiClient, ApiError> {
        self.credential()
            .map(|token| api.with_token(&token))
            .ok_or(ApiError::Unauthorized)
    }

    /// Where the user must go to log in.
    pub fn login(&self) -> &str {
        info!("Login requested");
        &self.login_url
    }

    /// Persist the token from the login callback and re-run the check.
    pub fn complete_login(&self, raw_token: &str) -> Result<AuthState> {
        self.store.save(raw_token.trim())?;
        let state = self.check();
        match state {
            AuthState::Authenticated(ref identity) => {
                info!(user = identity.label(), "Login successful");
            }
            _ => warn!("Login callback carried an unusable token"),
        }
        Ok(state)
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        self.state.send_replace(AuthState::Unauthenticated);
        info!("Logged out");
        Ok(())
    }

    /// Last published state, without re-checking.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}
