//! Session Store: the single owner of "who is signed in".
//!
//! The store is the only writer of the shared [`SessionHandle`] and of the two
//! durable keys. Login either stores a complete identity and token or nothing.
//! Every change of session drops the gateway's cached reads.

use freeclub_core::authorization::AuthorizationPolicy;
use freeclub_core::identity::Identity;
use freeclub_core::session::{
    IDENTITY_KEY, KeyValueStore, Session, SessionHandle, TOKEN_KEY,
};
use freeclub_core::{ClubError, Result};
use freeclub_interaction::{ResourceGateway, decode_subject};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a login attempt did not produce a session.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoginFailure {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("login timed out")]
    TimedOut,

    #[error("server error (status {status})")]
    ServerError { status: u16 },

    #[error("connection error")]
    Connection,

    #[error("login response carried no token")]
    MissingToken,

    #[error("token payload could not be decoded")]
    MalformedToken,

    #[error("account record unavailable")]
    AccountUnavailable,

    #[error("person record not found")]
    PersonNotFound,

    #[error("session could not be stored")]
    Storage,
}

impl LoginFailure {
    /// Text for the login form. Never mentions internals.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Incorrect username or password.",
            Self::TimedOut => "The server took too long to answer. Please try again.",
            Self::ServerError { .. } => {
                "The server could not process the login. Please try again later."
            }
            Self::Connection => "Connection error. Check your network and try again.",
            Self::MissingToken | Self::MalformedToken => {
                "The server sent an unexpected answer. Please contact an administrator."
            }
            Self::AccountUnavailable | Self::PersonNotFound => {
                "Your account is not fully set up. Please contact an administrator."
            }
            Self::Storage => "Your session could not be saved on this device.",
        }
    }

    /// Whether retrying the same credentials can help.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TimedOut | Self::Connection | Self::ServerError { .. }
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum LoginStep {
    Authenticate,
    Account,
    Person,
}

fn login_failure(step: LoginStep, err: &ClubError) -> LoginFailure {
    match err {
        ClubError::Timeout { .. } => return LoginFailure::TimedOut,
        ClubError::Transport(_) => return LoginFailure::Connection,
        ClubError::Http { status, .. } if *status >= 500 => {
            return LoginFailure::ServerError { status: *status };
        }
        _ => {}
    }
    match step {
        LoginStep::Authenticate => match err {
            ClubError::Unauthorized { .. } | ClubError::Http { status: 400, .. } => {
                LoginFailure::InvalidCredentials
            }
            ClubError::MalformedResponse { .. } => LoginFailure::MissingToken,
            _ => LoginFailure::Connection,
        },
        LoginStep::Account => LoginFailure::AccountUnavailable,
        LoginStep::Person if err.is_not_found() || err.is_malformed() => {
            LoginFailure::PersonNotFound
        }
        LoginStep::Person => LoginFailure::AccountUnavailable,
    }
}

/// Holds the signed-in identity and keeps it durable across restarts.
pub struct SessionStore {
    gateway: ResourceGateway,
    storage: Arc<dyn KeyValueStore>,
    session: SessionHandle,
    policy: AuthorizationPolicy,
    login_timeout: Duration,
    logout_on_unauthorized: bool,
}

impl SessionStore {
    /// The store writes to the gateway's session handle.
    pub fn new(
        gateway: ResourceGateway,
        storage: Arc<dyn KeyValueStore>,
        login_timeout: Duration,
    ) -> Self {
        let session = gateway.session().clone();
        Self {
            gateway,
            storage,
            session,
            policy: AuthorizationPolicy::new(),
            login_timeout,
            logout_on_unauthorized: false,
        }
    }

    pub fn with_logout_on_unauthorized(mut self, enabled: bool) -> Self {
        self.logout_on_unauthorized = enabled;
        self
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.session
    }

    /// Loads a previously persisted session without contacting the backend.
    ///
    /// Both keys must be present and well-formed. Anything else leaves the
    /// store logged out with durable state cleared. Returns whether a session
    /// was restored.
    pub fn restore(&self) -> bool {
        let identity = self.storage.get(IDENTITY_KEY);
        let token = self.storage.get(TOKEN_KEY);

        let restored = match (identity, token) {
            (Ok(None), Ok(None)) => return false,
            (Ok(Some(identity)), Ok(Some(token))) if !token.trim().is_empty() => {
                serde_json::from_str::<Identity>(&identity)
                    .map(|identity| Session { identity, token })
                    .map_err(|e| format!("stored identity is corrupt: {e}"))
            }
            (Err(e), _) | (_, Err(e)) => Err(format!("session storage unreadable: {e}")),
            _ => Err("stored session is incomplete".to_string()),
        };

        match restored {
            Ok(session) => {
                tracing::info!(subject_id = session.identity.subject_id, "session restored");
                self.session.install(session);
                true
            }
            Err(reason) => {
                tracing::warn!(%reason, "discarding persisted session");
                self.session.clear();
                self.clear_persisted();
                false
            }
        }
    }

    /// Authenticates and resolves the full identity within the login timeout.
    ///
    /// On failure nothing is persisted and the in-memory session is untouched.
    /// A storage failure also clears the durable keys.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        challenge_token: Option<&str>,
    ) -> std::result::Result<Identity, LoginFailure> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(LoginFailure::InvalidCredentials);
        }

        let attempt = self.resolve_identity(username.trim(), password, challenge_token);
        let (identity, token) = match tokio::time::timeout(self.login_timeout, attempt).await {
            Ok(Ok(resolved)) => resolved,
            Ok(Err(failure)) => {
                tracing::warn!(reason = %failure, "login failed");
                return Err(failure);
            }
            Err(_) => {
                let after_ms = self.login_timeout.as_millis() as u64;
                tracing::warn!(after_ms, "login timed out");
                return Err(LoginFailure::TimedOut);
            }
        };

        if let Err(e) = self.persist(&identity, &token) {
            tracing::warn!(error = %e, "login succeeded but the session could not be stored");
            return Err(LoginFailure::Storage);
        }
        self.session.install(Session {
            identity: identity.clone(),
            token,
        });
        self.gateway.invalidate_assignments();

        tracing::info!(
            subject_id = identity.subject_id,
            permissions = identity.granted_permissions.len(),
            "signed in"
        );
        Ok(identity)
    }

    /// Clears in-memory and durable session state and drops cached reads.
    /// Idempotent.
    ///
    /// Returns whether a session was active.
    pub fn logout(&self) -> bool {
        let was_active = self.session.clear();
        self.clear_persisted();
        self.gateway.invalidate_assignments();
        if was_active {
            tracing::info!("signed out");
        }
        was_active
    }

    /// `false` when nobody is signed in.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.policy
            .has_permission(self.session.identity().as_ref(), permission)
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_active()
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    /// Lets the store react to an error from an authenticated call.
    ///
    /// With `logout_on_unauthorized` set, a 401 ends the session. Returns
    /// whether the session was cleared.
    pub fn observe(&self, err: &ClubError) -> bool {
        if !err.is_unauthorized() {
            return false;
        }
        if !self.logout_on_unauthorized {
            tracing::debug!("backend rejected the session; keeping it as configured");
            return false;
        }
        tracing::warn!("backend rejected the session; signing out");
        self.logout()
    }

    async fn resolve_identity(
        &self,
        username: &str,
        password: &str,
        challenge_token: Option<&str>,
    ) -> std::result::Result<(Identity, String), LoginFailure> {
        let token = self
            .gateway
            .authenticate(username, password, challenge_token, self.login_timeout)
            .await
            .map_err(|e| login_failure(LoginStep::Authenticate, &e))?;

        let subject_id = decode_subject(&token).map_err(|e| {
            tracing::debug!(error = %e, "token payload rejected");
            LoginFailure::MalformedToken
        })?;

        let account = self
            .gateway
            .fetch_account_as(subject_id, &token)
            .await
            .map_err(|e| login_failure(LoginStep::Account, &e))?;

        let person_key = account.person_key().to_string();
        let person = self
            .gateway
            .fetch_person_as(&person_key, &token)
            .await
            .map_err(|e| login_failure(LoginStep::Person, &e))?;

        Ok((Identity::from_records(account, person), token))
    }

    /// Writes the identity, then the token. A failed write clears both keys
    /// so no half session, old or new, survives on disk.
    fn persist(&self, identity: &Identity, token: &str) -> Result<()> {
        let identity_json = serde_json::to_string(identity)?;
        let written = self
            .storage
            .set(IDENTITY_KEY, &identity_json)
            .and_then(|()| self.storage.set(TOKEN_KEY, token));
        if written.is_err() {
            self.clear_persisted();
        }
        written
    }

    fn clear_persisted(&self) {
        for key in [IDENTITY_KEY, TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "could not clear persisted session");
            }
        }
    }
}
