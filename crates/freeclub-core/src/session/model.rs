use crate::identity::Identity;
use std::sync::{Arc, PoisonError, RwLock};

/// An authenticated session: who is signed in and the bearer token they use.
///
/// Expiry is implicit; the backend signals it by answering 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

/// Shared view of the single in-memory session.
///
/// Cloning the handle shares the same slot. The session store is its only
/// writer; the gateway reads the bearer token from it on every call.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    slot: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Session> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.token.clone())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.identity.clone())
    }

    pub fn is_active(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Installs a complete session, replacing any previous one.
    pub fn install(&self, session: Session) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Drops the session. Returns whether one was active.
    pub fn clear(&self) -> bool {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }
}
