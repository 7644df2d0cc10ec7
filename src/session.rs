//! Session context supplied to every request.
//!
//! The session module of the surrounding application owns tokens and the
//! sandbox flag. The orchestrator never caches them: each call takes a
//! fresh [`SessionSource::snapshot`], so a login or logout between two
//! calls is always observed by the second one.

use crate::config::secrets::SecretString;
use std::sync::{Arc, PoisonError, RwLock};

/// Authentication and mode context for one request.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    bearer_token: Option<SecretString>,
    sandbox_mode: bool,
}

impl SessionContext {
    /// No token, live mode.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(SecretString::from(token.into())),
            sandbox_mode: false,
        }
    }

    pub fn sandbox(mut self, enabled: bool) -> Self {
        self.sandbox_mode = enabled;
        self
    }

    pub fn token(mut self, token: Option<SecretString>) -> Self {
        self.bearer_token = token;
        self
    }

    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.bearer_token.as_ref()
    }

    pub fn sandbox_mode(&self) -> bool {
        self.sandbox_mode
    }
}

/// Anything that can hand the orchestrator the current session.
pub trait SessionSource {
    fn snapshot(&self) -> SessionContext;
}

impl SessionSource for SessionContext {
    fn snapshot(&self) -> SessionContext {
        self.clone()
    }
}

/// Shared, swappable session state.
///
/// Cloning yields another handle onto the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionContext>>,
}

impl SessionStore {
    pub fn new(initial: SessionContext) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn login(&self, token: impl Into<String>) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        session.bearer_token = Some(SecretString::from(token.into()));
    }

    pub fn logout(&self) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        session.bearer_token = None;
    }

    pub fn set_sandbox(&self, enabled: bool) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        session.sandbox_mode = enabled;
    }
}

impl SessionSource for SessionStore {
    fn snapshot(&self) -> SessionContext {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secrets::ExposeSecret;

    #[test]
    fn store_snapshot_reflects_login_and_logout() {
        let store = SessionStore::default();
        assert!(store.snapshot().bearer_token().is_none());

        store.login("tok-1");
        let snap = store.snapshot();
        assert_eq!(snap.bearer_token().unwrap().expose_secret(), "tok-1");

        store.logout();
        assert!(store.snapshot().bearer_token().is_none());
    }

    #[test]
    fn earlier_snapshot_is_not_affected_by_later_changes() {
        let store = SessionStore::new(SessionContext::with_token("old"));
        let before = store.snapshot();
        store.login("new");
        store.set_sandbox(true);

        assert_eq!(before.bearer_token().unwrap().expose_secret(), "old");
        assert!(!before.sandbox_mode());
        assert!(store.snapshot().sandbox_mode());
    }

    #[test]
    fn debug_output_redacts_token() {
        let session = SessionContext::with_token("super-secret");
        assert!(!format!("{session:?}").contains("super-secret"));
    }
}
