//! Authentication state shared by every API call.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};

/// Bearer token together with the moment it stops being valid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Cloneable handle to the current admin session.
///
/// Clones share the same state, so logging out through one handle is seen by
/// every client holding another.
#[derive(Clone, Debug, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<SessionToken>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `token`, valid for `ttl` from now.
    pub fn login(&self, token: impl Into<String>, ttl: Duration) {
        self.login_until(token, Utc::now() + ttl);
    }

    pub fn login_until(&self, token: impl Into<String>, expires_at: DateTime<Utc>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(SessionToken {
            token: token.into(),
            expires_at,
        });
    }

    pub fn logout(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    /// Token to send as `Authorization: Bearer`, unless missing or expired.
    pub fn bearer(&self) -> Option<String> {
        self.bearer_at(Utc::now())
    }

    pub fn bearer_at(&self, now: DateTime<Utc>) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|session| session.expires_at > now)
            .map(|session| session.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }
}
