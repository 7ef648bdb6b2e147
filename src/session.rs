//! Session resolution.
//!
//! The auth backend is an external collaborator. The gate only talks to it
//! through [`SessionProvider`], which is handed to the gate explicitly.

use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SessionError;

/// Opaque user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    /// The identifier as received from the auth backend.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated principal for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Who the session belongs to.
    pub user_id: UserId,
    /// The role string exactly as the auth backend stored it.
    pub role: Option<String>,
    /// Set by the auth backend from expiry and signature checks.
    pub valid: bool,
}

impl Session {
    /// A valid session.
    pub fn new(user_id: impl Into<String>, role: Option<&str>) -> Self {
        Session {
            user_id: UserId::new(user_id),
            role: role.map(str::to_string),
            valid: true,
        }
    }

    /// A session the backend recognized but rejected.
    pub fn invalid(user_id: impl Into<String>, role: Option<&str>) -> Self {
        Session {
            valid: false,
            ..Session::new(user_id, role)
        }
    }

    /// Returns `true` if the session can authenticate a request.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Whatever the request carried that might identify a session.
///
/// The token never appears in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    token: Option<String>,
}

impl Credentials {
    /// No credentials at all.
    pub fn none() -> Self {
        Credentials { token: None }
    }

    /// A session token from a header or cookie.
    pub fn token(token: impl Into<String>) -> Self {
        Credentials {
            token: Some(token.into()),
        }
    }

    /// The session token, if any.
    pub fn session_token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolves the session behind a request's credentials.
///
/// Implementations validate signatures and expiry themselves. `Ok(None)`
/// means "no session"; `Err` means the lookup itself broke.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Look up the session for these credentials.
    async fn resolve_session(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Session>, SessionError>;
}

#[async_trait]
impl<P: SessionProvider + ?Sized> SessionProvider for std::sync::Arc<P> {
    async fn resolve_session(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Session>, SessionError> {
        (**self).resolve_session(credentials).await
    }
}

#[derive(Debug, Clone)]
struct StoredSession {
    user_id: UserId,
    role: Option<String>,
    expires_at: Option<SystemTime>,
}

/// An in-process token store.
///
/// Sessions past their expiry resolve as invalid rather than missing, the
/// same way a signed-token backend reports an expired token.
#[derive(Debug, Default)]
pub struct MemorySessionProvider {
    sessions: RwLock<HashMap<String, StoredSession>>,
}

impl MemorySessionProvider {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under `token`, replacing any previous one.
    pub async fn insert(
        &self,
        token: impl Into<String>,
        user_id: impl Into<String>,
        role: Option<&str>,
        expires_at: Option<SystemTime>,
    ) {
        let stored = StoredSession {
            user_id: UserId::new(user_id),
            role: role.map(str::to_string),
            expires_at,
        };
        self.sessions.write().await.insert(token.into(), stored);
    }

    /// Forget the session under `token`. Returns `true` if one existed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no sessions are stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionProvider for MemorySessionProvider {
    async fn resolve_session(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Session>, SessionError> {
        let Some(token) = credentials.session_token() else {
            return Ok(None);
        };
        if token.is_empty() {
            return Err(SessionError::MalformedCredential("empty session token".into()));
        }

        let sessions = self.sessions.read().await;
        let Some(stored) = sessions.get(token) else {
            return Ok(None);
        };

        let valid = stored
            .expires_at
            .map_or(true, |expires_at| SystemTime::now() < expires_at);

        Ok(Some(Session {
            user_id: stored.user_id.clone(),
            role: stored.role.clone(),
            valid,
        }))
    }
}
