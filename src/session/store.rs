use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::storage::{MemoryStorage, SessionStorage, StorageError};
use crate::models::User;
use crate::types::Role;

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-encoded identity
pub const USER_KEY: &str = "user";

/// Opaque bearer token. Never interpreted client-side.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Who the credential was issued to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            name: None,
            email: None,
        }
    }

    /// Label shown by the shell: name, else email, else id
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref().filter(|e| !e.is_empty()))
            .unwrap_or(&self.id)
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            role: user.role,
            name: Some(user.name.clone()).filter(|n| !n.is_empty()),
            email: Some(user.email.clone()).filter(|e| !e.is_empty()),
        }
    }
}

/// Snapshot of the session. Credential and identity are either both set or
/// both absent; the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    credential: Option<Credential>,
    identity: Option<Identity>,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn authenticated(credential: Credential, identity: Identity) -> Self {
        Self {
            credential: Some(credential),
            identity: Some(identity),
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.role().is_some_and(|r| r.is_admin())
    }

    pub fn is_empty(&self) -> bool {
        self.credential.is_none() && self.identity.is_none()
    }
}

/// Single source of truth for "who is logged in". Cloning yields another
/// handle to the same session.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Session>>,
    storage: Arc<dyn SessionStorage>,
    /// Serializes writers so storage ends up matching the last in-memory
    /// change. Readers never take it.
    persist: Arc<Mutex<()>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Rehydrate from durable storage. A half-persisted record (token without
    /// identity or the reverse) is discarded so the store starts empty.
    pub fn init(storage: Arc<dyn SessionStorage>) -> Self {
        let session = match Self::rehydrate(storage.as_ref()) {
            Ok(Some(session)) => {
                tracing::debug!("Rehydrated session from storage");
                session
            }
            Ok(None) => Session::empty(),
            Err(e) => {
                tracing::warn!("Discarding unreadable persisted session: {}", e);
                Self::discard(storage.as_ref());
                Session::empty()
            }
        };

        Self {
            state: Arc::new(RwLock::new(session)),
            storage,
            persist: Arc::new(Mutex::new(())),
        }
    }

    /// Store that forgets everything when the process exits
    pub fn in_memory() -> Self {
        Self::init(Arc::new(MemoryStorage::new()))
    }

    fn rehydrate(storage: &dyn SessionStorage) -> Result<Option<Session>, StorageError> {
        let token = storage.get(TOKEN_KEY)?;
        let user = storage.get(USER_KEY)?;

        match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() => {
                let identity: Identity = serde_json::from_str(&user)?;
                Ok(Some(Session::authenticated(Credential::new(token), identity)))
            }
            (None, None) => Ok(None),
            _ => {
                tracing::warn!("Persisted session is incomplete, clearing it");
                Self::discard(storage);
                Ok(None)
            }
        }
    }

    fn discard(storage: &dyn SessionStorage) {
        if let Err(e) = storage.remove_all(&[TOKEN_KEY, USER_KEY]) {
            tracing::warn!("Failed to remove persisted session: {}", e);
        }
    }

    /// Install a new session after a successful login. The in-memory swap
    /// happens under a short write guard; the credential and identity are
    /// then persisted as one record with no session lock held. If that
    /// write fails the persisted record is removed rather than left mixed
    /// with an older one, and the error is returned.
    pub fn establish(&self, credential: Credential, identity: Identity) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&identity)?;
        let _writer = self.persist.lock();

        let session = Session::authenticated(credential.clone(), identity);
        tracing::info!(
            "Session established for user {} ({})",
            session.identity().map(|i| i.id.as_str()).unwrap_or_default(),
            session.role().map(|r| r.as_str()).unwrap_or_default()
        );
        *self.state.write() = session;

        if let Err(e) = self
            .storage
            .set_all(&[(TOKEN_KEY, credential.as_str()), (USER_KEY, encoded.as_str())])
        {
            Self::discard(self.storage.as_ref());
            return Err(e);
        }
        Ok(())
    }

    /// Drop the session. Clearing an empty session is a no-op. Removal of
    /// every persisted key is attempted even if one fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        let _writer = self.persist.lock();

        let previous = std::mem::take(&mut *self.state.write());
        if !previous.is_empty() {
            tracing::info!("Session cleared");
        }

        self.storage.remove_all(&[TOKEN_KEY, USER_KEY])
    }

    pub fn current(&self) -> Session {
        self.state.read().clone()
    }
}
