//! Login session and permission checks
//!
//! The only state that survives a restart is the identity of the logged-in
//! user, `{id, name, email, role, avatar}`, written on login and removed on
//! logout. Storage sits behind [`SessionStore`] so the dashboard can keep it
//! in a file and tests can keep it in memory.

use crate::audit::Actor;
use crate::types::{Permission, User, UserRole};
use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Persistence for the cached user identity
pub trait SessionStore: Send {
    /// Load the cached identity; `Ok(None)` when nothing is stored
    fn load(&self) -> Result<Option<User>>;

    /// Cache the identity
    fn save(&mut self, user: &User) -> Result<()>;

    /// Remove the cached identity
    fn clear(&mut self) -> Result<()>;
}

/// JSON file backed session store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store at `path`; parent directories are created on first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<User>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(user)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory session store
///
/// Holds the serialized form so a corrupt record can be simulated.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    raw: Option<String>,
}

impl MemorySessionStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a raw record
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    /// Raw stored record
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<User>> {
        self.raw
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(Error::from)
    }

    fn save(&mut self, user: &User) -> Result<()> {
        self.raw = Some(serde_json::to_string(user)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.raw = None;
        Ok(())
    }
}

/// Authentication state
pub struct AuthSession<S: SessionStore> {
    users: Vec<User>,
    current: Option<User>,
    store: S,
}

impl<S: SessionStore> std::fmt::Debug for AuthSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("users", &self.users.len())
            .field("current", &self.current.as_ref().map(|u| &u.id))
            .finish()
    }
}

impl<S: SessionStore> AuthSession<S> {
    /// Session over a user directory; nobody is logged in yet
    pub fn new(users: Vec<User>, store: S) -> Self {
        Self {
            users,
            current: None,
            store,
        }
    }

    /// Pick up the cached identity, if any
    ///
    /// An unreadable record is removed and ignored.
    pub fn restore(&mut self) -> Option<&User> {
        match self.store.load() {
            Ok(user) => self.current = user,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session record");
                self.current = None;
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "Failed to remove session record");
                }
            }
        }
        self.current.as_ref()
    }

    /// Email/password login
    ///
    /// The email is matched case-insensitively; any non-empty password is
    /// accepted. Returns whether the login succeeded.
    pub fn login(&mut self, email: &str, password: &str) -> bool {
        if password.is_empty() {
            return false;
        }
        let email = email.trim().to_lowercase();
        let Some(user) = self
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == email)
            .cloned()
        else {
            tracing::info!(%email, "Login rejected: unknown email");
            return false;
        };

        self.set_current(user);
        true
    }

    /// Log in as the first user holding `role`
    pub fn login_as_role(&mut self, role: UserRole) -> bool {
        match self.users.iter().find(|u| u.role == role).cloned() {
            Some(user) => {
                self.set_current(user);
                true
            }
            None => false,
        }
    }

    /// Drop the current user and the cached identity
    pub fn logout(&mut self) {
        if let Some(user) = self.current.take() {
            tracing::info!(user_id = %user.id, "User logged out");
        }
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to remove session record");
        }
    }

    /// Logged-in user
    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// True when someone is logged in
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Permission check for the current user; false when logged out
    pub fn check_permission(&self, permission: Permission) -> bool {
        self.current
            .as_ref()
            .is_some_and(|u| u.role.has_permission(permission))
    }

    /// Actor to stamp on audit entries
    pub fn actor(&self) -> Actor {
        self.current.as_ref().map_or_else(Actor::system, Actor::from)
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn set_current(&mut self, user: User) {
        if let Err(e) = self.store.save(&user) {
            tracing::warn!(error = %e, "Failed to persist session record");
        }
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        self.current = Some(user);
    }
}
