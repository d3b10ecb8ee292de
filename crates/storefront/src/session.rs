//! Authenticated session state and its persistence.
//!
//! A [`Session`] is an immutable value: it is either anonymous or holds the
//! token and username from a successful login. The storefront context owns
//! the current session and replaces it only on login and logout; everything
//! else reads it.
//!
//! Sessions outlive the process through a [`SessionStore`]. The file store
//! keeps a small JSON document:
//!
//! ```json
//! { "token": "eyJhbGciOi...", "username": "crio.do" }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing the persisted session.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stored session is not valid JSON.
    #[error("corrupt session data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The authenticated identity for the current user, if any.
#[derive(Debug, Clone, Default)]
pub struct Session {
    auth: Option<Credentials>,
}

#[derive(Debug, Clone)]
struct Credentials {
    token: SecretString,
    username: String,
}

impl Session {
    /// A session with nobody logged in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { auth: None }
    }

    /// A logged-in session.
    #[must_use]
    pub fn authenticated(token: SecretString, username: impl Into<String>) -> Self {
        Self {
            auth: Some(Credentials {
                token,
                username: username.into(),
            }),
        }
    }

    /// Bearer token for authenticated endpoints.
    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.auth.as_ref().map(|auth| &auth.token)
    }

    /// Name of the logged-in user.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.auth.as_ref().map(|auth| auth.username.as_str())
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }
}

/// Persistence for the session between runs.
pub trait SessionStore: Send + Sync {
    /// Read the stored session. A missing or incomplete record is an
    /// anonymous session, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read.
    fn load(&self) -> Result<Session, SessionStoreError>;

    /// Persist `session`. Anonymous sessions are persisted as a clear.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Remove everything the store holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// On-disk / in-memory record format.
#[derive(Clone, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    token: String,
    #[serde(default)]
    username: String,
}

impl StoredSession {
    fn from_session(session: &Session) -> Option<Self> {
        session.auth.as_ref().map(|auth| Self {
            token: auth.token.expose_secret().to_string(),
            username: auth.username.clone(),
        })
    }

    /// An empty token or username means nobody is logged in.
    fn into_session(self) -> Session {
        if self.token.is_empty() || self.username.is_empty() {
            return Session::anonymous();
        }
        Session::authenticated(SecretString::from(self.token), self.username)
    }
}

/// Session store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store at `path`. Nothing is touched until the first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, SessionStoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Session::anonymous()),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSession = serde_json::from_str(&data)?;
        Ok(stored.into_session())
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let Some(stored) = StoredSession::from_session(session) else {
            return self.clear();
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&stored)?)?;
        restrict_permissions(&self.path)?;

        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The file holds a bearer token; keep it private to the owner.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Session store that lives only as long as the process.
#[derive(Default)]
pub struct MemorySessionStore {
    stored: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session, SessionStoreError> {
        let stored = self.stored.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(stored
            .clone()
            .map_or_else(Session::anonymous, StoredSession::into_session))
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) =
            StoredSession::from_session(session);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
