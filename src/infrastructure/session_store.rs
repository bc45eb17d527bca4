//! Session persistence.
//!
//! The logged-in user record is cached as JSON in a single file so that the
//! next invocation starts authenticated. Removing the file logs out.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::LibraryError;
use crate::models::User;
use crate::session::Session;

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached session. A missing file is an anonymous session; an
    /// unreadable one is discarded with a warning.
    pub fn hydrate(&self) -> Result<Session, LibraryError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Session::anonymous()),
            Err(e) => return Err(session_error(&self.path, e)),
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => {
                tracing::debug!("Restored session for card {}", user.card_id);
                Ok(Session::for_user(user))
            }
            Err(e) => {
                tracing::warn!("Ignoring corrupt session file {:?}: {}", self.path, e);
                Ok(Session::anonymous())
            }
        }
    }

    /// Write the session to disk, or remove the file when nobody is logged in.
    pub fn persist(&self, session: &Session) -> Result<(), LibraryError> {
        let Some(user) = session.user() else {
            return self.clear();
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| session_error(parent, e))?;
        }
        let json = serde_json::to_string_pretty(user)?;
        std::fs::write(&self.path, json).map_err(|e| session_error(&self.path, e))
    }

    pub fn clear(&self) -> Result<(), LibraryError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(session_error(&self.path, e)),
        }
    }
}

fn session_error(path: &Path, e: std::io::Error) -> LibraryError {
    LibraryError::Session(format!("{}: {}", path.display(), e))
}
