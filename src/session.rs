//! Logged-in user context.
//!
//! A `Session` is created once per process (hydrated from the session file by
//! `SessionStore`) and handed to every operation that needs to know who is
//! acting. Logging in and out mutate it; persisting it is the caller's job.

use crate::domain::LibraryError;
use crate::models::User;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn require_user(&self) -> Result<&User, LibraryError> {
        self.user.as_ref().ok_or(LibraryError::NotAuthenticated)
    }

    pub fn require_admin(&self) -> Result<&User, LibraryError> {
        let user = self.require_user()?;
        if !user.is_admin() {
            return Err(LibraryError::Forbidden);
        }
        Ok(user)
    }

    pub fn login(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        self.user = None;
    }
}
