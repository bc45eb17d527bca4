//! Repository trait definitions
//!
//! These traits define the contract for data access against the four
//! collections of the data service. Implementations live in the
//! infrastructure layer.

use async_trait::async_trait;

use super::LibraryError;
use crate::models::{Book, Borrowing, LogEntry, NewBook, NewBorrowing, NewLogEntry, NewUser, User};

/// Filter criteria for user lookups. Every set field must match exactly.
#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub email: Option<String>,
    pub card_id: Option<String>,
    pub password: Option<String>,
}

impl UserFilter {
    pub fn by_email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            ..Default::default()
        }
    }

    pub fn by_credentials(card_id: &str, password: &str) -> Self {
        Self {
            card_id: Some(card_id.to_string()),
            password: Some(password.to_string()),
            ..Default::default()
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        self.email.as_ref().is_none_or(|e| *e == user.email)
            && self.card_id.as_ref().is_none_or(|c| *c == user.card_id)
            && self.password.as_ref().is_none_or(|p| *p == user.password)
    }
}

/// Filter criteria for borrowing lookups
#[derive(Debug, Default, Clone)]
pub struct BorrowingFilter {
    pub user_id: Option<String>,
    /// Only borrowings whose `returnDate` is empty
    pub active_only: bool,
}

impl BorrowingFilter {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            active_only: false,
        }
    }

    pub fn active_for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            active_only: true,
        }
    }

    pub fn matches(&self, borrowing: &Borrowing) -> bool {
        self.user_id.as_ref().is_none_or(|u| *u == borrowing.user_id)
            && (!self.active_only || borrowing.is_active())
    }
}

/// Repository trait for the `/books` collection
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books in store order
    async fn find_all(&self) -> Result<Vec<Book>, LibraryError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, LibraryError>;

    /// Create a new book
    async fn create(&self, book: NewBook) -> Result<Book, LibraryError>;

    /// Replace an existing book
    async fn update(&self, book: &Book) -> Result<Book, LibraryError>;

    /// Delete a book by ID
    async fn delete(&self, id: &str) -> Result<(), LibraryError>;
}

/// Repository trait for the `/users` collection
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find(&self, filter: UserFilter) -> Result<Vec<User>, LibraryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, LibraryError>;

    async fn create(&self, user: NewUser) -> Result<User, LibraryError>;

    async fn update(&self, user: &User) -> Result<User, LibraryError>;

    async fn delete(&self, id: &str) -> Result<(), LibraryError>;
}

/// Repository trait for the `/borrowings` collection. Borrowings are closed,
/// never deleted.
#[async_trait]
pub trait BorrowingRepository: Send + Sync {
    async fn find(&self, filter: BorrowingFilter) -> Result<Vec<Borrowing>, LibraryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Borrowing>, LibraryError>;

    async fn create(&self, borrowing: NewBorrowing) -> Result<Borrowing, LibraryError>;

    async fn update(&self, borrowing: &Borrowing) -> Result<Borrowing, LibraryError>;
}

/// Repository trait for the append-only `/logs` collection
#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<LogEntry>, LibraryError>;

    async fn create(&self, entry: NewLogEntry) -> Result<LogEntry, LibraryError>;
}
