//! In-memory implementation of every repository trait.
//!
//! Behaves like the REST data service (ids assigned on create, full-record
//! replace, no referential integrity) so workflows can run without a server.
//! It also counts writes and can be told to fail writes on one collection,
//! which is how partial-failure behavior is exercised.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    BookRepository, BorrowingFilter, BorrowingRepository, LibraryError, LogRepository,
    UserFilter, UserRepository,
};
use crate::models::{
    Book, Borrowing, LogEntry, NewBook, NewBorrowing, NewLogEntry, NewUser, User,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Books,
    Users,
    Borrowings,
    Logs,
}

impl Collection {
    fn name(self) -> &'static str {
        match self {
            Collection::Books => "books",
            Collection::Users => "users",
            Collection::Borrowings => "borrowings",
            Collection::Logs => "logs",
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    books: RwLock<Vec<Book>>,
    users: RwLock<Vec<User>>,
    borrowings: RwLock<Vec<Borrowing>>,
    logs: RwLock<Vec<LogEntry>>,
    writes: AtomicUsize,
    failing: Mutex<HashSet<Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, bypassing write counting. Meant for seeding.
    pub async fn seed_book(&self, book: Book) {
        self.books.write().await.push(book);
    }

    pub async fn seed_user(&self, user: User) {
        self.users.write().await.push(user);
    }

    pub async fn seed_borrowing(&self, borrowing: Borrowing) {
        self.borrowings.write().await.push(borrowing);
    }

    /// Number of mutating calls that reached the store
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every following write to `collection` fail with a 500
    pub fn fail_writes_to(&self, collection: Collection) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(collection);
        }
    }

    pub fn heal(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
    }

    pub async fn books(&self) -> Vec<Book> {
        self.books.read().await.clone()
    }

    pub async fn users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    pub async fn borrowings(&self) -> Vec<Borrowing> {
        self.borrowings.read().await.clone()
    }

    pub async fn logs(&self) -> Vec<LogEntry> {
        self.logs.read().await.clone()
    }

    fn begin_write(&self, collection: Collection) -> Result<(), LibraryError> {
        let failing = self
            .failing
            .lock()
            .map(|f| f.contains(&collection))
            .unwrap_or(false);
        if failing {
            return Err(LibraryError::Status {
                status: 500,
                url: format!("memory://{}", collection.name()),
            });
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn next_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn not_found(collection: Collection, id: &str) -> LibraryError {
    LibraryError::NotFound(format!("{} {}", collection.name(), id))
}

#[async_trait]
impl BookRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Book>, LibraryError> {
        Ok(self.books.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, LibraryError> {
        Ok(self.books.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn create(&self, book: NewBook) -> Result<Book, LibraryError> {
        self.begin_write(Collection::Books)?;
        let stored = Book {
            id: next_id(),
            title: book.title,
            author: book.author,
            description: book.description,
            year: book.year,
            copies: book.copies,
            borrowed_by: book.borrowed_by,
        };
        self.books.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, book: &Book) -> Result<Book, LibraryError> {
        self.begin_write(Collection::Books)?;
        let mut books = self.books.write().await;
        let slot = books
            .iter_mut()
            .find(|b| b.id == book.id)
            .ok_or_else(|| not_found(Collection::Books, &book.id))?;
        *slot = book.clone();
        Ok(book.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), LibraryError> {
        self.begin_write(Collection::Books)?;
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|b| b.id != id);
        if books.len() == before {
            return Err(not_found(Collection::Books, id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find(&self, filter: UserFilter) -> Result<Vec<User>, LibraryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, LibraryError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, LibraryError> {
        self.begin_write(Collection::Users)?;
        let stored = User {
            id: next_id(),
            name: user.name,
            surname: user.surname,
            email: user.email,
            card_id: user.card_id,
            password: user.password,
            role: user.role,
            borrowed_books: user.borrowed_books,
        };
        self.users.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: &User) -> Result<User, LibraryError> {
        self.begin_write(Collection::Users)?;
        let mut users = self.users.write().await;
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| not_found(Collection::Users, &user.id))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), LibraryError> {
        self.begin_write(Collection::Users)?;
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(not_found(Collection::Users, id));
        }
        Ok(())
    }
}

#[async_trait]
impl BorrowingRepository for InMemoryStore {
    async fn find(&self, filter: BorrowingFilter) -> Result<Vec<Borrowing>, LibraryError> {
        Ok(self
            .borrowings
            .read()
            .await
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Borrowing>, LibraryError> {
        Ok(self
            .borrowings
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn create(&self, borrowing: NewBorrowing) -> Result<Borrowing, LibraryError> {
        self.begin_write(Collection::Borrowings)?;
        let stored = Borrowing {
            id: next_id(),
            user_id: borrowing.user_id,
            book_id: borrowing.book_id,
            borrow_date: borrowing.borrow_date,
            expected_return_date: borrowing.expected_return_date,
            return_date: borrowing.return_date,
        };
        self.borrowings.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, borrowing: &Borrowing) -> Result<Borrowing, LibraryError> {
        self.begin_write(Collection::Borrowings)?;
        let mut borrowings = self.borrowings.write().await;
        let slot = borrowings
            .iter_mut()
            .find(|b| b.id == borrowing.id)
            .ok_or_else(|| not_found(Collection::Borrowings, &borrowing.id))?;
        *slot = borrowing.clone();
        Ok(borrowing.clone())
    }
}

#[async_trait]
impl LogRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<LogEntry>, LibraryError> {
        Ok(self.logs.read().await.clone())
    }

    async fn create(&self, entry: NewLogEntry) -> Result<LogEntry, LibraryError> {
        self.begin_write(Collection::Logs)?;
        let stored = LogEntry {
            id: next_id(),
            date: entry.date,
            user_id: entry.user_id,
            action: entry.action,
            details: entry.details,
        };
        self.logs.write().await.push(stored.clone());
        Ok(stored)
    }
}
