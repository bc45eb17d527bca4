//! Application state containing the repositories every service works against

use std::sync::Arc;

use crate::domain::{BookRepository, BorrowingRepository, LogRepository, UserRepository};
use crate::infrastructure::{
    InMemoryStore, RestBookRepository, RestBorrowingRepository, RestClient, RestLogRepository,
    RestUserRepository,
};

/// Repositories for the four collections of the data service
#[derive(Clone)]
pub struct AppState {
    /// Book repository
    pub book_repo: Arc<dyn BookRepository>,
    /// User repository
    pub user_repo: Arc<dyn UserRepository>,
    /// Borrowing repository
    pub borrowing_repo: Arc<dyn BorrowingRepository>,
    /// Event log repository
    pub log_repo: Arc<dyn LogRepository>,
}

impl AppState {
    /// Create an AppState talking to the REST data service
    pub fn new(client: RestClient) -> Self {
        Self {
            book_repo: Arc::new(RestBookRepository::new(client.clone())),
            user_repo: Arc::new(RestUserRepository::new(client.clone())),
            borrowing_repo: Arc::new(RestBorrowingRepository::new(client.clone())),
            log_repo: Arc::new(RestLogRepository::new(client)),
        }
    }

    /// Create an AppState backed by a single in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            book_repo: store.clone(),
            user_repo: store.clone(),
            borrowing_repo: store.clone(),
            log_repo: store,
        }
    }
}
