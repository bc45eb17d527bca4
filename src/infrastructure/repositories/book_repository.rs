//! REST implementation of BookRepository

use async_trait::async_trait;

use crate::domain::{BookRepository, LibraryError};
use crate::infrastructure::RestClient;
use crate::models::{Book, NewBook};

const COLLECTION: &str = "books";

/// `/books`-backed implementation of BookRepository
pub struct RestBookRepository {
    client: RestClient,
}

impl RestBookRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BookRepository for RestBookRepository {
    async fn find_all(&self) -> Result<Vec<Book>, LibraryError> {
        self.client.list(COLLECTION, &[]).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, LibraryError> {
        self.client.get(COLLECTION, id).await
    }

    async fn create(&self, book: NewBook) -> Result<Book, LibraryError> {
        self.client.create(COLLECTION, &book).await
    }

    async fn update(&self, book: &Book) -> Result<Book, LibraryError> {
        self.client.replace(COLLECTION, &book.id, book).await
    }

    async fn delete(&self, id: &str) -> Result<(), LibraryError> {
        self.client.delete(COLLECTION, id).await
    }
}
