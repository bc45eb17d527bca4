//! REST implementation of BorrowingRepository

use async_trait::async_trait;

use crate::domain::{BorrowingFilter, BorrowingRepository, LibraryError};
use crate::infrastructure::RestClient;
use crate::models::{Borrowing, NewBorrowing};

const COLLECTION: &str = "borrowings";

pub struct RestBorrowingRepository {
    client: RestClient,
}

impl RestBorrowingRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BorrowingRepository for RestBorrowingRepository {
    async fn find(&self, filter: BorrowingFilter) -> Result<Vec<Borrowing>, LibraryError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(user_id) = filter.user_id.as_deref() {
            query.push(("userId", user_id));
        }
        if filter.active_only {
            // `returnDate=` matches the empty string
            query.push(("returnDate", ""));
        }

        let borrowings: Vec<Borrowing> = self.client.list(COLLECTION, &query).await?;

        // Some store versions ignore empty filters; keep the contract either way
        Ok(borrowings.into_iter().filter(|b| filter.matches(b)).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Borrowing>, LibraryError> {
        self.client.get(COLLECTION, id).await
    }

    async fn create(&self, borrowing: NewBorrowing) -> Result<Borrowing, LibraryError> {
        self.client.create(COLLECTION, &borrowing).await
    }

    async fn update(&self, borrowing: &Borrowing) -> Result<Borrowing, LibraryError> {
        self.client.replace(COLLECTION, &borrowing.id, borrowing).await
    }
}
