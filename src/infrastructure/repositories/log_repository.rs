//! REST implementation of LogRepository

use async_trait::async_trait;

use crate::domain::{LibraryError, LogRepository};
use crate::infrastructure::RestClient;
use crate::models::{LogEntry, NewLogEntry};

const COLLECTION: &str = "logs";

pub struct RestLogRepository {
    client: RestClient,
}

impl RestLogRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogRepository for RestLogRepository {
    async fn find_all(&self) -> Result<Vec<LogEntry>, LibraryError> {
        self.client.list(COLLECTION, &[]).await
    }

    async fn create(&self, entry: NewLogEntry) -> Result<LogEntry, LibraryError> {
        self.client.create(COLLECTION, &entry).await
    }
}
