//! REST implementation of UserRepository

use async_trait::async_trait;

use crate::domain::{LibraryError, UserFilter, UserRepository};
use crate::infrastructure::RestClient;
use crate::models::{NewUser, User};

const COLLECTION: &str = "users";

pub struct RestUserRepository {
    client: RestClient,
}

impl RestUserRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserRepository for RestUserRepository {
    async fn find(&self, filter: UserFilter) -> Result<Vec<User>, LibraryError> {
        // Matching happens server-side through query parameters
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(email) = filter.email.as_deref() {
            query.push(("email", email));
        }
        if let Some(card_id) = filter.card_id.as_deref() {
            query.push(("cardId", card_id));
        }
        if let Some(password) = filter.password.as_deref() {
            query.push(("password", password));
        }

        let users: Vec<User> = self.client.list(COLLECTION, &query).await?;

        // Credentials are matched here too, not only by the service
        Ok(users.into_iter().filter(|u| filter.matches(u)).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, LibraryError> {
        self.client.get(COLLECTION, id).await
    }

    async fn create(&self, user: NewUser) -> Result<User, LibraryError> {
        self.client.create(COLLECTION, &user).await
    }

    async fn update(&self, user: &User) -> Result<User, LibraryError> {
        self.client.replace(COLLECTION, &user.id, user).await
    }

    async fn delete(&self, id: &str) -> Result<(), LibraryError> {
        self.client.delete(COLLECTION, id).await
    }
}
