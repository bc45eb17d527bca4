//! Thin HTTP wrapper over the REST data service.
//!
//! Every collection supports the same verbs, so the repositories share this
//! client and only pick the collection name and query parameters.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::domain::LibraryError;

const USER_AGENT: &str = concat!("libris/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LibraryError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LibraryError::Validation(format!("Invalid API URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LibraryError::Validation(format!(
                "API URL '{}' cannot have collection paths",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `GET /{collection}?k=v...`
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, LibraryError> {
        let url = self.endpoint(&[collection]);
        tracing::debug!("GET {} {:?}", url, query);

        let resp = self.http.get(url).query(query).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// `GET /{collection}/{id}`, mapping 404 to `None`
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, LibraryError> {
        let url = self.endpoint(&[collection, id]);
        tracing::debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp).await?;
        Ok(Some(resp.json().await?))
    }

    /// `POST /{collection}`; the service echoes the stored record with its id
    pub async fn create<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<T, LibraryError> {
        let url = self.endpoint(&[collection]);
        tracing::debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// `PUT /{collection}/{id}` with the full record
    pub async fn replace<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<T, LibraryError> {
        let url = self.endpoint(&[collection, id]);
        tracing::debug!("PUT {}", url);

        let resp = self.http.put(url).json(body).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// `DELETE /{collection}/{id}`
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), LibraryError> {
        let url = self.endpoint(&[collection, id]);
        tracing::debug!("DELETE {}", url);

        let resp = self.http.delete(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(LibraryError::NotFound(format!("{} {}", collection, id)));
        }
        check_status(resp).await?;
        Ok(())
    }
}

async fn check_status(resp: Response) -> Result<Response, LibraryError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!("Data service error {} for {}: {}", status, url, body);

    Err(LibraryError::Status {
        status: status.as_u16(),
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let client = RestClient::new("http://localhost:3001/api/", Duration::from_secs(1)).unwrap();

        assert_eq!(
            client.endpoint(&["books", "12"]).as_str(),
            "http://localhost:3001/api/books/12"
        );
    }

    #[test]
    fn endpoint_escapes_ids() {
        let client = RestClient::new("http://localhost:3001", Duration::from_secs(1)).unwrap();

        assert_eq!(
            client.endpoint(&["users", "a/b"]).as_str(),
            "http://localhost:3001/users/a%2Fb"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = RestClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)));

        let err = RestClient::new("mailto:admin@example.com", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)));
    }
}
