//! HTTP client for the remote document store.
//!
//! Endpoints, relative to the configured base URL:
//!
//! ```text
//! GET   /env/{env}/collections/{name}/documents?skip=&limit=&orderBy=createdAt&order=
//!       -> { "data": [ {...}, ... ] }
//! POST  /env/{env}/collections/{name}/documents      { "data": {...} }
//!       -> { "_id": "..." }
//! PATCH /env/{env}/collections/{name}/documents/{id} { "data": {...} }
//! ```
//!
//! The server stamps `createdAt` on insert.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::remote::{DocumentCollection, SortOrder};
use crate::error::SourceError;
use crate::storage::RemoteConfig;

#[derive(Deserialize)]
struct PageResponse {
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "_id")]
    id: String,
}

/// [`DocumentCollection`] over the store's REST API.
pub struct HttpCollection {
    base_url: Url,
    env: String,
    http_client: Client,
}

impl HttpCollection {
    /// Build a client from the remote section of the config.
    ///
    /// # Errors
    /// Returns `SourceError::Unavailable` if the remote is not configured or
    /// the base URL does not parse.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, SourceError> {
        if !config.is_ready() {
            return Err(SourceError::Unavailable("remote store not configured".into()));
        }

        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| SourceError::Unavailable(format!("invalid base URL '{base}': {e}")))?;

        let http_client = Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url,
            env: config.env.trim().to_string(),
            http_client,
        })
    }

    fn documents_url(&self, collection: &str, id: Option<&str>) -> Result<Url, SourceError> {
        let mut path = format!("env/{}/collections/{}/documents", self.env, collection);
        if let Some(id) = id {
            path.push('/');
            path.push_str(id);
        }
        self.base_url
            .join(&path)
            .map_err(|e| SourceError::Unavailable(format!("invalid document URL: {e}")))
    }

    async fn check(resp: Response) -> Result<Response, SourceError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SourceError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DocumentCollection for HttpCollection {
    async fn page(
        &self,
        collection: &str,
        skip: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<Value>, SourceError> {
        let url = self.documents_url(collection, None)?;
        let resp = self
            .http_client
            .get(url)
            .query(&[
                ("skip", skip.to_string()),
                ("limit", limit.to_string()),
                ("orderBy", "createdAt".to_string()),
                ("order", order.as_str().to_string()),
            ])
            .send()
            .await?;

        let page: PageResponse = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| SourceError::decode("page response", e))?;
        Ok(page.data)
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, SourceError> {
        let url = self.documents_url(collection, None)?;
        let resp = self
            .http_client
            .post(url)
            .json(&json!({ "data": data }))
            .send()
            .await?;

        let added: AddResponse = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| SourceError::decode("add response", e))?;
        Ok(added.id)
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), SourceError> {
        let url = self.documents_url(collection, Some(id))?;
        let resp = self
            .http_client
            .patch(url)
            .json(&json!({ "data": data }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
