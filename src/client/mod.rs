//! Fetch client for the Dragon Ball API.
//!
//! This module provides:
//! - [`DataSource`] trait abstracting the remote API, so the session can be
//!   driven by an in-memory source in tests
//! - [`DragonBallClient`] production client issuing one `GET` per request
//! - [`Fetchable`] glue that lets generic code fetch any of the three resources
//!
//! The client never caches and never retries; both are the caller's decision.

#[cfg(test)]
pub mod mock;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::FetchError;
use crate::models::{Character, Identified, Page, Planet, Resource, Transformation};

pub type Result<T> = std::result::Result<T, FetchError>;

/// Page selection plus resource-specific filter params
/// (`name`, `race`, `gender`, `affiliation`, `isDestroyed`, `characterId`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
    pub params: BTreeMap<String, String>,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            params: BTreeMap::new(),
        }
    }

    /// Adds a server-side filter; the API then answers with a bare array.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn with_params(self, params: &BTreeMap<String, String>) -> Self {
        params
            .iter()
            .fold(self, |query, (key, value)| query.with_param(key.as_str(), value))
    }

    /// Rejects `page < 1` and `limit == 0` before anything goes on the wire.
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(FetchError::InvalidRequest(format!(
                "page must be >= 1, got {}",
                self.page
            )));
        }
        if self.limit == 0 {
            return Err(FetchError::InvalidRequest(
                "limit must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        pairs.extend(self.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

/// Source of dataset pages and single entities.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn characters(&self, query: &PageQuery) -> Result<Page<Character>>;
    async fn planets(&self, query: &PageQuery) -> Result<Page<Planet>>;
    async fn transformations(&self, query: &PageQuery) -> Result<Page<Transformation>>;

    async fn character(&self, id: i64) -> Result<Character>;
    async fn planet(&self, id: i64) -> Result<Planet>;
    async fn transformation(&self, id: i64) -> Result<Transformation>;
}

/// Routes generic fetches to the matching [`DataSource`] method.
#[async_trait]
pub trait Fetchable: Identified + Clone + Send + Sync + Sized + 'static {
    const RESOURCE: Resource;

    async fn fetch_page(source: &dyn DataSource, query: &PageQuery) -> Result<Page<Self>>;
    async fn fetch_one(source: &dyn DataSource, id: i64) -> Result<Self>;
}

#[async_trait]
impl Fetchable for Character {
    const RESOURCE: Resource = Resource::Characters;

    async fn fetch_page(source: &dyn DataSource, query: &PageQuery) -> Result<Page<Self>> {
        source.characters(query).await
    }

    async fn fetch_one(source: &dyn DataSource, id: i64) -> Result<Self> {
        source.character(id).await
    }
}

#[async_trait]
impl Fetchable for Planet {
    const RESOURCE: Resource = Resource::Planets;

    async fn fetch_page(source: &dyn DataSource, query: &PageQuery) -> Result<Page<Self>> {
        source.planets(query).await
    }

    async fn fetch_one(source: &dyn DataSource, id: i64) -> Result<Self> {
        source.planet(id).await
    }
}

#[async_trait]
impl Fetchable for Transformation {
    const RESOURCE: Resource = Resource::Transformations;

    async fn fetch_page(source: &dyn DataSource, query: &PageQuery) -> Result<Page<Self>> {
        source.transformations(query).await
    }

    async fn fetch_one(source: &dyn DataSource, id: i64) -> Result<Self> {
        source.transformation(id).await
    }
}

/// HTTP client for the Dragon Ball API.
pub struct DragonBallClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DragonBallClient {
    /// Create a client for `base_url` (e.g. `https://dragonball-api.com/api`)
    /// with a fixed per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                message: format!("failed to build HTTP client: {}", e),
                status: None,
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Fetch one page of a collection.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &PageQuery,
    ) -> Result<Page<T>> {
        query.validate()?;

        let url = format!("{}/{}", self.base_url, resource);
        tracing::debug!(%resource, page = query.page, limit = query.limit, "Fetching page");

        let body = self.get_json(&url, &query.to_pairs()).await?;

        // Filtered queries answer with a bare array instead of a page.
        let page = match body {
            Value::Array(_) => serde_json::from_value::<Vec<T>>(body).map(Page::single),
            other => serde_json::from_value::<Page<T>>(other),
        }
        .map_err(|e| FetchError::Decode(format!("{} page: {}", resource, e)))?;

        tracing::debug!(
            %resource,
            page = page.meta.current_page,
            total_pages = page.meta.total_pages,
            items = page.items.len(),
            "Fetched page"
        );
        Ok(page)
    }

    /// Fetch a single entity by id. A 404 becomes [`FetchError::NotFound`].
    pub async fn fetch_by_id<T: DeserializeOwned>(&self, resource: Resource, id: i64) -> Result<T> {
        let url = format!("{}/{}/{}", self.base_url, resource, id);
        tracing::debug!(%resource, id, "Fetching entity");

        let body = match self.get_json(&url, &[]).await {
            Err(FetchError::Transport {
                status: Some(404), ..
            }) => return Err(FetchError::NotFound { resource, id }),
            other => other?,
        };

        serde_json::from_value(body)
            .map_err(|e| FetchError::Decode(format!("{} {}: {}", resource, id, e)))
    }

    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "API request failed");
            return Err(FetchError::Transport {
                message: format!("{} returned {}", url, status),
                status: Some(status.as_u16()),
            });
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&text).map_err(|e| FetchError::Decode(format!("invalid JSON: {}", e)))
    }

    fn transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            tracing::warn!("API request timed out: {}", err);
            FetchError::Timeout(self.timeout)
        } else {
            tracing::warn!("API request failed: {}", err);
            FetchError::Transport {
                message: err.to_string(),
                status: err.status().map(|s| s.as_u16()),
            }
        }
    }
}

#[async_trait]
impl DataSource for DragonBallClient {
    async fn characters(&self, query: &PageQuery) -> Result<Page<Character>> {
        self.fetch_page(Resource::Characters, query).await
    }

    async fn planets(&self, query: &PageQuery) -> Result<Page<Planet>> {
        self.fetch_page(Resource::Planets, query).await
    }

    async fn transformations(&self, query: &PageQuery) -> Result<Page<Transformation>> {
        self.fetch_page(Resource::Transformations, query).await
    }

    async fn character(&self, id: i64) -> Result<Character> {
        self.fetch_by_id(Resource::Characters, id).await
    }

    async fn planet(&self, id: i64) -> Result<Planet> {
        self.fetch_by_id(Resource::Planets, id).await
    }

    async fn transformation(&self, id: i64) -> Result<Transformation> {
        self.fetch_by_id(Resource::Transformations, id).await
    }
}
