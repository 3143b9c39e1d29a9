//! In-memory [`DataSource`] for tests.
//!
//! Serves pre-loaded collections page by page, counts calls per resource, can
//! hold requests open until released, and can fail the next N requests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::{DataSource, PageQuery, Result};
use crate::errors::FetchError;
use crate::models::{Character, Identified, Page, PageMeta, Planet, Resource, Transformation};

#[derive(Default)]
pub struct MockDataSource {
    characters: Vec<Character>,
    planets: Vec<Planet>,
    transformations: Vec<Transformation>,
    calls: HashMap<Resource, AtomicUsize>,
    failures: Mutex<VecDeque<FetchError>>,
    gate: Option<Arc<Semaphore>>,
    requests: Mutex<Vec<(Resource, PageQuery)>>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self {
            calls: Resource::ALL
                .into_iter()
                .map(|r| (r, AtomicUsize::new(0)))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_characters(mut self, characters: Vec<Character>) -> Self {
        self.characters = characters;
        self
    }

    pub fn with_planets(mut self, planets: Vec<Planet>) -> Self {
        self.planets = planets;
        self
    }

    pub fn with_transformations(mut self, transformations: Vec<Transformation>) -> Self {
        self.transformations = transformations;
        self
    }

    /// Every request waits for a permit on the returned semaphore.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    /// The next request (of any kind) fails with `err`.
    pub fn fail_next(&self, err: FetchError) {
        self.failures.lock().push_back(err);
    }

    pub fn calls(&self, resource: Resource) -> usize {
        self.calls
            .get(&resource)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn requested_pages(&self) -> Vec<(Resource, u32)> {
        self.requests
            .lock()
            .iter()
            .map(|(resource, query)| (*resource, query.page))
            .collect()
    }

    /// Most recent page query issued for `resource`.
    pub fn last_query(&self, resource: Resource) -> Option<PageQuery> {
        self.requests
            .lock()
            .iter()
            .rev()
            .find(|(r, _)| *r == resource)
            .map(|(_, query)| query.clone())
    }

    async fn enter(&self, resource: Resource) -> Result<()> {
        if let Some(counter) = self.calls.get(&resource) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        let failure = self.failures.lock().pop_front();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn page<T: Clone>(
        &self,
        resource: Resource,
        items: &[T],
        query: &PageQuery,
    ) -> Result<Page<T>> {
        query.validate()?;
        self.requests.lock().push((resource, query.clone()));
        self.enter(resource).await?;

        let limit = query.limit as usize;
        let start = (query.page as usize - 1) * limit;
        let total_pages = items.len().div_ceil(limit) as u32;
        let slice: Vec<T> = items.iter().skip(start).take(limit).cloned().collect();

        Ok(Page {
            meta: PageMeta {
                total_items: items.len() as u64,
                item_count: slice.len() as u64,
                items_per_page: query.limit,
                total_pages,
                current_page: query.page,
            },
            items: slice,
            links: None,
        })
    }

    async fn one<T: Clone + Identified>(
        &self,
        resource: Resource,
        items: &[T],
        id: i64,
    ) -> Result<T> {
        self.enter(resource).await?;
        items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or(FetchError::NotFound { resource, id })
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn characters(&self, query: &PageQuery) -> Result<Page<Character>> {
        self.page(Resource::Characters, &self.characters, query).await
    }

    async fn planets(&self, query: &PageQuery) -> Result<Page<Planet>> {
        self.page(Resource::Planets, &self.planets, query).await
    }

    async fn transformations(&self, query: &PageQuery) -> Result<Page<Transformation>> {
        self.page(Resource::Transformations, &self.transformations, query)
            .await
    }

    async fn character(&self, id: i64) -> Result<Character> {
        self.one(Resource::Characters, &self.characters, id).await
    }

    async fn planet(&self, id: i64) -> Result<Planet> {
        self.one(Resource::Planets, &self.planets, id).await
    }

    async fn transformation(&self, id: i64) -> Result<Transformation> {
        self.one(Resource::Transformations, &self.transformations, id)
            .await
    }
}
