//! Pagination coordinator.
//!
//! Decides when the next page of a resource is fetched and merges it into the
//! [`CollectionCache`]. At most one request per resource is in flight; calls
//! made while one is pending, or after the last page, are no-ops. Nothing is
//! retried automatically: a failed page leaves the cursor where it was, so the
//! next call asks for the same page again.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::cache::{Cached, CollectionCache};
use crate::client::{DataSource, PageQuery};
use crate::errors::ErrorState;

/// Result of a load-more request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LoadOutcome {
    /// A page was fetched and merged.
    #[serde(rename_all = "camelCase")]
    Loaded {
        page: u32,
        added: usize,
        exhausted: bool,
    },
    /// Another request for this resource is pending.
    InFlight,
    /// The last page has already been merged.
    Exhausted,
    /// The scroll hint was not close enough to the end of the list.
    NotNearEnd,
    /// The collection was reset while the request was pending; result dropped.
    Stale,
    /// The request failed; the error is kept on the collection.
    Failed { error: ErrorState },
}

/// Position of the rendered list, as reported by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollHint {
    pub last_visible: usize,
    pub rendered: usize,
}

/// True when no more than `threshold` (a fraction of `rendered`) items remain
/// below the last visible one. An empty list is always near its end.
pub fn is_near_end(hint: ScrollHint, threshold: f32) -> bool {
    if hint.rendered == 0 {
        return true;
    }
    let remaining = hint
        .rendered
        .saturating_sub(hint.last_visible.saturating_add(1));
    remaining as f32 <= hint.rendered as f32 * threshold
}

/// Clears the in-flight flag on every exit path, unless the collection was
/// reset in the meantime and a newer request owns the flag.
struct InFlightGuard<'a, E: Cached> {
    cache: &'a Mutex<CollectionCache>,
    generation: u64,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Cached> Drop for InFlightGuard<'_, E> {
    fn drop(&mut self) {
        let mut cache = self.cache.lock();
        let collection = cache.collection_mut::<E>();
        if collection.generation() == self.generation {
            collection.set_in_flight(false);
        }
    }
}

pub struct Paginator {
    source: Arc<dyn DataSource>,
    cache: Arc<Mutex<CollectionCache>>,
    page_limit: u32,
    threshold: f32,
}

impl Paginator {
    pub fn new(
        source: Arc<dyn DataSource>,
        cache: Arc<Mutex<CollectionCache>>,
        page_limit: u32,
        threshold: f32,
    ) -> Self {
        Self {
            source,
            cache,
            page_limit,
            threshold,
        }
    }

    /// Fetch the next page of `E` unless one is already pending or the
    /// collection is exhausted.
    pub async fn maybe_load_more<E: Cached>(&self) -> LoadOutcome {
        let resource = E::RESOURCE;

        let (query, generation) = {
            let mut cache = self.cache.lock();
            let collection = cache.collection_mut::<E>();
            if collection.is_in_flight() {
                tracing::debug!(%resource, "Load more skipped, request in flight");
                return LoadOutcome::InFlight;
            }
            if collection.is_exhausted() {
                tracing::debug!(%resource, "Load more skipped, collection exhausted");
                return LoadOutcome::Exhausted;
            }
            collection.set_in_flight(true);
            let query = PageQuery::new(collection.next_page(), self.page_limit)
                .with_params(collection.remote_filters());
            (query, collection.generation())
        };
        let page = query.page;

        let guard = InFlightGuard::<E> {
            cache: &self.cache,
            generation,
            _entity: PhantomData,
        };

        let result = E::fetch_page(self.source.as_ref(), &query).await;

        let outcome = {
            let mut cache = self.cache.lock();
            let collection = cache.collection_mut::<E>();

            if collection.generation() != generation {
                tracing::debug!(%resource, page, "Discarding page fetched before reset");
                LoadOutcome::Stale
            } else {
                match result {
                    Ok(fetched) => {
                        let cursor = fetched.cursor();
                        let added = collection.append_page(fetched.items, cursor);
                        tracing::info!(
                            %resource,
                            page = cursor.current_page,
                            total_pages = cursor.total_pages,
                            added,
                            "Merged page"
                        );
                        LoadOutcome::Loaded {
                            page: cursor.current_page,
                            added,
                            exhausted: collection.is_exhausted(),
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%resource, page, "Failed to load page: {}", err);
                        let error = ErrorState::from(&err);
                        collection.record_error(err);
                        LoadOutcome::Failed { error }
                    }
                }
            }
        };

        drop(guard);
        outcome
    }

    /// Like [`maybe_load_more`](Self::maybe_load_more), but only when the
    /// hint (if any) says the list is near its end.
    pub async fn load_more_near<E: Cached>(&self, hint: Option<ScrollHint>) -> LoadOutcome {
        if self.cache.lock().is_exhausted(E::RESOURCE) {
            return LoadOutcome::Exhausted;
        }
        if let Some(hint) = hint {
            if !is_near_end(hint, self.threshold) {
                return LoadOutcome::NotNearEnd;
            }
        }
        self.maybe_load_more::<E>().await
    }

    /// Drop everything loaded for `E` and fetch page 1 again, sending
    /// `filters` with this and every later page request.
    pub async fn reload<E: Cached>(&self, filters: BTreeMap<String, String>) -> LoadOutcome {
        tracing::info!(resource = %E::RESOURCE, ?filters, "Collection reset");
        {
            let mut cache = self.cache.lock();
            cache.reset(E::RESOURCE);
            cache.collection_mut::<E>().set_remote_filters(filters);
        }
        self.maybe_load_more::<E>().await
    }
}
