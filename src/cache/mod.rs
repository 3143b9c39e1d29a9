//! In-memory collection cache.
//!
//! Holds what has been fetched so far for each resource, in arrival order,
//! together with its pagination cursor and fetch status. Collections only grow
//! within a session; [`Collection::reset`] is the one way to shrink them.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::client::Fetchable;
use crate::errors::{ErrorState, FetchError};
use crate::models::{Character, Cursor, Identified, Planet, Resource, Transformation};

/// Fetched items and pagination state for one resource.
#[derive(Debug)]
pub struct Collection<T> {
    items: Vec<T>,
    seen: HashSet<i64>,
    cursor: Option<Cursor>,
    in_flight: bool,
    last_error: Option<FetchError>,
    generation: u64,
    remote_filters: BTreeMap<String, String>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
            in_flight: false,
            last_error: None,
            generation: 0,
            remote_filters: BTreeMap::new(),
        }
    }
}

impl<T: Identified> Collection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// True once the last page has arrived. Never true before the first page.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_some_and(|c| c.is_exhausted())
    }

    /// Page the next load-more should request.
    pub fn next_page(&self) -> u32 {
        self.cursor.map_or(1, |c| c.next_page())
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Server-side filters sent with every page request.
    pub fn remote_filters(&self) -> &BTreeMap<String, String> {
        &self.remote_filters
    }

    /// Takes effect from the next page request; call right after a reset.
    pub fn set_remote_filters(&mut self, filters: BTreeMap<String, String>) {
        self.remote_filters = filters;
    }

    /// Bumped on every reset; completions from an older generation are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Empty the collection and forget its cursor, error, remote filters and
    /// in-flight request.
    pub fn reset(&mut self) {
        self.remote_filters.clear();
        self.items.clear();
        self.seen.clear();
        self.cursor = None;
        self.in_flight = false;
        self.last_error = None;
        self.generation += 1;
    }

    /// Merge a fetched page. Page 1 replaces the collection, later pages
    /// append in arrival order. Ids already present are skipped, keeping the
    /// first occurrence. Returns how many items were added.
    pub fn append_page(&mut self, items: Vec<T>, cursor: Cursor) -> usize {
        if cursor.current_page <= 1 {
            self.items.clear();
            self.seen.clear();
            self.cursor = Some(cursor);
        } else {
            self.cursor = Some(match self.cursor {
                Some(current) if current.current_page > cursor.current_page => Cursor {
                    current_page: current.current_page,
                    total_pages: cursor.total_pages,
                },
                _ => cursor,
            });
        }

        let before = self.items.len();
        for item in items {
            if self.seen.insert(item.id()) {
                self.items.push(item);
            }
        }
        self.last_error = None;
        self.items.len() - before
    }

    pub fn record_error(&mut self, err: FetchError) {
        self.last_error = Some(err);
    }

    pub(crate) fn set_in_flight(&mut self, in_flight: bool) {
        self.in_flight = in_flight;
    }

    pub fn status(&self) -> CollectionStatus {
        CollectionStatus {
            loaded: self.items.len(),
            cursor: self.cursor,
            in_flight: self.in_flight,
            exhausted: self.is_exhausted(),
            last_error: self.last_error().map(ErrorState::from),
            remote_filters: self.remote_filters.clone(),
        }
    }
}

/// Serializable snapshot of a collection's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStatus {
    pub loaded: usize,
    pub cursor: Option<Cursor>,
    pub in_flight: bool,
    pub exhausted: bool,
    pub last_error: Option<ErrorState>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub remote_filters: BTreeMap<String, String>,
}

/// One collection per resource.
#[derive(Debug, Default)]
pub struct CollectionCache {
    pub characters: Collection<Character>,
    pub planets: Collection<Planet>,
    pub transformations: Collection<Transformation>,
}

impl CollectionCache {
    pub fn reset(&mut self, resource: Resource) {
        match resource {
            Resource::Characters => self.characters.reset(),
            Resource::Planets => self.planets.reset(),
            Resource::Transformations => self.transformations.reset(),
        }
    }

    pub fn is_exhausted(&self, resource: Resource) -> bool {
        match resource {
            Resource::Characters => self.characters.is_exhausted(),
            Resource::Planets => self.planets.is_exhausted(),
            Resource::Transformations => self.transformations.is_exhausted(),
        }
    }

    pub fn status(&self, resource: Resource) -> CollectionStatus {
        match resource {
            Resource::Characters => self.characters.status(),
            Resource::Planets => self.planets.status(),
            Resource::Transformations => self.transformations.status(),
        }
    }

    pub fn collection_mut<E: Cached>(&mut self) -> &mut Collection<E> {
        E::collection_mut(self)
    }
}

/// Maps an entity type onto its slot in the cache.
pub trait Cached: Fetchable {
    fn collection_mut(cache: &mut CollectionCache) -> &mut Collection<Self>;
}

impl Cached for Character {
    fn collection_mut(cache: &mut CollectionCache) -> &mut Collection<Self> {
        &mut cache.characters
    }
}

impl Cached for Planet {
    fn collection_mut(cache: &mut CollectionCache) -> &mut Collection<Self> {
        &mut cache.planets
    }
}

impl Cached for Transformation {
    fn collection_mut(cache: &mut CollectionCache) -> &mut Collection<Self> {
        &mut cache.transformations
    }
}
