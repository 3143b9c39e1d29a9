//! Browsing session.
//!
//! [`BrowseSession`] is the state container behind the local API: loaded
//! collections, filter criteria, and the errors of failed requests. It is
//! built explicitly from a [`DataSource`] and injected into the router; there is
//! no process-wide store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::cache::{CollectionCache, CollectionStatus};
use crate::client::{DataSource, Fetchable};
use crate::config::Config;
use crate::errors::{ErrorState, FetchError};
use crate::models::{
    Character, CharacterSummary, Planet, Resource, Transformation, TransformationRef,
};
use crate::pagination::{LoadOutcome, Paginator, ScrollHint};
use crate::search::{
    derive_view, planet_label, residents, transformation_owner, ActiveFilters, FilterCriteria,
    Residents,
};

/// Tunables of a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub page_limit: u32,
    pub prefetch_threshold: f32,
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            page_limit: config.page_limit,
            prefetch_threshold: config.prefetch_threshold,
        }
    }
}

/// A single-entity request, used to key its error and to retry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailTarget {
    pub resource: Resource,
    pub id: i64,
}

/// What `retry` should re-issue: the pending page of a resource, or a detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryTarget {
    pub resource: Resource,
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDetail {
    pub character: Character,
    pub planet_name: String,
    pub transformations: Vec<TransformationRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetDetail {
    pub planet: Planet,
    pub residents: Residents,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationDetail {
    pub transformation: Transformation,
    pub owner: Option<CharacterSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RetryResult {
    Page(LoadOutcome),
    Character(CharacterDetail),
    Planet(PlanetDetail),
    Transformation(TransformationDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailError {
    #[serde(flatten)]
    pub target: DetailTarget,
    pub error: ErrorState,
}

/// Everything the rendering layer needs to show loading and error state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub characters: CollectionStatus,
    pub planets: CollectionStatus,
    pub transformations: CollectionStatus,
    pub details: Vec<DetailError>,
}

pub struct BrowseSession {
    source: Arc<dyn DataSource>,
    cache: Arc<Mutex<CollectionCache>>,
    paginator: Paginator,
    criteria: RwLock<FilterCriteria>,
    detail_errors: Mutex<HashMap<DetailTarget, FetchError>>,
}

impl BrowseSession {
    pub fn new(source: Arc<dyn DataSource>, options: SessionOptions) -> Self {
        let cache = Arc::new(Mutex::new(CollectionCache::default()));
        let paginator = Paginator::new(
            source.clone(),
            cache.clone(),
            options.page_limit,
            options.prefetch_threshold,
        );

        Self {
            source,
            cache,
            paginator,
            criteria: RwLock::new(FilterCriteria::default()),
            detail_errors: Mutex::new(HashMap::new()),
        }
    }

    // ==================== VIEWS ====================

    /// Loaded characters filtered by the session criteria.
    pub fn characters(&self) -> Vec<Character> {
        let criteria = self.criteria.read().clone();
        self.characters_with(&criteria)
    }

    /// Loaded characters filtered by `criteria`, leaving the session's own
    /// criteria untouched.
    pub fn characters_with(&self, criteria: &FilterCriteria) -> Vec<Character> {
        let cache = self.cache.lock();
        derive_view(cache.characters.items(), criteria)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn planets(&self) -> Vec<Planet> {
        self.cache.lock().planets.items().to_vec()
    }

    pub fn transformations(&self) -> Vec<Transformation> {
        self.cache.lock().transformations.items().to_vec()
    }

    // ==================== CRITERIA ====================

    pub fn criteria(&self) -> FilterCriteria {
        self.criteria.read().clone()
    }

    pub fn set_criteria(&self, criteria: FilterCriteria) {
        *self.criteria.write() = criteria;
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.criteria.write().search_query = query.into();
    }

    pub fn set_selected_planet(&self, planet_id: Option<i64>) {
        self.criteria.write().selected_planet_id = planet_id;
    }

    pub fn set_active_filters(&self, filters: ActiveFilters) {
        self.criteria.write().active_filters = filters;
    }

    pub fn clear_filters(&self) {
        *self.criteria.write() = FilterCriteria::default();
    }

    // ==================== PAGINATION ====================

    pub async fn load_more(&self, resource: Resource, hint: Option<ScrollHint>) -> LoadOutcome {
        match resource {
            Resource::Characters => self.paginator.load_more_near::<Character>(hint).await,
            Resource::Planets => self.paginator.load_more_near::<Planet>(hint).await,
            Resource::Transformations => {
                self.paginator
                    .load_more_near::<Transformation>(hint)
                    .await
            }
        }
    }

    /// Reset `resource` and fetch page 1, with `filters` sent as API query
    /// parameters on every page request until the next reload.
    pub async fn reload(
        &self,
        resource: Resource,
        filters: BTreeMap<String, String>,
    ) -> LoadOutcome {
        match resource {
            Resource::Characters => self.paginator.reload::<Character>(filters).await,
            Resource::Planets => self.paginator.reload::<Planet>(filters).await,
            Resource::Transformations => {
                self.paginator.reload::<Transformation>(filters).await
            }
        }
    }

    pub fn status(&self) -> SessionStatus {
        let [characters, planets, transformations] = {
            let cache = self.cache.lock();
            Resource::ALL.map(|resource| cache.status(resource))
        };

        let mut details: Vec<DetailError> = self
            .detail_errors
            .lock()
            .iter()
            .map(|(target, err)| DetailError {
                target: *target,
                error: ErrorState::from(err),
            })
            .collect();
        details.sort_by_key(|d| (d.target.resource.as_str(), d.target.id));

        SessionStatus {
            characters,
            planets,
            transformations,
            details,
        }
    }

    // ==================== DETAILS ====================

    pub async fn character_detail(&self, id: i64) -> Result<CharacterDetail, FetchError> {
        let character: Character = self.fetch_detail(id).await?;
        let planet_name = planet_label(&character, self.cache.lock().planets.items());
        let transformations = character.transformations.clone().unwrap_or_default();

        Ok(CharacterDetail {
            character,
            planet_name,
            transformations,
        })
    }

    pub async fn planet_detail(&self, id: i64) -> Result<PlanetDetail, FetchError> {
        let planet: Planet = self.fetch_detail(id).await?;
        let residents = residents(id, Some(&planet), self.cache.lock().characters.items());

        Ok(PlanetDetail { planet, residents })
    }

    pub async fn transformation_detail(
        &self,
        id: i64,
    ) -> Result<TransformationDetail, FetchError> {
        let transformation: Transformation = self.fetch_detail(id).await?;
        let owner = transformation_owner(&transformation, self.cache.lock().characters.items());

        Ok(TransformationDetail {
            transformation,
            owner,
        })
    }

    /// Re-issue the request identified by `target` exactly as before.
    pub async fn retry(&self, target: RetryTarget) -> Result<RetryResult, FetchError> {
        tracing::info!(resource = %target.resource, id = ?target.id, "Retrying request");
        match (target.resource, target.id) {
            (resource, None) => Ok(RetryResult::Page(self.load_more(resource, None).await)),
            (Resource::Characters, Some(id)) => {
                self.character_detail(id).await.map(RetryResult::Character)
            }
            (Resource::Planets, Some(id)) => self.planet_detail(id).await.map(RetryResult::Planet),
            (Resource::Transformations, Some(id)) => self
                .transformation_detail(id)
                .await
                .map(RetryResult::Transformation),
        }
    }

    /// Fetch one entity, recording a failure until the same target succeeds.
    async fn fetch_detail<E: Fetchable>(&self, id: i64) -> Result<E, FetchError> {
        let target = DetailTarget {
            resource: E::RESOURCE,
            id,
        };

        match E::fetch_one(self.source.as_ref(), id).await {
            Ok(entity) => {
                self.detail_errors.lock().remove(&target);
                Ok(entity)
            }
            Err(err) => {
                tracing::warn!(resource = %target.resource, id, "Detail fetch failed: {}", err);
                self.detail_errors.lock().insert(target, err.clone());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::client::mock::MockDataSource;
    use serde_json::json;

    fn fixture() -> (Arc<MockDataSource>, BrowseSession) {
        let characters: Vec<Character> = serde_json::from_value(json!([
            {"id": 1, "name": "Goku", "isAlive": true, "maxKi": "90 Septillion",
             "originPlanet": {"id": 1}, "transformations": [{"id": 1, "name": "Goku SSJ"}]},
            {"id": 2, "name": "Vegeta", "isAlive": true, "originPlanet": {"id": 2, "name": "Vegeta"}},
            {"id": 3, "name": "Gohan", "originPlanet": {"id": 1}},
            {"id": 4, "name": "Goten", "isAlive": false}
        ]))
        .unwrap();
        let planets: Vec<Planet> = serde_json::from_value(json!([
            {"id": 1, "name": "Tierra"},
            {"id": 2, "name": "Vegeta", "isDestroyed": true, "characters": [2]}
        ]))
        .unwrap();
        let transformations: Vec<Transformation> = serde_json::from_value(json!([
            {"id": 1, "name": "Goku SSJ", "character": 1},
            {"id": 2, "name": "Vegeta SSJ", "character": {"id": 2, "name": "Vegeta"}}
        ]))
        .unwrap();

        let source = Arc::new(
            MockDataSource::new()
                .with_characters(characters)
                .with_planets(planets)
                .with_transformations(transformations),
        );
        let session = BrowseSession::new(
            source.clone(),
            SessionOptions {
                page_limit: 2,
                prefetch_threshold: 0.5,
            },
        );
        (source, session)
    }

    fn names(characters: &[Character]) -> Vec<&str> {
        characters.iter().map(|c| c.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_view_follows_criteria_and_cache() {
        let (_source, session) = fixture();
        assert!(session.characters().is_empty());

        session.load_more(Resource::Characters, None).await;
        session.set_search_query("go");
        assert_eq!(names(&session.characters()), vec!["Goku"]);

        // New page re-derives the view with the same criteria.
        session.load_more(Resource::Characters, None).await;
        assert_eq!(names(&session.characters()), vec!["Goku", "Gohan", "Goten"]);

        session.set_selected_planet(Some(1));
        assert_eq!(names(&session.characters()), vec!["Goku", "Gohan"]);

        session.set_active_filters(ActiveFilters {
            is_alive: Some(true),
            ..Default::default()
        });
        assert_eq!(names(&session.characters()), vec!["Goku"]);

        session.clear_filters();
        assert!(session.criteria().is_empty());
        assert_eq!(session.characters().len(), 4);
    }

    #[tokio::test]
    async fn test_explicit_criteria_do_not_touch_session() {
        let (_source, session) = fixture();
        session.load_more(Resource::Characters, None).await;
        session.load_more(Resource::Characters, None).await;

        let criteria = FilterCriteria {
            search_query: "vegeta".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&session.characters_with(&criteria)), vec!["Vegeta"]);
        assert!(session.criteria().is_empty());
    }

    #[tokio::test]
    async fn test_detail_views_resolve_references() {
        let (_source, session) = fixture();
        session.load_more(Resource::Characters, None).await;
        session.load_more(Resource::Planets, None).await;

        let goku = session.character_detail(1).await.unwrap();
        assert_eq!(goku.planet_name, "Tierra");
        assert_eq!(goku.transformations.len(), 1);

        let tierra = session.planet_detail(1).await.unwrap();
        let residents: Vec<i64> = tierra.residents.characters.iter().map(|c| c.id).collect();
        assert_eq!(residents, vec![1]);

        let ssj = session.transformation_detail(1).await.unwrap();
        assert_eq!(ssj.owner.unwrap().name.as_deref(), Some("Goku"));
    }

    #[tokio::test]
    async fn test_detail_error_is_kept_until_retry_succeeds() {
        let (source, session) = fixture();

        source.fail_next(FetchError::Timeout(std::time::Duration::from_secs(15)));
        let err = session.planet_detail(2).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));

        let status = session.status();
        assert_eq!(status.details.len(), 1);
        assert_eq!(status.details[0].target.id, 2);
        assert_eq!(status.details[0].error.kind, "timeout");

        let retried = session
            .retry(RetryTarget {
                resource: Resource::Planets,
                id: Some(2),
            })
            .await
            .unwrap();
        match retried {
            RetryResult::Planet(detail) => {
                assert_eq!(detail.planet.name, "Vegeta");
                assert_eq!(
                    detail.residents.source,
                    crate::search::ResidentSource::PlanetList
                );
            }
            other => panic!("unexpected retry result {:?}", other),
        }
        assert!(session.status().details.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_detail() {
        let (_source, session) = fixture();
        let err = session.character_detail(404).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::NotFound {
                resource: Resource::Characters,
                id: 404
            }
        );
    }

    #[tokio::test]
    async fn test_retry_page_after_failure() {
        let (source, session) = fixture();
        source.fail_next(FetchError::Transport {
            message: "status 503".to_string(),
            status: Some(503),
        });

        let failed = session.load_more(Resource::Characters, None).await;
        assert!(matches!(failed, LoadOutcome::Failed { .. }));
        assert!(session.status().characters.last_error.is_some());

        let retried = session
            .retry(RetryTarget {
                resource: Resource::Characters,
                id: None,
            })
            .await
            .unwrap();
        assert!(matches!(
            retried,
            RetryResult::Page(LoadOutcome::Loaded { page: 1, .. })
        ));
        assert!(session.status().characters.last_error.is_none());
    }

    #[tokio::test]
    async fn test_reload_replaces_collection() {
        let (source, session) = fixture();
        session.load_more(Resource::Characters, None).await;
        session.load_more(Resource::Characters, None).await;
        assert_eq!(session.characters().len(), 4);

        let outcome = session.reload(Resource::Characters, BTreeMap::new()).await;
        assert!(matches!(outcome, LoadOutcome::Loaded { page: 1, .. }));
        assert_eq!(session.characters().len(), 2);
        assert_eq!(source.calls(Resource::Characters), 3);
    }

    #[tokio::test]
    async fn test_reload_filters_follow_later_pages() {
        let (source, session) = fixture();
        let filters = BTreeMap::from([("race".to_string(), "Saiyan".to_string())]);

        session.reload(Resource::Characters, filters.clone()).await;
        session.load_more(Resource::Characters, None).await;

        let query = source.last_query(Resource::Characters).unwrap();
        assert_eq!(query.page, 2);
        assert_eq!(query.params, filters);
        assert_eq!(
            session.status().characters.remote_filters,
            filters
        );

        // A plain reload drops them again
        session.reload(Resource::Characters, BTreeMap::new()).await;
        let query = source.last_query(Resource::Characters).unwrap();
        assert_eq!(query.page, 1);
        assert!(query.params.is_empty());
    }
}
