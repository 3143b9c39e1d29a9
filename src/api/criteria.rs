//! Filter criteria endpoints.
//!
//! Every mutation answers with the criteria now in effect.

use axum::{extract::State, Json};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::search::{ActiveFilters, FilterCriteria};
use crate::AppState;

/// Request to change the free-text query.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// Request to select (or deselect) an origin planet.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetRequest {
    #[serde(default)]
    pub planet_id: Option<i64>,
}

/// Reject filters that can never match anything.
pub(crate) fn validate_filters(filters: &ActiveFilters) -> Result<(), AppError> {
    if let Some(range) = filters.power_range {
        if range.min > range.max {
            return Err(AppError::Validation(format!(
                "powerRange min ({}) exceeds max ({})",
                range.min, range.max
            )));
        }
    }
    Ok(())
}

pub(crate) fn validate(criteria: &FilterCriteria) -> Result<(), AppError> {
    validate_filters(&criteria.active_filters)
}

/// GET /api/criteria - Current filter criteria.
pub async fn get_criteria(State(state): State<AppState>) -> ApiResult<FilterCriteria> {
    success(state.session.criteria())
}

/// PUT /api/criteria - Replace the whole criteria.
pub async fn replace_criteria(
    State(state): State<AppState>,
    Json(criteria): Json<FilterCriteria>,
) -> ApiResult<FilterCriteria> {
    validate(&criteria)?;
    state.session.set_criteria(criteria);
    success(state.session.criteria())
}

/// PUT /api/criteria/search - Set the search query.
pub async fn set_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<FilterCriteria> {
    state.session.set_search_query(req.query);
    success(state.session.criteria())
}

/// PUT /api/criteria/planet - Select an origin planet, or clear it with `null`.
pub async fn set_planet(
    State(state): State<AppState>,
    Json(req): Json<PlanetRequest>,
) -> ApiResult<FilterCriteria> {
    state.session.set_selected_planet(req.planet_id);
    success(state.session.criteria())
}

/// PUT /api/criteria/filters - Replace the attribute filters.
pub async fn set_filters(
    State(state): State<AppState>,
    Json(filters): Json<ActiveFilters>,
) -> ApiResult<FilterCriteria> {
    validate_filters(&filters)?;
    state.session.set_active_filters(filters);
    success(state.session.criteria())
}

/// DELETE /api/criteria - Reset every criterion.
pub async fn clear_criteria(State(state): State<AppState>) -> ApiResult<FilterCriteria> {
    state.session.clear_filters();
    success(state.session.criteria())
}
