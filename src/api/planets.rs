//! Planet API endpoints.

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::models::Planet;
use crate::session::PlanetDetail;
use crate::AppState;

/// GET /api/planets - Loaded planets in arrival order.
pub async fn list_planets(State(state): State<AppState>) -> ApiResult<Vec<Planet>> {
    success(state.session.planets())
}

/// GET /api/planets/{id} - Planet detail with its residents.
pub async fn get_planet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PlanetDetail> {
    success(state.session.planet_detail(id).await?)
}
