//! Character API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::models::Character;
use crate::search::FilterCriteria;
use crate::session::CharacterDetail;
use crate::AppState;

/// GET /api/characters - Loaded characters filtered by the session criteria.
pub async fn list_characters(State(state): State<AppState>) -> ApiResult<Vec<Character>> {
    success(state.session.characters())
}

/// POST /api/characters/view - Loaded characters filtered by the given criteria.
pub async fn view_characters(
    State(state): State<AppState>,
    Json(criteria): Json<FilterCriteria>,
) -> ApiResult<Vec<Character>> {
    super::criteria::validate(&criteria)?;
    success(state.session.characters_with(&criteria))
}

/// GET /api/characters/{id} - Character detail with its planet label.
pub async fn get_character(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<CharacterDetail> {
    success(state.session.character_detail(id).await?)
}
