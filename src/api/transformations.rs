//! Transformation API endpoints.

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::models::Transformation;
use crate::session::TransformationDetail;
use crate::AppState;

/// GET /api/transformations - Loaded transformations in arrival order.
pub async fn list_transformations(State(state): State<AppState>) -> ApiResult<Vec<Transformation>> {
    success(state.session.transformations())
}

/// GET /api/transformations/{id} - Transformation detail with its owner.
pub async fn get_transformation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<TransformationDetail> {
    success(state.session.transformation_detail(id).await?)
}
