//! Pagination, status and retry endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::Resource;
use crate::pagination::{LoadOutcome, ScrollHint};
use crate::session::{RetryResult, RetryTarget, SessionStatus};
use crate::AppState;

/// Optional scroll position for load-more.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadMoreParams {
    pub last_visible: Option<usize>,
    pub rendered: Option<usize>,
}

impl LoadMoreParams {
    fn hint(&self) -> Result<Option<ScrollHint>, AppError> {
        match (self.last_visible, self.rendered) {
            (None, None) => Ok(None),
            (Some(last_visible), Some(rendered)) => Ok(Some(ScrollHint {
                last_visible,
                rendered,
            })),
            _ => Err(AppError::Validation(
                "lastVisible and rendered must be given together".into(),
            )),
        }
    }
}

/// Reject query parameters the API does not filter `resource` by.
fn validate_remote_filters(
    resource: Resource,
    filters: &BTreeMap<String, String>,
) -> Result<(), AppError> {
    let allowed = resource.filter_params();
    match filters.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(AppError::Validation(format!(
            "{} cannot be filtered by '{}' (allowed: {})",
            resource,
            key,
            allowed.join(", ")
        ))),
        None => Ok(()),
    }
}

/// POST /api/pages/{resource}/more - Fetch the next page if one is due.
///
/// Answers with the outcome even when the fetch failed; the error is also kept
/// on the collection status.
pub async fn load_more(
    State(state): State<AppState>,
    Path(resource): Path<Resource>,
    Query(params): Query<LoadMoreParams>,
) -> ApiResult<LoadOutcome> {
    let hint = params.hint()?;
    success(state.session.load_more(resource, hint).await)
}

/// POST /api/pages/{resource}/reload - Drop the collection and fetch page 1.
///
/// Query parameters (e.g. `?isDestroyed=true` for planets) are passed to the
/// API with every page request of the reloaded collection.
pub async fn reload(
    State(state): State<AppState>,
    Path(resource): Path<Resource>,
    Query(filters): Query<BTreeMap<String, String>>,
) -> ApiResult<LoadOutcome> {
    validate_remote_filters(resource, &filters)?;
    success(state.session.reload(resource, filters).await)
}

/// GET /api/status - Pagination and error state of every collection.
pub async fn get_status(State(state): State<AppState>) -> ApiResult<SessionStatus> {
    success(state.session.status())
}

/// POST /api/retry - Re-issue a failed page or detail request.
pub async fn retry(
    State(state): State<AppState>,
    Json(target): Json<RetryTarget>,
) -> ApiResult<RetryResult> {
    success(state.session.retry(target).await?)
}
