//! Construction request handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bd_core::traits::Id;
use bd_models::{CreateRequestDto, RequestStatus};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, CurrentUser};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub project_id: Option<Id>,
}

/// POST /api/requests
///
/// Answers with the classified request; order creation continues in the background.
pub async fn submit_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(dto): Json<CreateRequestDto>,
) -> ApiResult<impl IntoResponse> {
    let request = state.services.requests.submit(user.id(), dto).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/requests
pub async fn list_requests(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<RequestFilter>,
) -> ApiResult<impl IntoResponse> {
    let requests = &state.services.requests;
    let found = match (filter.status, filter.project_id) {
        (Some(status), _) => requests.list_by_status(status).await?,
        (None, Some(project_id)) => requests.list_by_project(project_id).await?,
        (None, None) => requests.list().await?,
    };
    Ok(Json(found))
}

/// GET /api/requests/:id
pub async fn get_request(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.requests.get(id).await?))
}
