//! Notification feed handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bd_core::traits::Id;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, CurrentUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedQuery {
    pub user_id: Id,
}

/// GET /api/notifications
pub async fn list_global(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.notifications.list_global().await))
}

/// DELETE /api/notifications
pub async fn clear_global(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    state.notifications.clear_global().await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/notifications/by-user?userId=
pub async fn list_for_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<UserFeedQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.notifications.list_for_user(query.user_id).await))
}

/// DELETE /api/notifications/by-user?userId=
pub async fn clear_for_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<UserFeedQuery>,
) -> ApiResult<impl IntoResponse> {
    state.notifications.clear_for_user(query.user_id).await;
    Ok(StatusCode::NO_CONTENT)
}
