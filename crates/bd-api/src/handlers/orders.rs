//! Construction order handlers (read-only)

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use bd_core::traits::Id;
use bd_models::OrderStatus;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, CurrentUser};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub project_id: Option<Id>,
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<impl IntoResponse> {
    let orders = &state.services.orders;
    let found = match (filter.status, filter.project_id) {
        (Some(status), _) => orders.list_by_status(status).await?,
        (None, Some(project_id)) => orders.list_by_project(project_id).await?,
        (None, None) => orders.list().await?,
    };
    Ok(Json(found))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.orders.get(id).await?))
}
