//! Metrics and report handlers

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
pub struct ReportQuery {
    pub status: Option<OrderStatus>,
}

/// GET /api/metrics/status
pub async fn status_counts(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.metrics.status_counts().await?))
}

/// GET /api/metrics/types
pub async fn type_stats(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.metrics.type_stats().await?))
}

/// GET /api/metrics/projects/:id/types
pub async fn project_type_stats(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(project_id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.metrics.project_type_stats(project_id).await?))
}

/// GET /api/reports/orders
pub async fn orders_report(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.metrics.orders_report(query.status).await?))
}

/// GET /api/reports/summary
pub async fn construction_summary(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.metrics.construction_summary().await?))
}
