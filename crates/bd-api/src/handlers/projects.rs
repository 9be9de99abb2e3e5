//! Project handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bd_core::traits::Id;
use bd_models::{CreateProjectDto, UpdateProjectDto};

use crate::error::ApiResult;
use crate::extractors::{AppState, CurrentUser};

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.projects.list().await?))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(dto): Json<CreateProjectDto>,
) -> ApiResult<impl IntoResponse> {
    let project = state.services.projects.create(user.id(), dto).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.projects.get(id).await?))
}

/// PATCH /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateProjectDto>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.projects.update(id, dto).await?))
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.services.projects.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
