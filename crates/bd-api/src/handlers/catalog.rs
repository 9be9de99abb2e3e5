//! Material and construction type handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bd_core::traits::Id;
use bd_models::{
    CreateConstructionTypeDto, CreateMaterialDto, RestockDto, UpdateConstructionTypeDto,
    UpdateMaterialDto,
};

use crate::error::ApiResult;
use crate::extractors::{AppState, CurrentUser};

/// GET /api/materials
pub async fn list_materials(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.materials.list().await?))
}

/// POST /api/materials
pub async fn create_material(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(dto): Json<CreateMaterialDto>,
) -> ApiResult<impl IntoResponse> {
    let material = state.services.materials.create(dto).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

/// GET /api/materials/:id
pub async fn get_material(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.materials.get(id).await?))
}

/// PATCH /api/materials/:id
pub async fn update_material(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateMaterialDto>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.materials.update(id, dto).await?))
}

/// POST /api/materials/:id/restock
pub async fn restock_material(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Id>,
    Json(dto): Json<RestockDto>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.materials.restock(id, dto).await?))
}

/// GET /api/construction-types
pub async fn list_construction_types(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.construction_types.list().await?))
}

/// POST /api/construction-types
pub async fn create_construction_type(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(dto): Json<CreateConstructionTypeDto>,
) -> ApiResult<impl IntoResponse> {
    let construction_type = state.services.construction_types.create(dto).await?;
    Ok((StatusCode::CREATED, Json(construction_type)))
}

/// GET /api/construction-types/:id
pub async fn get_construction_type(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.construction_types.get(id).await?))
}

/// PATCH /api/construction-types/:id
pub async fn update_construction_type(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateConstructionTypeDto>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.construction_types.update(id, dto).await?))
}
