//! Creature API routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{api_error, parse_creature_id, ApiError};
use crate::application::dto::{
    CreateCreatureRequestDto, CreatureResponseDto, DeleteResponseDto, PipelineResponseDto,
};
use crate::application::services::CreatureService;
use crate::infrastructure::state::AppState;

/// List all creatures
pub async fn list_creatures(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CreatureResponseDto>>, ApiError> {
    let creatures = state
        .creature_service
        .list_creatures()
        .await
        .map_err(api_error)?;

    Ok(Json(creatures.iter().map(CreatureResponseDto::from).collect()))
}

/// Create a bare creature record
pub async fn create_creature(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCreatureRequestDto>,
) -> Result<(StatusCode, Json<CreatureResponseDto>), ApiError> {
    let creature = state
        .creature_service
        .create_creature(&req.name)
        .await
        .map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(CreatureResponseDto::from(&creature))))
}

/// Run the full creation workflow
///
/// The body is taken as raw JSON so that legacy field spellings can be
/// normalized before validation.
pub async fn create_complete(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<Value>,
) -> Result<Json<PipelineResponseDto>, ApiError> {
    let result = state
        .pipeline
        .create_complete(raw)
        .await
        .map_err(api_error)?;

    Ok(Json(PipelineResponseDto::from(result)))
}

pub async fn get_creature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CreatureResponseDto>, ApiError> {
    let creature_id = parse_creature_id(&id)?;
    let creature = state
        .creature_service
        .get_creature(creature_id)
        .await
        .map_err(api_error)?;

    Ok(Json(CreatureResponseDto::from(&creature)))
}

/// Delete a creature and its asset tree
pub async fn delete_creature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponseDto>, ApiError> {
    let creature_id = parse_creature_id(&id)?;
    state
        .creature_service
        .delete_creature(creature_id)
        .await
        .map_err(api_error)?;

    Ok(Json(DeleteResponseDto { ok: true }))
}
