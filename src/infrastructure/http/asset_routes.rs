//! Asset tree API routes

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{api_error, bad_request, parse_creature_id, ApiError};
use crate::application::dto::{FileContentDto, RequiredFoldersDto, UploadResponseDto};
use crate::application::services::{CreatureError, DirectoryInfo};
use crate::domain::value_objects::{AssetFolder, CreationInput};
use crate::infrastructure::state::AppState;

fn parse_folder(folder: &str) -> Result<AssetFolder, ApiError> {
    folder
        .parse::<AssetFolder>()
        .map_err(|e: String| api_error(CreatureError::Validation(e)))
}

pub async fn get_directory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DirectoryInfo>, ApiError> {
    let creature_id = parse_creature_id(&id)?;
    let info = state
        .directory_service
        .get_directory(creature_id)
        .await
        .map_err(api_error)?;

    Ok(Json(info))
}

/// Create the creature's asset directory and store its path
pub async fn set_directory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DirectoryInfo>, ApiError> {
    let creature_id = parse_creature_id(&id)?;
    let info = state
        .directory_service
        .set_directory(creature_id)
        .await
        .map_err(api_error)?;

    Ok(Json(info))
}

pub async fn add_required_folders(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RequiredFoldersDto>, ApiError> {
    let creature_id = parse_creature_id(&id)?;
    let folders = state
        .directory_service
        .add_required_folders(creature_id)
        .await
        .map_err(api_error)?;

    Ok(Json(RequiredFoldersDto { folders }))
}

/// Store the creature's base data as `data/data_user.json`
pub async fn write_base_data(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(raw): Json<Value>,
) -> Result<(StatusCode, Json<CreationInput>), ApiError> {
    let creature_id = parse_creature_id(&id)?;
    let input = state
        .directory_service
        .store_base_data(creature_id, raw)
        .await
        .map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(input)))
}

pub async fn read_file(
    State(state): State<Arc<AppState>>,
    Path((id, folder, filename)): Path<(String, String, String)>,
) -> Result<Json<FileContentDto>, ApiError> {
    let creature_id = parse_creature_id(&id)?;
    let folder = parse_folder(&folder)?;
    let content = state
        .directory_service
        .read_file(creature_id, folder, &filename)
        .await
        .map_err(api_error)?;

    Ok(Json(FileContentDto { content }))
}

pub async fn list_images(
    State(state): State<Arc<AppState>>,
    Path((id, folder)): Path<(String, String)>,
) -> Result<Json<Vec<String>>, ApiError> {
    let creature_id = parse_creature_id(&id)?;
    let folder = parse_folder(&folder)?;
    let images = state
        .directory_service
        .list_images(creature_id, folder)
        .await
        .map_err(api_error)?;

    Ok(Json(images))
}

/// Upload a PNG into `base/` or `animations/`
///
/// The first multipart field carrying a file name is stored; other fields
/// are ignored.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Path((id, folder)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponseDto>), ApiError> {
    let creature_id = parse_creature_id(&id)?;
    let folder = parse_folder(&folder)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Invalid multipart body: {}", e)))?;

        let filename = state
            .directory_service
            .upload_image(creature_id, folder, &filename, bytes.to_vec())
            .await
            .map_err(api_error)?;
        return Ok((StatusCode::CREATED, Json(UploadResponseDto { filename })));
    }

    Err(api_error(CreatureError::Validation(
        "no file field in upload".to_string(),
    )))
}
