use serde::{Deserialize, Serialize};

use crate::application::services::{FailureSummary, PipelineResult, SpriteSummary};
use crate::domain::entities::Creature;

/// Request to create a bare creature record
#[derive(Debug, Deserialize)]
pub struct CreateCreatureRequestDto {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureResponseDto {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub asset_directory: Option<String>,
}

impl From<&Creature> for CreatureResponseDto {
    fn from(creature: &Creature) -> Self {
        Self {
            id: creature.id.as_i64(),
            name: creature.name.clone(),
            created_at: creature.created_at.to_rfc3339(),
            asset_directory: creature.asset_directory.clone(),
        }
    }
}

/// Response of the complete creation workflow
#[derive(Debug, Serialize)]
pub struct PipelineResponseDto {
    pub creature: CreatureResponseDto,
    pub stage: String,
    pub sprites: SpriteSummary,
    pub failures: Vec<FailureSummary>,
}

impl From<PipelineResult> for PipelineResponseDto {
    fn from(result: PipelineResult) -> Self {
        Self {
            creature: CreatureResponseDto::from(&result.creature),
            stage: result.stage.as_str().to_string(),
            sprites: result.sprites,
            failures: result.failures,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponseDto {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct FileContentDto {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct RequiredFoldersDto {
    pub folders: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponseDto {
    pub filename: String,
}
