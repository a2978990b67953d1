//! Service errors shared by the creature use cases
//!
//! Every failure a request can run into ends up as a [`CreatureError`]. The
//! HTTP layer only looks at [`CreatureError::kind`] and
//! [`CreatureError::public_message`], so filesystem paths and backend details
//! stay in the logs.

use serde::Serialize;

use crate::application::ports::outbound::{GenerationError, RepositoryError};
use crate::domain::value_objects::{CreatureId, InputError, SpriteJobId};
use crate::infrastructure::asset_manager::AssetError;

/// Coarse classification of a failure, as reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    PathEscape,
    Validation,
    GenerationFailure,
    ShapeMismatch,
    Serialization,
    Storage,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PathEscape => "path_escape",
            Self::Validation => "validation",
            Self::GenerationFailure => "generation_failure",
            Self::ShapeMismatch => "shape_mismatch",
            Self::Serialization => "serialization",
            Self::Storage => "storage",
            Self::Io => "io",
        }
    }
}

impl From<&GenerationError> for ErrorKind {
    fn from(err: &GenerationError) -> Self {
        if err.is_shape_mismatch() {
            Self::ShapeMismatch
        } else {
            Self::GenerationFailure
        }
    }
}

/// Generation stages whose failure can be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Description,
    BaseImage,
    Moveset,
    Expressions,
}

impl GenerationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::BaseImage => "base_image",
            Self::Moveset => "moveset",
            Self::Expressions => "expressions",
        }
    }
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a non-fatal pipeline failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Moveset,
    Expressions,
    SpriteGeneration,
    SpritePersistence,
}

/// A failure the pipeline recovered from, reported alongside the result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureSummary {
    pub job_id: Option<SpriteJobId>,
    pub name: Option<String>,
    pub stage: FailureStage,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreatureError {
    #[error("Creature not found: {0}")]
    CreatureNotFound(CreatureId),
    #[error("Creature {0} has no asset directory")]
    DirectoryNotSet(CreatureId),
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Path escapes the storage root: {0}")]
    PathEscape(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{stage} stage failed: {source}")]
    Generation {
        stage: GenerationStage,
        #[source]
        source: GenerationError,
    },
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl CreatureError {
    pub fn generation(stage: GenerationStage, source: GenerationError) -> Self {
        Self::Generation { stage, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CreatureNotFound(_) | Self::DirectoryNotSet(_) | Self::FileNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::PathEscape(_) => ErrorKind::PathEscape,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Generation { source, .. } => ErrorKind::from(source),
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Message safe to hand to a client
    pub fn public_message(&self) -> String {
        match self {
            Self::CreatureNotFound(_)
            | Self::DirectoryNotSet(_)
            | Self::FileNotFound(_)
            | Self::Validation(_) => self.to_string(),
            Self::PathEscape(_) => "Path escapes the storage root".to_string(),
            Self::Generation { stage, source } => match source {
                GenerationError::Timeout(_) => format!("{} stage timed out", stage),
                GenerationError::ShapeMismatch(_) => {
                    format!("{} stage returned malformed content", stage)
                }
                _ => format!("{} stage failed", stage),
            },
            Self::Serialization(_) => "Failed to serialize artifact".to_string(),
            Self::Storage(_) => "Storage error".to_string(),
            Self::Io(_) => "File system error".to_string(),
        }
    }
}

impl From<AssetError> for CreatureError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::PathEscape(path) => Self::PathEscape(path),
            AssetError::NotFound(what) => Self::FileNotFound(what),
            AssetError::InvalidFileName(name) => {
                Self::Validation(format!("invalid file name '{}'", name))
            }
            AssetError::Serialization(e) => Self::Serialization(e.to_string()),
            AssetError::Io(e) => Self::Io(e.to_string()),
            AssetError::Join(e) => Self::Io(e),
        }
    }
}

impl From<RepositoryError> for CreatureError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::CreatureNotFound(id),
            RepositoryError::Database(e) => Self::Storage(e),
        }
    }
}

impl From<InputError> for CreatureError {
    fn from(err: InputError) -> Self {
        Self::Validation(err.to_string())
    }
}
