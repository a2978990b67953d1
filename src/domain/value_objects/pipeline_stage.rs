//! Pipeline stage - progress of one creature through the creation workflow

use serde::Serialize;

/// Where a creation run currently stands
///
/// The happy path is linear. `Failed` is only reachable from the stages whose
/// failure is fatal; once sprites are dispatched the run always completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Created,
    DescriptionReady,
    BaseImageReady,
    MovesetsReady,
    SpritesDispatched,
    SpritesPersisted,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid pipeline transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: PipelineStage,
    pub to: PipelineStage,
}

impl PipelineStage {
    /// The next stage on the happy path, if any
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            Self::Created => Some(Self::DescriptionReady),
            Self::DescriptionReady => Some(Self::BaseImageReady),
            Self::BaseImageReady => Some(Self::MovesetsReady),
            Self::MovesetsReady => Some(Self::SpritesDispatched),
            Self::SpritesDispatched => Some(Self::SpritesPersisted),
            Self::SpritesPersisted => Some(Self::Complete),
            Self::Complete | Self::Failed => None,
        }
    }

    /// Whether a failure in this stage aborts the whole run
    pub fn can_fail(&self) -> bool {
        matches!(
            self,
            Self::Created | Self::DescriptionReady | Self::BaseImageReady
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    pub fn advance(self) -> Result<PipelineStage, InvalidTransition> {
        self.next().ok_or(InvalidTransition {
            from: self,
            to: Self::Complete,
        })
    }

    pub fn fail(self) -> Result<PipelineStage, InvalidTransition> {
        if self.can_fail() {
            Ok(Self::Failed)
        } else {
            Err(InvalidTransition {
                from: self,
                to: Self::Failed,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::DescriptionReady => "description_ready",
            Self::BaseImageReady => "base_image_ready",
            Self::MovesetsReady => "movesets_ready",
            Self::SpritesDispatched => "sprites_dispatched",
            Self::SpritesPersisted => "sprites_persisted",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
