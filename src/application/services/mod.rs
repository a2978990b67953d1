//! Application services - Use case implementations
//!
//! This module contains the application services for the Monsterdex engine.
//! Services depend on the outbound ports, not on concrete adapters, and
//! return domain entities or [`CreatureError`].

pub mod creation_pipeline;
pub mod creature_service;
pub mod directory_service;
pub mod errors;
pub mod generation_guard;
pub mod generation_stages;
pub mod prompts;
pub mod shapes;
pub mod sprite_orchestrator;

#[cfg(test)]
pub(crate) mod test_support;

pub use creation_pipeline::{CreationPipeline, PipelineResult, SpriteSummary};
pub use creature_service::{CreatureService, CreatureServiceImpl};
pub use directory_service::{CreatureDirectoryService, DirectoryInfo};
pub use errors::{CreatureError, ErrorKind, FailureSummary};
