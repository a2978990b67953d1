//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Creature
//! - Value Objects: creation input, generated artifacts, asset layout,
//!   pipeline stages and settings

pub mod entities;
pub mod value_objects;
