//! Repository ports - Interfaces for data persistence
//!
//! These traits define the contracts that infrastructure repositories must implement.
//! Application services depend on these traits, not concrete implementations.

use async_trait::async_trait;

use crate::domain::entities::Creature;
use crate::domain::value_objects::CreatureId;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Creature not found: {0}")]
    NotFound(CreatureId),
}

/// Repository port for Creature records
///
/// Implementations must not hold a connection between calls; each method
/// borrows one for the duration of its own statement.
#[async_trait]
pub trait CreatureRepositoryPort: Send + Sync {
    /// Insert a new creature, assigning its id and creation time
    async fn create(&self, name: &str) -> Result<Creature, RepositoryError>;

    /// Get a creature by ID
    async fn get(&self, id: CreatureId) -> Result<Option<Creature>, RepositoryError>;

    /// List all creatures, oldest first
    async fn list(&self) -> Result<Vec<Creature>, RepositoryError>;

    /// Replace the stored record; fails with `NotFound` if the row is gone
    async fn update(&self, creature: &Creature) -> Result<(), RepositoryError>;

    /// Delete a creature row; fails with `NotFound` if it does not exist
    async fn delete(&self, id: CreatureId) -> Result<(), RepositoryError>;
}
