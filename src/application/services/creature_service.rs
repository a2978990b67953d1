//! Creature Service - Application service for creature records
//!
//! Plain record management: create, fetch, list and delete. Deleting a
//! creature removes its asset tree before the row.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::errors::CreatureError;
use crate::application::ports::outbound::CreatureRepositoryPort;
use crate::domain::entities::Creature;
use crate::domain::value_objects::{fits_folder_name, CreatureId, MAX_NAME_BYTES};
use crate::infrastructure::asset_manager::AssetManager;

/// Creature service trait defining the application use cases
#[async_trait]
pub trait CreatureService: Send + Sync {
    /// Create a creature record with only a name
    async fn create_creature(&self, name: &str) -> Result<Creature, CreatureError>;

    /// Get a creature by ID
    async fn get_creature(&self, id: CreatureId) -> Result<Creature, CreatureError>;

    async fn list_creatures(&self) -> Result<Vec<Creature>, CreatureError>;

    /// Delete a creature and its asset tree
    async fn delete_creature(&self, id: CreatureId) -> Result<(), CreatureError>;
}

/// Default implementation of CreatureService over a record store
pub struct CreatureServiceImpl<R: ?Sized> {
    repository: Arc<R>,
    assets: AssetManager,
}

impl<R: CreatureRepositoryPort + ?Sized> CreatureServiceImpl<R> {
    pub fn new(repository: Arc<R>, assets: AssetManager) -> Self {
        Self { repository, assets }
    }
}

/// Validate a creature display name
///
/// The name becomes part of a folder name, so path separators and control
/// characters are rejected.
pub fn validate_name(name: &str) -> Result<(), CreatureError> {
    if name.trim().is_empty() {
        return Err(CreatureError::Validation(
            "Creature name cannot be empty".to_string(),
        ));
    }
    if !fits_folder_name(name) {
        return Err(CreatureError::Validation(format!(
            "Creature name cannot exceed {} bytes",
            MAX_NAME_BYTES
        )));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(CreatureError::Validation(
            "Creature name cannot contain path separators or control characters".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl<R: CreatureRepositoryPort + ?Sized> CreatureService for CreatureServiceImpl<R> {
    #[instrument(skip(self))]
    async fn create_creature(&self, name: &str) -> Result<Creature, CreatureError> {
        validate_name(name)?;
        let creature = self.repository.create(name.trim()).await?;
        info!(creature_id = %creature.id, "Created creature: {}", creature.name);
        Ok(creature)
    }

    #[instrument(skip(self))]
    async fn get_creature(&self, id: CreatureId) -> Result<Creature, CreatureError> {
        debug!("Fetching creature");
        self.repository
            .get(id)
            .await?
            .ok_or(CreatureError::CreatureNotFound(id))
    }

    async fn list_creatures(&self) -> Result<Vec<Creature>, CreatureError> {
        Ok(self.repository.list().await?)
    }

    #[instrument(skip(self))]
    async fn delete_creature(&self, id: CreatureId) -> Result<(), CreatureError> {
        let creature = self.get_creature(id).await?;
        if let Some(dir) = creature.asset_directory.as_deref() {
            self.assets.remove_tree(Path::new(dir)).await?;
            debug!("Removed asset tree");
        }
        self.repository.delete(id).await?;
        info!("Deleted creature: {}", creature.name);
        Ok(())
    }
}
