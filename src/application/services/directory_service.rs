//! Directory service - a creature's asset tree and the files in it
//!
//! The record store owns the creature row; the asset tree is referenced from
//! it by `asset_directory`. This service keeps the two in step: the path is
//! only stored once the directory exists, and every stored path is checked
//! against the storage root before it is used.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::errors::CreatureError;
use crate::application::ports::outbound::CreatureRepositoryPort;
use crate::domain::entities::Creature;
use crate::domain::value_objects::{ArtifactKind, AssetFolder, CreationInput, CreatureId};
use crate::infrastructure::asset_manager::AssetManager;

/// Where a creature's assets live
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryInfo {
    pub creature_id: CreatureId,
    pub folder: String,
    pub path: String,
    pub exists: bool,
}

pub struct CreatureDirectoryService<R: ?Sized> {
    repository: Arc<R>,
    assets: AssetManager,
}

impl<R: CreatureRepositoryPort + ?Sized> CreatureDirectoryService<R> {
    pub fn new(repository: Arc<R>, assets: AssetManager) -> Self {
        Self { repository, assets }
    }

    async fn load(&self, id: CreatureId) -> Result<Creature, CreatureError> {
        self.repository
            .get(id)
            .await?
            .ok_or(CreatureError::CreatureNotFound(id))
    }

    /// The stored directory of a creature, checked against the root
    fn stored_directory(&self, creature: &Creature) -> Result<PathBuf, CreatureError> {
        let dir = creature
            .asset_directory
            .as_deref()
            .ok_or(CreatureError::DirectoryNotSet(creature.id))?;
        Ok(self.assets.contain(Path::new(dir))?)
    }

    /// Create the creature's folder with its subfolders and store the path
    ///
    /// Idempotent: an already prepared creature is returned unchanged.
    #[instrument(skip(self, creature), fields(creature_id = %creature.id))]
    pub async fn prepare(&self, creature: Creature) -> Result<(Creature, PathBuf), CreatureError> {
        let folder = creature.folder_name();
        let dir = self
            .assets
            .ensure_directory(Path::new(&folder), true)
            .await?;
        self.assets.ensure_required_folders(&folder).await?;

        let path = dir.to_string_lossy().into_owned();
        if creature.asset_directory.as_deref() == Some(path.as_str()) {
            return Ok((creature, dir));
        }

        let creature = creature.with_asset_directory(path);
        self.repository.update(&creature).await?;
        info!(folder = %folder, "Asset directory assigned");
        Ok((creature, dir))
    }

    /// Create and assign the directory of an existing creature
    pub async fn set_directory(&self, id: CreatureId) -> Result<DirectoryInfo, CreatureError> {
        let creature = self.load(id).await?;
        let (creature, dir) = self.prepare(creature).await?;
        Ok(self.describe(&creature, &dir, true))
    }

    pub async fn get_directory(&self, id: CreatureId) -> Result<DirectoryInfo, CreatureError> {
        let creature = self.load(id).await?;
        let dir = self.stored_directory(&creature)?;
        let exists = tokio::fs::try_exists(&dir)
            .await
            .map_err(|e| CreatureError::Io(e.to_string()))?;
        Ok(self.describe(&creature, &dir, exists))
    }

    fn describe(&self, creature: &Creature, dir: &Path, exists: bool) -> DirectoryInfo {
        DirectoryInfo {
            creature_id: creature.id,
            folder: creature.folder_name(),
            path: dir.to_string_lossy().into_owned(),
            exists,
        }
    }

    /// Resolve a creature's directory, creating it first if needed
    async fn directory_for(&self, id: CreatureId) -> Result<(Creature, PathBuf), CreatureError> {
        let creature = self.load(id).await?;
        match self.stored_directory(&creature) {
            Ok(dir) => Ok((creature, dir)),
            Err(CreatureError::DirectoryNotSet(_)) => self.prepare(creature).await,
            Err(e) => Err(e),
        }
    }

    /// Create `base/`, `animations/` and `data/`; returns the folder names
    pub async fn add_required_folders(&self, id: CreatureId) -> Result<Vec<String>, CreatureError> {
        let (creature, _) = self.directory_for(id).await?;
        self.assets
            .ensure_required_folders(&creature.folder_name())
            .await?;
        Ok(AssetFolder::REQUIRED
            .iter()
            .map(|folder| folder.as_str().to_string())
            .collect())
    }

    /// Persist the normalized input as `data/data_user.json`
    pub async fn write_base_data(
        &self,
        creature: &Creature,
        creature_dir: &Path,
        input: &CreationInput,
    ) -> Result<PathBuf, CreatureError> {
        let path = self
            .assets
            .write_artifact(creature_dir, &ArtifactKind::BaseData, input)
            .await?;
        debug!(creature_id = %creature.id, "Base data written");
        Ok(path)
    }

    /// Normalize a raw body against the creature's own name and store it
    #[instrument(skip(self, raw))]
    pub async fn store_base_data(
        &self,
        id: CreatureId,
        raw: serde_json::Value,
    ) -> Result<CreationInput, CreatureError> {
        let creature = self.load(id).await?;
        let input = CreationInput::normalize_named(&creature.name, raw)?;
        let (creature, dir) = self.directory_for(creature.id).await?;
        self.write_base_data(&creature, &dir, &input).await?;
        Ok(input)
    }

    pub async fn read_file(
        &self,
        id: CreatureId,
        folder: AssetFolder,
        filename: &str,
    ) -> Result<String, CreatureError> {
        let creature = self.load(id).await?;
        let dir = self.stored_directory(&creature)?;
        Ok(self.assets.read_text(&dir, folder, filename).await?)
    }

    /// Store an uploaded PNG in `base/` or `animations/`
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn upload_image(
        &self,
        id: CreatureId,
        folder: AssetFolder,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, CreatureError> {
        check_image_folder(folder)?;
        let is_png = Path::new(filename)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if !is_png {
            return Err(CreatureError::Validation(format!(
                "'{}' is not a .png file",
                filename
            )));
        }
        if bytes.is_empty() {
            return Err(CreatureError::Validation("upload is empty".to_string()));
        }

        let (_, dir) = self.directory_for(id).await?;
        self.assets.write_upload(&dir, folder, filename, bytes).await?;
        info!("Image uploaded");
        Ok(filename.to_string())
    }

    pub async fn list_images(
        &self,
        id: CreatureId,
        folder: AssetFolder,
    ) -> Result<Vec<String>, CreatureError> {
        check_image_folder(folder)?;
        let creature = self.load(id).await?;
        let dir = self.stored_directory(&creature)?;
        Ok(self.assets.list_images(&dir, folder).await?)
    }
}

fn check_image_folder(folder: AssetFolder) -> Result<(), CreatureError> {
    if folder.holds_images() {
        Ok(())
    } else {
        Err(CreatureError::Validation(format!(
            "folder '{}' does not hold images",
            folder
        )))
    }
}
