//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::ports::outbound::{CreatureRepositoryPort, GenerationPort};
use crate::application::services::{
    CreationPipeline, CreatureDirectoryService, CreatureServiceImpl,
};
use crate::domain::value_objects::PipelineSettings;
use crate::infrastructure::asset_manager::AssetManager;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::openai::OpenAiClient;
use crate::infrastructure::persistence::{self, SqliteCreatureRepository};

/// Shared application state
pub struct AppState {
    pub creature_service: CreatureServiceImpl<dyn CreatureRepositoryPort>,
    pub directory_service: CreatureDirectoryService<dyn CreatureRepositoryPort>,
    pub pipeline: CreationPipeline<dyn GenerationPort, dyn CreatureRepositoryPort>,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        // Initialize SQLite repository
        let pool = persistence::connect(&config.database_url).await?;
        let repository: Arc<dyn CreatureRepositoryPort> = Arc::new(
            SqliteCreatureRepository::new(pool)
                .await
                .context("Failed to create creatures table")?,
        );

        // Initialize generation client
        let generator: Arc<dyn GenerationPort> = Arc::new(OpenAiClient::new(
            &config.openai_base_url,
            &config.openai_api_key,
            &config.text_model,
            &config.image_model,
        ));

        let assets = AssetManager::new(config.asset_root.clone());
        tokio::fs::create_dir_all(assets.root())
            .await
            .with_context(|| format!("Failed to create asset root {}", assets.root().display()))?;

        Ok(Self::with_adapters(
            generator,
            repository,
            assets,
            config.pipeline.clone(),
        ))
    }

    /// Wire the application services over already built adapters
    pub fn with_adapters(
        generator: Arc<dyn GenerationPort>,
        repository: Arc<dyn CreatureRepositoryPort>,
        assets: AssetManager,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            creature_service: CreatureServiceImpl::new(Arc::clone(&repository), assets.clone()),
            directory_service: CreatureDirectoryService::new(
                Arc::clone(&repository),
                assets.clone(),
            ),
            pipeline: CreationPipeline::new(generator, repository, assets, settings),
        }
    }
}
