//! Application configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment};

use crate::domain::value_objects::PipelineSettings;

/// Prefix of the environment variables that tune the pipeline,
/// e.g. `MONSTERDEX_PIPELINE_MOVE_COUNT=4`
const PIPELINE_ENV_PREFIX: &str = "MONSTERDEX_PIPELINE";

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database URL
    pub database_url: String,

    /// OpenAI-compatible API base URL
    pub openai_base_url: String,
    pub openai_api_key: String,
    /// Model used for structured text
    pub text_model: String,
    /// Model that drives the image generation tool
    pub image_model: String,

    /// Root of every creature's asset tree
    pub asset_root: PathBuf,

    /// HTTP server port
    pub server_port: u16,

    pub pipeline: PipelineSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://monsterdex.db".to_string()),

            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY environment variable is required")?,
            text_model: env::var("TEXT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            image_model: env::var("IMAGE_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string()),

            asset_root: env::var("ASSET_ROOT")
                .unwrap_or_else(|_| "./data/monsters".to_string())
                .into(),

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            pipeline: load_pipeline_settings(Environment::with_prefix(PIPELINE_ENV_PREFIX))?,
        })
    }
}

/// Read pipeline settings from an environment source; unset keys keep
/// their defaults
fn load_pipeline_settings(source: Environment) -> Result<PipelineSettings> {
    let settings: PipelineSettings = Config::builder()
        .add_source(source.try_parsing(true))
        .build()
        .context("Failed to read pipeline settings")?
        .try_deserialize()
        .context("Invalid pipeline settings")?;

    if settings.move_count == 0 && settings.expression_count == 0 {
        tracing::warn!("Move and expression counts are both zero; only generic sprites will be generated");
    }
    Ok(settings)
}
