//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite adapter for creature records
//! - Asset manager: the on-disk asset tree
//! - OpenAI: text and image generation client
//! - HTTP: REST API routes
//! - Config: Application configuration
//! - State: Shared application state

pub mod asset_manager;
pub mod config;
pub mod http;
pub mod openai;
pub mod persistence;
pub mod state;
