//! Creature entity - a user-created fictional character and its asset tree

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::{creature_folder_name, CreatureId};

/// A persisted creature record
///
/// `asset_directory` is a back-reference to the creature's folder on disk.
/// It is `None` until the folder has been created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Creature {
    pub id: CreatureId,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub asset_directory: Option<String>,
}

impl Creature {
    /// Folder name derived from `(name, id)`, unique because `id` is
    pub fn folder_name(&self) -> String {
        creature_folder_name(&self.name, self.id)
    }

    pub fn with_asset_directory(mut self, path: impl Into<String>) -> Self {
        self.asset_directory = Some(path.into());
        self
    }
}
