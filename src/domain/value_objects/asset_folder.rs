//! Asset folders - the fixed subdirectories of every creature's tree

use serde::{Deserialize, Serialize};

pub const BASE_DATA_FILE: &str = "data_user.json";
pub const DESCRIPTION_FILE: &str = "monster_data.json";
pub const BASE_IMAGE_NAME: &str = "base";

/// One of the required subfolders under `{root}/{name}_{id}/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFolder {
    Base,
    Animations,
    Data,
}

impl AssetFolder {
    pub const REQUIRED: [AssetFolder; 3] = [Self::Base, Self::Animations, Self::Data];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Animations => "animations",
            Self::Data => "data",
        }
    }

    /// Folders that accept image uploads
    pub fn holds_images(&self) -> bool {
        matches!(self, Self::Base | Self::Animations)
    }
}

impl std::fmt::Display for AssetFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssetFolder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::REQUIRED
            .into_iter()
            .find(|folder| folder.as_str() == s)
            .ok_or_else(|| format!("unknown folder '{}'", s))
    }
}

/// JSON artifacts written into a creature's tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The normalized user input
    BaseData,
    /// The enhanced description
    Description,
    /// Metadata for one animation, keyed by its normalized name
    Animation(String),
}

impl ArtifactKind {
    pub fn folder(&self) -> AssetFolder {
        match self {
            Self::BaseData | Self::Description => AssetFolder::Data,
            Self::Animation(_) => AssetFolder::Animations,
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            Self::BaseData => BASE_DATA_FILE.to_string(),
            Self::Description => DESCRIPTION_FILE.to_string(),
            Self::Animation(token) => format!("{}.json", token),
        }
    }
}
