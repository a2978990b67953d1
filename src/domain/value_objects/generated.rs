//! Generated artifacts - structured content produced by the generation stages

use serde::{Deserialize, Serialize};

use super::CreationInput;

/// Elemental typing used to tag moves and expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl ElementType {
    pub const ALL: [ElementType; 18] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Grass,
        Self::Electric,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Fire => "Fire",
            Self::Water => "Water",
            Self::Grass => "Grass",
            Self::Electric => "Electric",
            Self::Ice => "Ice",
            Self::Fighting => "Fighting",
            Self::Poison => "Poison",
            Self::Ground => "Ground",
            Self::Flying => "Flying",
            Self::Psychic => "Psychic",
            Self::Bug => "Bug",
            Self::Rock => "Rock",
            Self::Ghost => "Ghost",
            Self::Dragon => "Dragon",
            Self::Dark => "Dark",
            Self::Steel => "Steel",
            Self::Fairy => "Fairy",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Battle category of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

impl MoveCategory {
    pub const ALL: [MoveCategory; 3] = [Self::Physical, Self::Special, Self::Status];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Physical => "Physical",
            Self::Special => "Special",
            Self::Status => "Status",
        }
    }
}

/// Personality category of an expressive move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionCategory {
    Flavor,
    Cute,
    Playful,
}

impl ExpressionCategory {
    pub const ALL: [ExpressionCategory; 3] = [Self::Flavor, Self::Cute, Self::Playful];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flavor => "Flavor",
            Self::Cute => "Cute",
            Self::Playful => "Playful",
        }
    }
}

/// Description enhanced by the text model, persisted as `monster_data.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedDescription {
    pub name: String,
    pub description: String,
    pub physical_attr: String,
    pub ptype: String,
    /// Used verbatim as the subject of the base image prompt
    pub image_description: String,
}

impl EnhancedDescription {
    /// Combine the user's input with the model's rewrite. Name and type
    /// always come from the user.
    pub fn from_generation(
        input: &CreationInput,
        description: String,
        physical_attr: String,
        image_description: String,
    ) -> Self {
        Self {
            name: input.name.clone(),
            description,
            physical_attr,
            ptype: input.ptype.clone(),
            image_description,
        }
    }
}

/// A battle move with the blueprint for its animation sprite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveItem {
    pub name: String,
    pub element: ElementType,
    pub category: MoveCategory,
    pub power: Option<u16>,
    pub accuracy: Option<u8>,
    pub description: String,
    pub sprite_blueprint: String,
}

impl MoveItem {
    pub fn sprite_prompt(&self) -> String {
        let mut prompt = format!(
            "Animation for the move \"{}\" ({} type, {} move). {}",
            self.name,
            self.element,
            self.category.as_str(),
            self.description.trim()
        );
        if let Some(power) = self.power {
            prompt.push_str(&format!(" Power {}.", power));
        }
        prompt.push_str(&format!("\nSprite blueprint: {}", self.sprite_blueprint.trim()));
        prompt
    }
}

/// A personality move that shows off the creature's charm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionItem {
    pub name: String,
    pub element: ElementType,
    pub category: ExpressionCategory,
    pub description: String,
    pub sprite_blueprint: String,
}

impl ExpressionItem {
    pub fn sprite_prompt(&self) -> String {
        format!(
            "Animation for the expression \"{}\" ({} type, {}). {}\nSprite blueprint: {}",
            self.name,
            self.element,
            self.category.as_str(),
            self.description.trim(),
            self.sprite_blueprint.trim()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveList {
    pub moves: Vec<MoveItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionSet {
    pub expressions: Vec<ExpressionItem>,
}
