//! Prompt templates for the creation pipeline
//!
//! Every prompt is a pure function of upstream artifacts, so the same input
//! always produces the same prompt text.

use crate::domain::value_objects::{
    CreationInput, ElementType, EnhancedDescription, ExpressionCategory, MoveCategory,
};

/// Prompt for the description enhancement stage
pub fn description_prompt(input: &CreationInput) -> String {
    format!(
        r#"You are given the following information about a user-created creature:

- Name: {name}
- Current Description: {description}
- Physical Attributes: {physical_attr}
- Type: {ptype}

Rewrite and improve the description.

Guidelines:
- Make the description fun, lighthearted and a little humorous.
- Keep it short and punchy, about 400 characters at most.
- Expand slightly on what the user wrote without losing the original intent.
- It should read like a witty field-guide entry with useful information.
- Highlight animal-like qualities together with a loving personality.
- Restate the physical attributes as one clear paragraph.
- Write an image description: a purely visual summary of the creature that an
  illustrator could draw from, with no story or personality text."#,
        name = input.name,
        description = input.description,
        physical_attr = input.physical_attr,
        ptype = input.ptype,
    )
}

/// Prompt for the base image stage
pub fn base_image_prompt(description: &EnhancedDescription) -> String {
    format!(
        r#"A creature in the style of 1990s handheld monster-collecting games mixed with classic 90s anime art.
Bold black outlines, flat colors, pixelated shading, limited retro color palette, nostalgic vibe.
Retro cel-shaded textures and a slightly grainy background that resembles old cartridges and anime cels.
Dynamic but simple pose with a clear silhouette.
Make sure the design strongly reflects the given description and type.

### Creature Data
Name: {name}
Core Concept: {image_description}
Physical Attributes: {physical_attr}
Type: {ptype}

Only return the creature itself. Do not include any text in the image."#,
        name = description.name,
        image_description = description.image_description,
        physical_attr = description.physical_attr,
        ptype = description.ptype,
    )
}

/// Prompt for the battle moveset stage
pub fn moveset_prompt(description: &EnhancedDescription, count: usize) -> String {
    format!(
        r#"You are designing a moveset for a fan-created monster.
Base the moves on the creature's type, physical attributes and personality.
The attached image shows the creature; the moves must match its design.

### Requirements
- Provide exactly {count} moves that fit the creature at its current evolutionary stage.
- Each move has a name, an element ({elements}), a category ({categories}),
  power (null for status moves), accuracy (null if it never misses) and a
  short, fun description.
- Each move also has a sprite blueprint: a frame-by-frame description of a
  short animation showing the creature performing the move.
- Balance the moves between offensive, defensive and flavor.

### Creature Data
Name: {name}
Core Concept: {concept}
Physical Attributes: {physical_attr}
Type: {ptype}"#,
        count = count,
        elements = element_list(),
        categories = join_names(MoveCategory::ALL.iter().map(|c| c.as_str())),
        name = description.name,
        concept = description.description,
        physical_attr = description.physical_attr,
        ptype = description.ptype,
    )
}

/// Prompt for the expressive moveset stage
pub fn expressions_prompt(description: &EnhancedDescription, count: usize) -> String {
    format!(
        r#"You are designing fun, lighthearted moves for a fan-created monster.
The goal is to show off the creature's personality and charm rather than battle strength.
Think of playful moves that would appear in an anime episode or a field-guide entry.
The attached image shows the creature; the moves must match its design.

### Requirements
- Provide exactly {count} moves.
- Each move has a name, an element ({elements}; Normal is fine for playful moves),
  a category ({categories}) and a short description of what the move looks
  like and why it shows off the creature's personality.
- Each move also has a sprite blueprint: a frame-by-frame description of a
  short animation showing the creature performing the move.
- Keep them cute, goofy or endearing, not necessarily strong.

### Example
- Bubble Giggle (Water, Cute): blows a stream of bubbles and pops them with its horns while giggling.
- Horn Wiggle (Normal, Playful): wiggles its stubby horns to look tough but only makes others smile.

### Creature Data
Name: {name}
Core Concept: {concept}
Physical Attributes: {physical_attr}
Type: {ptype}"#,
        count = count,
        elements = element_list(),
        categories = join_names(ExpressionCategory::ALL.iter().map(|c| c.as_str())),
        name = description.name,
        concept = description.description,
        physical_attr = description.physical_attr,
        ptype = description.ptype,
    )
}

/// Sprite prompt used when there are no moves or expressions to animate
pub const GENERIC_SPRITE_PROMPT: &str = "Generate a default 3/4-view walking animation sprite \
of the character in GBA pixel art style. Keep proportions simple, use a clear silhouette, \
strong outlines and high-contrast shading. This sprite should serve as a neutral fallback \
animation usable for any case.";

/// Wrap an item's animation description into a sprite sheet prompt
pub fn sprite_prompt(animation: &str) -> String {
    format!(
        r#"Using the creature from the previous image, draw a sprite sheet for the animation below.
Keep the exact same character design, colors and proportions.
GBA-era pixel art, transparent or plain background, frames laid out left to right, no text.

{animation}"#,
        animation = animation.trim(),
    )
}

fn element_list() -> String {
    join_names(ElementType::ALL.iter().map(|e| e.as_str()))
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(" / ")
}
