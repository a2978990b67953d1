//! Test doubles for the outbound ports

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::application::ports::outbound::{
    CreatureRepositoryPort, GeneratedImage, GenerationError, GenerationPort, ImageHandle,
    RepositoryError, ResponseFormat,
};
use crate::domain::entities::Creature;
use crate::domain::value_objects::{CreationInput, CreatureId, EnhancedDescription};

/// Smallest byte string that passes the PNG signature check
pub const PNG_BYTES: [u8; 12] = [
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
];

pub fn sample_input() -> CreationInput {
    CreationInput {
        name: "Pikachu".to_string(),
        description: "An electric mouse".to_string(),
        physical_attr: "Small and yellow with red cheeks".to_string(),
        ptype: "Electric".to_string(),
    }
}

pub fn sample_description() -> EnhancedDescription {
    EnhancedDescription {
        name: "Pikachu".to_string(),
        description: "A cheerful mouse that naps in thunderstorms.".to_string(),
        physical_attr: "Small, yellow, red cheeks, bolt-shaped tail.".to_string(),
        ptype: "Electric".to_string(),
        image_description: "A small yellow mouse with red cheeks.".to_string(),
    }
}

/// Scriptable generation backend
///
/// Answers every schema with valid content sized from the schema itself.
/// Moves are named `Test Move <n>` and expressions `Test Expression <n>`,
/// so a sprite can be made to fail by the name in its prompt.
#[derive(Default)]
pub struct MockGenerator {
    move_count: Option<usize>,
    failing_formats: Vec<&'static str>,
    failing_sprites: Vec<String>,
    panicking_sprites: Vec<String>,
    fail_base_image: bool,
    latency: Option<Duration>,
    text_calls: AtomicUsize,
    image_calls: AtomicUsize,
    text_in_flight: AtomicUsize,
    image_in_flight: AtomicUsize,
    text_peak: AtomicUsize,
    image_peak: AtomicUsize,
}

/// Counts a call as in flight until dropped
struct InFlight<'a> {
    current: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(current: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { current }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer the moveset schema with `count` moves
    pub fn with_move_count(mut self, count: usize) -> Self {
        self.move_count = Some(count);
        self
    }

    /// Fail every text call for the named response format
    pub fn with_failing_text(mut self, format_name: &'static str) -> Self {
        self.failing_formats.push(format_name);
        self
    }

    /// Fail every sprite whose prompt mentions `marker`
    pub fn with_failing_sprite(mut self, marker: &str) -> Self {
        self.failing_sprites.push(marker.to_string());
        self
    }

    /// Panic inside the sprite call whose prompt mentions `marker`
    pub fn with_panicking_sprite(mut self, marker: &str) -> Self {
        self.panicking_sprites.push(marker.to_string());
        self
    }

    pub fn with_failing_base_image(mut self) -> Self {
        self.fail_base_image = true;
        self
    }

    /// Hold every call open for `latency` so overlapping calls can be seen
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Most text calls that were running at the same time
    pub fn peak_text_in_flight(&self) -> usize {
        self.text_peak.load(Ordering::SeqCst)
    }

    /// Most image calls that were running at the same time
    pub fn peak_image_in_flight(&self) -> usize {
        self.image_peak.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }
}

fn schema_count(format: &ResponseFormat, list: &str) -> usize {
    format.schema["properties"][list]["minItems"]
        .as_u64()
        .unwrap_or(1) as usize
}

#[async_trait]
impl GenerationPort for MockGenerator {
    async fn generate_text(
        &self,
        prompt: &str,
        format: &ResponseFormat,
        _reference_image: Option<&[u8]>,
    ) -> Result<Value, GenerationError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight::enter(&self.text_in_flight, &self.text_peak);
        self.wait().await;
        if self.failing_formats.contains(&format.name) {
            return Err(GenerationError::Failed(format!("{} unavailable", format.name)));
        }

        match format.name {
            "creature_description" => Ok(json!({
                "name": "ignored",
                "description": format!("Enhanced: {}", prompt.lines().count()),
                "physical_attributes": "Small, yellow, red cheeks.",
                "image_description": "A small yellow mouse with red cheeks."
            })),
            "creature_moveset" => {
                let count = self
                    .move_count
                    .unwrap_or_else(|| schema_count(format, "moves"));
                let moves: Vec<Value> = (1..=count)
                    .map(|n| {
                        json!({
                            "name": format!("Test Move {}", n),
                            "element": "Electric",
                            "category": "Special",
                            "power": 40 + n * 10,
                            "accuracy": 100,
                            "description": "Crackles with static.",
                            "sprite_blueprint": "charge, release, recover"
                        })
                    })
                    .collect();
                Ok(json!({ "moves": moves }))
            }
            "creature_expressions" => {
                let count = schema_count(format, "expressions");
                let expressions: Vec<Value> = (1..=count)
                    .map(|n| {
                        json!({
                            "name": format!("Test Expression {}", n),
                            "element": "Normal",
                            "category": "Cute",
                            "description": "Wiggles happily.",
                            "sprite_blueprint": "wiggle, wiggle, smile"
                        })
                    })
                    .collect();
                Ok(json!({ "expressions": expressions }))
            }
            other => Err(GenerationError::Failed(format!("unexpected format {}", other))),
        }
    }

    async fn generate_image(
        &self,
        prompt: &str,
        reference: Option<&ImageHandle>,
    ) -> Result<GeneratedImage, GenerationError> {
        let n = self.image_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(&self.image_in_flight, &self.image_peak);
        self.wait().await;
        if reference.is_none() && self.fail_base_image {
            return Err(GenerationError::Failed("image backend down".to_string()));
        }
        if self.panicking_sprites.iter().any(|m| prompt.contains(m.as_str())) {
            panic!("sprite generator crashed");
        }
        if self.failing_sprites.iter().any(|m| prompt.contains(m.as_str())) {
            return Err(GenerationError::Failed("sprite rejected".to_string()));
        }
        Ok(GeneratedImage {
            bytes: PNG_BYTES.to_vec(),
            handle: Some(ImageHandle::new(format!("resp_{}", n))),
        })
    }
}

/// Creature store backed by a map
#[derive(Default)]
pub struct InMemoryCreatureRepository {
    rows: Mutex<HashMap<i64, Creature>>,
    next_id: AtomicI64,
}

impl InMemoryCreatureRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CreatureRepositoryPort for InMemoryCreatureRepository {
    async fn create(&self, name: &str) -> Result<Creature, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let creature = Creature {
            id: CreatureId::from_i64(id),
            created_at: Utc::now(),
            name: name.to_string(),
            asset_directory: None,
        };
        self.rows.lock().unwrap().insert(id, creature.clone());
        Ok(creature)
    }

    async fn get(&self, id: CreatureId) -> Result<Option<Creature>, RepositoryError> {
        Ok(self.rows.lock().unwrap().get(&id.as_i64()).cloned())
    }

    async fn list(&self) -> Result<Vec<Creature>, RepositoryError> {
        let mut creatures: Vec<Creature> = self.rows.lock().unwrap().values().cloned().collect();
        creatures.sort_by_key(|c| c.id.as_i64());
        Ok(creatures)
    }

    async fn update(&self, creature: &Creature) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&creature.id.as_i64()) {
            Some(row) => {
                *row = creature.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(creature.id)),
        }
    }

    async fn delete(&self, id: CreatureId) -> Result<(), RepositoryError> {
        match self.rows.lock().unwrap().remove(&id.as_i64()) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound(id)),
        }
    }
}
