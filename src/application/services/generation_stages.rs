//! Generation stages - one function per step of the creation pipeline
//!
//! Each stage builds its prompt from upstream artifacts, calls the generation
//! backend through the [`GenerationGuard`], parses the answer strictly and
//! persists its artifact before handing it back.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use super::errors::{CreatureError, GenerationStage};
use super::generation_guard::GenerationGuard;
use super::prompts;
use super::shapes::DescriptionResponse;
use crate::application::ports::outbound::{
    parse_structured, GeneratedImage, GenerationError, GenerationPort, ImageHandle,
    StructuredResponse,
};
use crate::domain::value_objects::{
    ArtifactKind, AssetFolder, CreationInput, EnhancedDescription, ExpressionSet, MoveList,
    BASE_IMAGE_NAME,
};
use crate::infrastructure::asset_manager::AssetManager;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Reject image payloads that are not PNG files
pub fn ensure_png(bytes: &[u8]) -> Result<(), GenerationError> {
    if bytes.is_empty() {
        return Err(GenerationError::Empty);
    }
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return Err(GenerationError::ShapeMismatch(
            "image is not a PNG file".to_string(),
        ));
    }
    Ok(())
}

/// Generate one image and check that it is a PNG, under the guard
pub async fn guarded_image<G: GenerationPort + ?Sized>(
    generator: &G,
    guard: &GenerationGuard,
    operation: &str,
    prompt: &str,
    reference: Option<&ImageHandle>,
) -> Result<GeneratedImage, GenerationError> {
    guard
        .run(operation, move || async move {
            let image = generator.generate_image(prompt, reference).await?;
            ensure_png(&image.bytes)?;
            Ok(image)
        })
        .await
}

pub struct GenerationStages<G: ?Sized> {
    generator: Arc<G>,
    assets: AssetManager,
    guard: GenerationGuard,
}

impl<G: GenerationPort + ?Sized> GenerationStages<G> {
    pub fn new(generator: Arc<G>, assets: AssetManager, guard: GenerationGuard) -> Self {
        Self {
            generator,
            assets,
            guard,
        }
    }

    /// Ask the text model for `T` and parse it, retrying as a unit
    async fn structured<T>(
        &self,
        operation: &str,
        prompt: &str,
        expect: T::Expect,
        reference_image: Option<&[u8]>,
    ) -> Result<T, GenerationError>
    where
        T: StructuredResponse + Send,
    {
        let generator = &*self.generator;
        let format = T::response_format(expect);
        let format = &format;
        self.guard
            .run(operation, move || async move {
                let value = generator
                    .generate_text(prompt, format, reference_image)
                    .await?;
                parse_structured::<T>(value, expect)
            })
            .await
    }

    /// Rewrite the user's description and persist it as `data/monster_data.json`
    #[instrument(skip(self, creature_dir, input), fields(name = %input.name))]
    pub async fn enhance_description(
        &self,
        creature_dir: &Path,
        input: &CreationInput,
    ) -> Result<EnhancedDescription, CreatureError> {
        let prompt = prompts::description_prompt(input);
        let response: DescriptionResponse = self
            .structured("description", &prompt, (), None)
            .await
            .map_err(|e| CreatureError::generation(GenerationStage::Description, e))?;

        let description = EnhancedDescription::from_generation(
            input,
            response.description,
            response.physical_attributes,
            response.image_description,
        );
        self.assets
            .write_artifact(creature_dir, &ArtifactKind::Description, &description)
            .await?;

        info!("Description enhanced");
        Ok(description)
    }

    /// Draw the base image and persist it as `base/base.png`
    #[instrument(skip(self, creature_dir, description), fields(name = %description.name))]
    pub async fn generate_base_image(
        &self,
        creature_dir: &Path,
        description: &EnhancedDescription,
    ) -> Result<GeneratedImage, CreatureError> {
        let prompt = prompts::base_image_prompt(description);
        let image = guarded_image(&*self.generator, &self.guard, "base_image", &prompt, None)
            .await
            .map_err(|e| CreatureError::generation(GenerationStage::BaseImage, e))?;

        self.assets
            .write_png(
                creature_dir,
                AssetFolder::Base,
                BASE_IMAGE_NAME,
                image.bytes.clone(),
            )
            .await?;

        info!(bytes = image.bytes.len(), "Base image generated");
        Ok(image)
    }

    /// Generate exactly `count` battle moves
    ///
    /// The moves are persisted later, one animation metadata file per move.
    #[instrument(skip(self, description, base_image), fields(name = %description.name))]
    pub async fn generate_moveset(
        &self,
        description: &EnhancedDescription,
        count: usize,
        base_image: Option<&[u8]>,
    ) -> Result<MoveList, CreatureError> {
        let prompt = prompts::moveset_prompt(description, count);
        let moves: MoveList = self
            .structured("moveset", &prompt, count, base_image)
            .await
            .map_err(|e| CreatureError::generation(GenerationStage::Moveset, e))?;
        info!(count = moves.moves.len(), "Moveset generated");
        Ok(moves)
    }

    /// Generate exactly `count` expressive moves
    #[instrument(skip(self, description, base_image), fields(name = %description.name))]
    pub async fn generate_expressions(
        &self,
        description: &EnhancedDescription,
        count: usize,
        base_image: Option<&[u8]>,
    ) -> Result<ExpressionSet, CreatureError> {
        let prompt = prompts::expressions_prompt(description, count);
        let expressions: ExpressionSet = self
            .structured("expressions", &prompt, count, base_image)
            .await
            .map_err(|e| CreatureError::generation(GenerationStage::Expressions, e))?;
        info!(count = expressions.expressions.len(), "Expressions generated");
        Ok(expressions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::errors::ErrorKind;
    use crate::application::services::test_support::{sample_input, MockGenerator, PNG_BYTES};
    use crate::domain::value_objects::PipelineSettings;
    use std::time::Duration;
    use tempfile::tempdir;

    fn stages(generator: Arc<MockGenerator>, assets: AssetManager) -> GenerationStages<MockGenerator> {
        let guard = GenerationGuard::new(Duration::from_secs(5), 2, Duration::ZERO, Duration::ZERO);
        GenerationStages::new(generator, assets, guard)
    }

    #[test]
    fn test_ensure_png() {
        assert!(ensure_png(&PNG_BYTES).is_ok());
        assert_eq!(ensure_png(&[]), Err(GenerationError::Empty));
        assert!(ensure_png(b"GIF89a").unwrap_err().is_shape_mismatch());
    }

    #[tokio::test]
    async fn test_enhance_description_persists_artifact() {
        let dir = tempdir().unwrap();
        let assets = AssetManager::new(dir.path());
        let creature_dir = assets
            .ensure_directory(Path::new("pikachu_1/data"), true)
            .await
            .unwrap();
        let creature_dir = creature_dir.parent().unwrap().to_path_buf();

        let stages = stages(Arc::new(MockGenerator::new()), assets);
        let description = stages
            .enhance_description(&creature_dir, &sample_input())
            .await
            .unwrap();

        assert_eq!(description.name, "Pikachu");
        assert_eq!(description.ptype, "Electric");
        let written = std::fs::read_to_string(creature_dir.join("data/monster_data.json")).unwrap();
        let parsed: EnhancedDescription = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, description);
    }

    #[tokio::test]
    async fn test_wrong_move_count_fails_after_retries() {
        let dir = tempdir().unwrap();
        let generator = Arc::new(MockGenerator::new().with_move_count(2));
        let stages = stages(generator.clone(), AssetManager::new(dir.path()));
        let description = crate::application::services::test_support::sample_description();

        let err = stages
            .generate_moveset(&description, 3, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert_eq!(generator.text_calls(), 2);
    }

    #[tokio::test]
    async fn test_base_image_is_written() {
        let dir = tempdir().unwrap();
        let assets = AssetManager::new(dir.path());
        let creature_dir = assets
            .ensure_directory(Path::new("pikachu_1/base"), true)
            .await
            .unwrap()
            .parent()
            .unwrap()
            .to_path_buf();
        let generator = Arc::new(MockGenerator::new());
        let stages = stages(Arc::clone(&generator), assets);
        let description = crate::application::services::test_support::sample_description();

        let image = stages
            .generate_base_image(&creature_dir, &description)
            .await
            .unwrap();
        assert_eq!(generator.image_calls(), 1);
        assert!(image.handle.is_some());
        assert_eq!(std::fs::read(creature_dir.join("base/base.png")).unwrap(), image.bytes);
    }

    #[test]
    fn test_guard_from_default_settings() {
        let guard = GenerationGuard::from_settings(&PipelineSettings::default());
        assert_eq!(guard.timeout(), Duration::from_secs(120));
    }
}
