//! Creation pipeline - drives one creature from raw input to a full asset tree
//!
//! Order of work:
//!
//! 1. normalize the input, create the record, prepare the directory and
//!    write the base data
//! 2. enhance the description
//! 3. generate the base image
//! 4. generate the moveset and the expressions concurrently
//! 5. fan out one sprite job per move and expression, fan the results in
//! 6. persist every sprite that came back
//! 7. re-read the creature from the store
//!
//! Steps 1 to 3 are fatal: the run stops and the error is returned, leaving
//! whatever was already written in place. From step 4 on, failures are
//! recorded in the result and the run continues.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::creature_service::validate_name;
use super::directory_service::CreatureDirectoryService;
use super::errors::{CreatureError, FailureStage, FailureSummary};
use super::generation_guard::GenerationGuard;
use super::generation_stages::GenerationStages;
use super::sprite_orchestrator::{build_jobs, SpriteOrchestrator};
use crate::application::ports::outbound::{CreatureRepositoryPort, GenerationPort};
use crate::domain::entities::Creature;
use crate::domain::value_objects::{CreationInput, CreatureId, PipelineSettings, PipelineStage};
use crate::infrastructure::asset_manager::AssetManager;

/// Sprite counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpriteSummary {
    pub dispatched: usize,
    pub generated: usize,
    pub persisted: usize,
}

/// Outcome of a complete creation run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub creature: Creature,
    pub stage: PipelineStage,
    pub sprites: SpriteSummary,
    pub failures: Vec<FailureSummary>,
}

pub struct CreationPipeline<G: ?Sized, R: ?Sized> {
    repository: Arc<R>,
    directories: CreatureDirectoryService<R>,
    stages: GenerationStages<G>,
    sprites: SpriteOrchestrator<G>,
    settings: PipelineSettings,
}

impl<G, R> CreationPipeline<G, R>
where
    G: GenerationPort + ?Sized + 'static,
    R: CreatureRepositoryPort + ?Sized,
{
    pub fn new(
        generator: Arc<G>,
        repository: Arc<R>,
        assets: AssetManager,
        settings: PipelineSettings,
    ) -> Self {
        let guard = GenerationGuard::from_settings(&settings);
        debug!(
            timeout_secs = guard.timeout().as_secs(),
            max_attempts = settings.max_attempts,
            sprite_concurrency = settings.sprite_concurrency,
            "Creation pipeline configured"
        );
        Self {
            directories: CreatureDirectoryService::new(Arc::clone(&repository), assets.clone()),
            stages: GenerationStages::new(Arc::clone(&generator), assets.clone(), guard.clone()),
            sprites: SpriteOrchestrator::new(
                generator,
                assets,
                guard,
                settings.sprite_concurrency,
            ),
            repository,
            settings,
        }
    }

    /// Run the whole creation workflow for a raw request body
    #[instrument(skip(self, raw))]
    pub async fn create_complete(&self, raw: Value) -> Result<PipelineResult, CreatureError> {
        let input = CreationInput::normalize(raw)?;
        validate_name(&input.name)?;

        let creature = self.repository.create(&input.name).await?;
        let id = creature.id;
        let mut stage = PipelineStage::Created;
        info!(creature_id = %id, name = %input.name, "Creation pipeline started");

        let (creature, creature_dir) = match self.directories.prepare(creature).await {
            Ok(prepared) => prepared,
            Err(e) => return Err(abort(id, stage, e)),
        };
        if let Err(e) = self
            .directories
            .write_base_data(&creature, &creature_dir, &input)
            .await
        {
            return Err(abort(id, stage, e));
        }

        let description = match self.stages.enhance_description(&creature_dir, &input).await {
            Ok(description) => description,
            Err(e) => return Err(abort(id, stage, e)),
        };
        stage = advance(id, stage);

        let base_image = match self
            .stages
            .generate_base_image(&creature_dir, &description)
            .await
        {
            Ok(image) => image,
            Err(e) => return Err(abort(id, stage, e)),
        };
        stage = advance(id, stage);

        let mut failures = Vec::new();
        let (moves, expressions) = tokio::join!(
            self.stages.generate_moveset(
                &description,
                self.settings.move_count,
                Some(base_image.bytes.as_slice()),
            ),
            self.stages.generate_expressions(
                &description,
                self.settings.expression_count,
                Some(base_image.bytes.as_slice()),
            ),
        );
        let moves = skip_on_failure(moves, FailureStage::Moveset, &mut failures);
        let expressions = skip_on_failure(expressions, FailureStage::Expressions, &mut failures);
        stage = advance(id, stage);

        let plan = build_jobs(moves.as_ref(), expressions.as_ref());
        failures.extend(plan.failures);
        let jobs = plan.jobs;
        let dispatched = jobs.len();
        let results = self.sprites.dispatch(jobs, base_image.handle.clone()).await;
        let generated = results.iter().filter(|r| r.outcome.is_ok()).count();
        stage = advance(id, stage);

        let report = self.sprites.persist(&creature_dir, results).await;
        failures.extend(report.failures);
        stage = advance(id, stage);

        let creature = self
            .repository
            .get(id)
            .await?
            .ok_or(CreatureError::CreatureNotFound(id))?;
        stage = advance(id, stage);

        info!(
            creature_id = %id,
            dispatched,
            generated,
            persisted = report.persisted,
            failures = failures.len(),
            "Creation pipeline complete"
        );

        Ok(PipelineResult {
            creature,
            stage,
            sprites: SpriteSummary {
                dispatched,
                generated,
                persisted: report.persisted,
            },
            failures,
        })
    }
}

/// Move to the next stage on the happy path
fn advance(id: CreatureId, stage: PipelineStage) -> PipelineStage {
    match stage.advance() {
        Ok(next) => {
            info!(creature_id = %id, stage = %next, "Pipeline stage reached");
            next
        }
        Err(e) => {
            warn!(creature_id = %id, error = %e, "Pipeline stage not advanced");
            stage
        }
    }
}

/// Log a fatal failure and mark the run as failed
fn abort(id: CreatureId, stage: PipelineStage, err: CreatureError) -> CreatureError {
    match stage.fail() {
        Ok(failed) => error!(
            creature_id = %id,
            from = %stage,
            stage = %failed,
            error = %err,
            "Creation pipeline failed"
        ),
        Err(e) => error!(creature_id = %id, error = %err, transition = %e, "Creation pipeline failed"),
    }
    err
}

/// Keep the value of a non-fatal stage, or record why it is missing
fn skip_on_failure<T>(
    result: Result<T, CreatureError>,
    stage: FailureStage,
    failures: &mut Vec<FailureSummary>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(stage = ?stage, error = %e, "Stage skipped");
            failures.push(FailureSummary {
                job_id: None,
                name: None,
                stage,
                kind: e.kind(),
                message: e.public_message(),
            });
            None
        }
    }
}
