//! Sprite orchestrator - fan-out of per-item sprite generation and fan-in
//! of the results
//!
//! Every move and expression becomes an independent [`SpriteJob`]. Jobs run
//! as spawned tasks, at most `concurrency` at a time, and complete in any
//! order. Each completion carries its own job, so a result is never matched
//! to the wrong item. A failing, timed out or panicking job only affects its
//! own result.

use std::path::Path;
use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::errors::{CreatureError, ErrorKind, FailureStage, FailureSummary};
use super::generation_guard::GenerationGuard;
use super::generation_stages::guarded_image;
use super::prompts;
use crate::application::ports::outbound::{
    GeneratedImage, GenerationError, GenerationPort, ImageHandle,
};
use crate::domain::value_objects::{
    normalize_name, ArtifactKind, AssetFolder, ExpressionSet, MoveList, SpriteJobId,
};
use crate::infrastructure::asset_manager::AssetManager;

/// One sprite to generate
#[derive(Debug, Clone)]
pub struct SpriteJob {
    pub id: SpriteJobId,
    /// Filesystem-safe token used for the animation files
    pub name: String,
    /// The source item, written next to the sprite
    pub metadata: Value,
    pub prompt: String,
}

impl SpriteJob {
    fn new(id: SpriteJobId, item_name: &str, metadata: Value, animation: &str) -> Self {
        Self {
            id,
            name: normalize_name(item_name).unwrap_or_else(|| id.to_string()),
            metadata,
            prompt: prompts::sprite_prompt(animation),
        }
    }
}

/// Outcome of one sprite job
#[derive(Debug)]
pub struct SpriteResult {
    pub id: SpriteJobId,
    pub name: String,
    pub metadata: Value,
    pub outcome: Result<GeneratedImage, GenerationError>,
}

impl SpriteResult {
    pub fn failure(&self) -> Option<FailureSummary> {
        self.outcome.as_ref().err().map(|e| FailureSummary {
            job_id: Some(self.id),
            name: Some(self.name.clone()),
            stage: FailureStage::SpriteGeneration,
            kind: ErrorKind::from(e),
            message: e.to_string(),
        })
    }
}

/// What the persistence phase managed to write
#[derive(Debug, Default)]
pub struct PersistReport {
    pub persisted: usize,
    pub failures: Vec<FailureSummary>,
}

/// Jobs to dispatch, plus items that could not become a job
#[derive(Debug, Default)]
pub struct SpritePlan {
    pub jobs: Vec<SpriteJob>,
    pub failures: Vec<FailureSummary>,
}

/// Serialize the source item that is written next to its sprite
fn item_metadata<T: Serialize>(id: SpriteJobId, name: &str, item: &T) -> Result<Value, FailureSummary> {
    serde_json::to_value(item).map_err(|e| {
        warn!(job_id = %id, name, error = %e, "Sprite metadata not serializable");
        FailureSummary {
            job_id: Some(id),
            name: Some(name.to_string()),
            stage: FailureStage::SpritePersistence,
            kind: ErrorKind::Serialization,
            message: format!("metadata for '{}' is not serializable", name),
        }
    })
}

/// Build the jobs for a moveset and an expression set
///
/// Ids are 1-based per kind. When neither list yields a job, a single
/// `generic` job is returned instead.
pub fn build_jobs(moves: Option<&MoveList>, expressions: Option<&ExpressionSet>) -> SpritePlan {
    let mut plan = SpritePlan::default();
    let mut add = |id: SpriteJobId, name: &str, metadata: Result<Value, FailureSummary>, animation: String| {
        match metadata {
            Ok(metadata) => plan.jobs.push(SpriteJob::new(id, name, metadata, &animation)),
            Err(failure) => plan.failures.push(failure),
        }
    };

    if let Some(moves) = moves {
        for (i, item) in moves.moves.iter().enumerate() {
            let id = SpriteJobId::Move(i + 1);
            add(id, &item.name, item_metadata(id, &item.name, item), item.sprite_prompt());
        }
    }

    if let Some(expressions) = expressions {
        for (i, item) in expressions.expressions.iter().enumerate() {
            let id = SpriteJobId::Expression(i + 1);
            add(id, &item.name, item_metadata(id, &item.name, item), item.sprite_prompt());
        }
    }

    if plan.jobs.is_empty() {
        plan.jobs.push(SpriteJob::new(
            SpriteJobId::Generic,
            "generic",
            json!({}),
            prompts::GENERIC_SPRITE_PROMPT,
        ));
    }

    plan
}

pub struct SpriteOrchestrator<G: ?Sized> {
    generator: Arc<G>,
    assets: AssetManager,
    guard: GenerationGuard,
    concurrency: usize,
}

impl<G: GenerationPort + ?Sized + 'static> SpriteOrchestrator<G> {
    pub fn new(
        generator: Arc<G>,
        assets: AssetManager,
        guard: GenerationGuard,
        concurrency: usize,
    ) -> Self {
        Self {
            generator,
            assets,
            guard,
            concurrency: concurrency.max(1),
        }
    }

    /// Run every job and return exactly one result per job
    ///
    /// `reference` is the base image handle, so sprites keep the creature's
    /// look. Results come back in completion order.
    #[instrument(skip(self, jobs, reference), fields(jobs = jobs.len()))]
    pub async fn dispatch(
        &self,
        jobs: Vec<SpriteJob>,
        reference: Option<ImageHandle>,
    ) -> Vec<SpriteResult> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut pending = FuturesUnordered::new();

        for job in jobs {
            let generator = Arc::clone(&self.generator);
            let guard = self.guard.clone();
            let semaphore = Arc::clone(&semaphore);
            let reference = reference.clone();
            let prompt = job.prompt.clone();

            let task = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| GenerationError::Failed(e.to_string()))?;
                guarded_image(&*generator, &guard, "sprite", &prompt, reference.as_ref()).await
            });
            debug!(job_id = %job.id, name = %job.name, "Sprite job spawned");

            pending.push(async move {
                let outcome = match task.await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(GenerationError::Failed(format!("sprite task aborted: {}", e))),
                };
                SpriteResult {
                    id: job.id,
                    name: job.name,
                    metadata: job.metadata,
                    outcome,
                }
            });
        }

        let mut results = Vec::with_capacity(pending.len());
        while let Some(result) = pending.next().await {
            match &result.outcome {
                Ok(image) => {
                    debug!(job_id = %result.id, bytes = image.bytes.len(), "Sprite generated")
                }
                Err(e) => warn!(job_id = %result.id, name = %result.name, error = %e, "Sprite generation failed"),
            }
            results.push(result);
        }

        info!(
            generated = results.iter().filter(|r| r.outcome.is_ok()).count(),
            total = results.len(),
            "Sprite jobs finished"
        );
        results
    }

    /// Write image then metadata for every successful result
    ///
    /// Failed jobs and failed writes are recorded in the report; nothing
    /// here aborts the run.
    #[instrument(skip(self, creature_dir, results), fields(results = results.len()))]
    pub async fn persist(&self, creature_dir: &Path, results: Vec<SpriteResult>) -> PersistReport {
        let mut report = PersistReport::default();
        let mut writes = Vec::new();

        for result in results {
            if let Some(failure) = result.failure() {
                report.failures.push(failure);
                continue;
            }
            if let Ok(image) = result.outcome {
                writes.push(self.persist_one(creature_dir, result.id, result.name, result.metadata, image));
            }
        }

        for outcome in join_all(writes).await {
            match outcome {
                Ok(()) => report.persisted += 1,
                Err(failure) => report.failures.push(failure),
            }
        }

        info!(
            persisted = report.persisted,
            failed = report.failures.len(),
            "Sprites persisted"
        );
        report
    }

    async fn persist_one(
        &self,
        creature_dir: &Path,
        id: SpriteJobId,
        name: String,
        metadata: Value,
        image: GeneratedImage,
    ) -> Result<(), FailureSummary> {
        let write = async {
            let png = self
                .assets
                .write_png(creature_dir, AssetFolder::Animations, &name, image.bytes)
                .await?;
            if let Err(e) = self
                .assets
                .write_artifact(creature_dir, &ArtifactKind::Animation(name.clone()), &metadata)
                .await
            {
                // An item is either fully persisted or absent
                if let Err(cleanup) = self.assets.remove_file(&png).await {
                    warn!(job_id = %id, error = %cleanup, "Failed to remove orphaned sprite");
                }
                return Err(CreatureError::from(e));
            }
            Ok::<_, CreatureError>(())
        };

        write.await.map_err(|e| {
            warn!(job_id = %id, name = %name, error = %e, "Failed to persist sprite");
            FailureSummary {
                job_id: Some(id),
                name: Some(name.clone()),
                stage: FailureStage::SpritePersistence,
                kind: e.kind(),
                message: e.public_message(),
            }
        })
    }
}
