//! Pipeline settings value object
//!
//! Tunables for the creation pipeline. Loaded from the environment by
//! `infrastructure::config`, falling back to these defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// All configurable pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    // Content contract
    pub move_count: usize,
    pub expression_count: usize,

    // Fan-out
    pub sprite_concurrency: usize,

    // Generation guard
    /// Deadline for a whole stage, retries included
    pub stage_timeout_secs: u64,
    /// Optional cap on a single attempt inside a stage
    pub attempt_timeout_secs: Option<u64>,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            move_count: 3,
            expression_count: 2,
            sprite_concurrency: 4,
            stage_timeout_secs: 120,
            attempt_timeout_secs: None,
            max_attempts: 3,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 8000,
        }
    }
}

impl PipelineSettings {
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs.max(1))
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_secs.map(|secs| Duration::from_secs(secs.max(1)))
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms.max(self.retry_base_delay_ms))
    }
}
