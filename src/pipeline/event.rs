//! Build event types for progress reporting and NDJSON output

use serde::Serialize;

use crate::models::BuildMode;

/// Events emitted while the orchestrator runs
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BuildEvent {
    BuildStarted {
        mode: BuildMode,
        stages: usize,
    },
    StageStarted {
        stage: &'static str,
    },
    StageComplete {
        stage: &'static str,
        written: usize,
        skipped: usize,
        duration_ms: u64,
    },
    StageFailed {
        stage: &'static str,
        message: String,
    },
    BuildComplete {
        stages: usize,
        duration_ms: u64,
    },
}

impl BuildEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
