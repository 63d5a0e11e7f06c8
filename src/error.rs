//! Error types for conveyor
//!
//! Library errors use `thiserror`; the binary surfaces them through `anyhow`.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::AssetClass;

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage's transform failed; carries the failing stage's name and the
    /// underlying message. The build sequence halts, already-written output
    /// stays in place.
    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    /// A stage declared a dependency on a stage name that is not registered
    #[error("stage '{stage}' depends on unknown stage '{dependency}'")]
    UnknownDependency { stage: String, dependency: String },

    /// The declared stage dependencies contain a cycle
    #[error("stage dependency cycle involving '{stage}'")]
    DependencyCycle { stage: String },

    /// The same logical path is mapped by two manifests applied in one
    /// rewrite pass
    #[error("logical path '{key}' is mapped by both the {first} and {second} manifests")]
    ManifestOverlap {
        key: String,
        first: AssetClass,
        second: AssetClass,
    },

    /// A stage input glob failed to compile
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Configuration file could not be parsed
    #[error("invalid config {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// An external tool command failed or could not be spawned
    #[error("tool '{command}' failed: {message}")]
    Tool { command: String, message: String },

    /// File watcher could not be started or lost its watch target
    #[error("file watcher error: {message}")]
    Watcher { message: String },

    /// Dev server could not bind or serve
    #[error("dev server failed on {addr}: {message}")]
    Server { addr: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
