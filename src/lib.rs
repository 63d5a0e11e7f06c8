//! Conveyor - asset pipeline orchestrator
//!
//! Conveyor sequences asset build stages (sprite generation, script, style,
//! and template compilation, static copies) over a source tree, records
//! content-hashed output names in one manifest per asset class, and rewrites
//! references between classes so cache-busted names propagate through the
//! build. A watch mode re-runs the owning stages on change, and a dev
//! server live-reloads the browser when the output tree moves.

pub mod config;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod models;
pub mod pipeline;
pub mod rewrite;
pub mod server;
pub mod stages;
pub mod tools;
pub mod ui;
pub mod watcher;

// Re-exports for convenience
pub use config::Config;
pub use error::{PipelineError, PipelineResult};
pub use hash::{hashed_filename, ContentHash};
pub use manifest::{Manifest, ManifestStore};
pub use models::{AssetClass, BuildMode};
pub use pipeline::{BuildContext, BuildEvent, Orchestrator};
pub use rewrite::Rewriter;
pub use server::DevServer;
pub use stages::{all_stages, Stage, StageOutcome};
pub use tools::ToolCommand;
pub use watcher::{watch, WatchEvent};
