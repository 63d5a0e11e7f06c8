//! Build context threaded through every stage call
//!
//! Carries the build mode as an explicit value (never ambient process
//! state), the resolved configuration, the manifest store, and the
//! process-local incremental watermarks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::Config;
use crate::manifest::ManifestStore;
use crate::models::BuildMode;

/// Everything a stage needs to run
#[derive(Debug)]
pub struct BuildContext {
    project_root: PathBuf,
    mode: BuildMode,
    config: Config,
    manifests: ManifestStore,
    /// "Since last successful run" markers for incremental stages.
    /// In-memory only; reset on process restart and cleared by `clean`.
    watermarks: HashMap<String, SystemTime>,
}

impl BuildContext {
    pub fn new(project_root: impl Into<PathBuf>, mode: BuildMode, config: Config) -> Self {
        let project_root: PathBuf = project_root.into();
        // Canonicalize so watcher events (which arrive canonicalized on some
        // platforms) strip cleanly against the root.
        let project_root = project_root.canonicalize().unwrap_or(project_root);
        let manifests = ManifestStore::new(project_root.join(&config.paths.manifest_root));
        Self {
            project_root,
            mode,
            config,
            manifests,
            watermarks: HashMap::new(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn is_production(&self) -> bool {
        self.mode.is_production()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manifests(&self) -> &ManifestStore {
        &self.manifests
    }

    /// Resolve a project-relative path
    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.project_root.join(rel)
    }

    /// Destination root for built assets
    pub fn output_root(&self) -> PathBuf {
        self.project_root.join(&self.config.paths.output_root)
    }

    pub fn watermark(&self, stage: &str) -> Option<SystemTime> {
        self.watermarks.get(stage).copied()
    }

    pub fn set_watermark(&mut self, stage: &str, mark: SystemTime) {
        self.watermarks.insert(stage.to_string(), mark);
    }

    /// Forget all incremental watermarks. The clean stage calls this: once
    /// outputs are deleted, "unchanged since last run" no longer implies
    /// "present in the output tree".
    pub fn clear_watermarks(&mut self) {
        self.watermarks.clear();
    }
}
