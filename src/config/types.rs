//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;

use super::loader;

/// Root configuration loaded from `conveyor.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl Config {
    /// Load from an explicit file path
    pub fn load(path: &Path) -> PipelineResult<Self> {
        loader::load_with_warnings(path).map(|(config, _)| config)
    }

    /// Load `conveyor.toml` under `project_root` if present, otherwise
    /// defaults; always applies environment overrides. Unknown-key warnings
    /// are returned for the caller to surface.
    pub fn load_or_default(project_root: &Path) -> (Self, Vec<loader::ConfigWarning>) {
        loader::load_or_default(project_root)
    }
}

/// Output and manifest locations, relative to the project root.
///
/// Source layout is conventional (`src/js`, `src/styles`, `src/templates`,
/// `src/svg`, `src/assets`) and not configurable; only where the build
/// lands can be moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Destination root for all built assets
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Directory holding the per-class manifest files
    #[serde(default = "default_manifest_root")]
    pub manifest_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            manifest_root: default_manifest_root(),
        }
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from("public")
}

fn default_manifest_root() -> PathBuf {
    PathBuf::from("manifest")
}

/// External tool commands, each run as an opaque transform.
///
/// Absent means the stage passes content through unchanged, which keeps a
/// fresh checkout buildable before any tooling is installed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Script bundler; receives the entry file path, emits the bundle on stdout
    #[serde(default)]
    pub scripts: Option<String>,

    /// Style compiler; receives the root stylesheet path, emits CSS on stdout
    #[serde(default)]
    pub styles: Option<String>,

    /// Template compiler; receives a page path, emits HTML on stdout
    #[serde(default)]
    pub templates: Option<String>,

    /// JS minifier, stdin→stdout (production only)
    #[serde(default)]
    pub minify_js: Option<String>,

    /// CSS minifier, stdin→stdout (production only)
    #[serde(default)]
    pub minify_css: Option<String>,

    /// CSS autoprefixer, stdin→stdout (production only)
    #[serde(default)]
    pub autoprefix: Option<String>,
}

/// Dev server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Watch loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Quiet window after the last change event before stages re-run
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    150
}
