//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

use super::types::Config;

/// File name of the project configuration
pub const CONFIG_FILE: &str = "conveyor.toml";

/// Non-fatal configuration warning surfaced to CLI users
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
}

/// Load configuration and collect non-fatal warnings (unknown keys)
pub fn load_with_warnings(path: &Path) -> PipelineResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| PipelineError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|key| ConfigWarning {
            key,
            file: path.to_path_buf(),
        })
        .collect();

    Ok((config, warnings))
}

/// Load `conveyor.toml` under `project_root`, or defaults when absent or
/// unreadable; environment overrides apply either way.
pub fn load_or_default(project_root: &Path) -> (Config, Vec<ConfigWarning>) {
    let path = project_root.join(CONFIG_FILE);
    if path.exists() {
        if let Ok((config, warnings)) = load_with_warnings(&path) {
            return (with_env_overrides(config), warnings);
        }
    }
    (with_env_overrides(Config::default()), Vec::new())
}

/// Apply environment variable overrides (`CONVEYOR_*` prefix).
///
/// The build mode itself is resolved separately via
/// [`crate::models::BuildMode::from_env`] and threaded explicitly.
pub fn with_env_overrides(mut config: Config) -> Config {
    if let Ok(port) = std::env::var("CONVEYOR_PORT") {
        if let Ok(port) = port.parse::<u16>() {
            config.server.port = port;
        }
    }
    config
}
