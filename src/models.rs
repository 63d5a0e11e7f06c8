//! Core data models for conveyor
//!
//! - `AssetClass`: the four manifest-bearing asset categories
//! - `BuildMode`: development vs. production, fixed per invocation

use std::fmt;

use serde::{Deserialize, Serialize};

/// Asset class — each class has one source rule, one destination directory,
/// and one manifest file. Manifests are never merged across classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Scripts,
    Styles,
    Svg,
    Images,
}

impl AssetClass {
    /// All classes, in manifest-root listing order
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Scripts,
        AssetClass::Styles,
        AssetClass::Svg,
        AssetClass::Images,
    ];

    /// Manifest file name for this class under the manifest root
    pub fn manifest_file(&self) -> &'static str {
        match self {
            AssetClass::Scripts => "js.json",
            AssetClass::Styles => "css.json",
            AssetClass::Svg => "svg.json",
            AssetClass::Images => "images.json",
        }
    }

    /// Stable lowercase name used in errors and events
    pub fn name(&self) -> &'static str {
        match self {
            AssetClass::Scripts => "scripts",
            AssetClass::Styles => "styles",
            AssetClass::Svg => "svg",
            AssetClass::Images => "images",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build mode, fixed for the duration of one orchestrator invocation.
///
/// Production turns on content hashing, manifest emission, reference
/// rewriting, and minification; development passes logical paths through
/// unchanged and writes no manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    /// Environment variable consulted by [`BuildMode::from_env`]
    pub const ENV_VAR: &'static str = "CONVEYOR_ENV";

    /// Resolve the mode from `CONVEYOR_ENV`. Absence or any value other
    /// than `production` means development.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(Self::ENV_VAR).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("production") => BuildMode::Production,
            _ => BuildMode::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, BuildMode::Production)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Development => f.write_str("development"),
            BuildMode::Production => f.write_str("production"),
        }
    }
}
