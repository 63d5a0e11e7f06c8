//! Configuration module for conveyor
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (`CONVEYOR_*`)
//! 3. Project config (`conveyor.toml` at the project root)
//! 4. Built-in defaults (lowest priority)

mod loader;
#[cfg(test)]
mod tests;
mod types;

pub use loader::ConfigWarning;
pub use types::{Config, PathsConfig, ServerConfig, ToolsConfig, WatchConfig};
