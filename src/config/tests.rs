use std::fs;

use tempfile::tempdir;

use super::*;

#[test]
fn defaults_match_original_layout() {
    let config = Config::default();
    assert_eq!(config.paths.output_root.to_str(), Some("public"));
    assert_eq!(config.paths.manifest_root.to_str(), Some("manifest"));
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.watch.debounce_ms, 150);
    assert!(config.tools.scripts.is_none());
}

#[test]
fn load_parses_known_sections() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("conveyor.toml");
    fs::write(
        &path,
        r#"
[paths]
output_root = "dist"

[tools]
styles = "sass --stdin-off"
minify_css = "csso"

[server]
port = 8080
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.paths.output_root.to_str(), Some("dist"));
    assert_eq!(config.paths.manifest_root.to_str(), Some("manifest"));
    assert_eq!(config.tools.styles.as_deref(), Some("sass --stdin-off"));
    assert_eq!(config.tools.minify_css.as_deref(), Some("csso"));
    assert_eq!(config.server.port, 8080);
}

#[test]
fn unknown_keys_warn_but_do_not_fail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("conveyor.toml");
    fs::write(
        &path,
        r#"
[paths]
output_root = "dist"
outpt_root = "typo"
"#,
    )
    .unwrap();

    let (config, warnings) = super::loader::load_with_warnings(&path).unwrap();
    assert_eq!(config.paths.output_root.to_str(), Some("dist"));
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "paths.outpt_root");
}

#[test]
fn invalid_toml_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("conveyor.toml");
    fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, crate::error::PipelineError::Config { .. }));
}

#[test]
fn load_or_default_without_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let (config, warnings) = Config::load_or_default(dir.path());
    assert_eq!(config.paths.output_root.to_str(), Some("public"));
    assert!(warnings.is_empty());
}
