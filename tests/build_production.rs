//! End-to-end production builds over a scaffolded project
//!
//! Covers the pipeline's contract: hashed outputs with manifest entries,
//! reference rewriting across stages, determinism, and clean semantics.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use conveyor::{AssetClass, BuildContext, BuildMode, Config, Orchestrator};

/// Lay down a small site exercising every stage
fn scaffold_site(root: &Path) {
    fs::create_dir_all(root.join("src/js")).unwrap();
    fs::write(root.join("src/js/index.js"), "console.log('app');\n").unwrap();

    fs::create_dir_all(root.join("src/styles/icons")).unwrap();
    fs::write(
        root.join("src/styles/icons/logo.svg"),
        r#"<svg viewBox="0 0 16 16"><path d="M0 0h16v16H0z"/></svg>"#,
    )
    .unwrap();
    fs::write(root.join("src/styles/logo.png"), b"\x89PNG-fake-bytes").unwrap();
    fs::write(
        root.join("src/styles/common.scss"),
        ".logo { background: url(sprite.svg#logo); }\n.hero { background: url(logo.png); }\n",
    )
    .unwrap();

    fs::create_dir_all(root.join("src/templates/pages")).unwrap();
    fs::write(root.join("src/templates/pages/index.pug"), "<html></html>").unwrap();

    fs::create_dir_all(root.join("src/assets")).unwrap();
    fs::write(
        root.join("src/assets/landing.html"),
        r#"<html><body><link href="styles/common.css"><script src="js/index.js"></script></body></html>"#,
    )
    .unwrap();
    fs::write(root.join("src/assets/robots.txt"), "User-agent: *\n").unwrap();
}

fn build(root: &Path, mode: BuildMode) -> conveyor::PipelineResult<BuildContext> {
    let mut ctx = BuildContext::new(root, mode, Config::default());
    Orchestrator::standard().run(&mut ctx, &mut |_| {})?;
    Ok(ctx)
}

/// Sorted relative listing with content hashes, for whole-tree comparison
fn tree_snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let rel = path
                    .strip_prefix(base)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

#[test]
fn production_build_emits_hashed_outputs_and_manifests() {
    let dir = tempdir().unwrap();
    scaffold_site(dir.path());

    let ctx = build(dir.path(), BuildMode::Production).unwrap();

    for class in AssetClass::ALL {
        assert!(
            ctx.manifests().path_for(class).exists(),
            "missing manifest for {class}"
        );
    }

    let scripts = ctx.manifests().read(AssetClass::Scripts).unwrap();
    let hashed_js = scripts.get("index.js").unwrap();
    assert!(dir.path().join("public/js").join(hashed_js).exists());
    assert!(!dir.path().join("public/js/index.js").exists());
}

#[test]
fn compiled_css_references_hashed_sprite_not_logical_name() {
    let dir = tempdir().unwrap();
    scaffold_site(dir.path());

    let ctx = build(dir.path(), BuildMode::Production).unwrap();

    let svg = ctx.manifests().read(AssetClass::Svg).unwrap();
    let hashed_sprite = svg.get("sprite.svg").unwrap();

    let styles = ctx.manifests().read(AssetClass::Styles).unwrap();
    let hashed_css = styles.get("common.css").unwrap();
    let css = fs::read_to_string(dir.path().join("public/styles").join(hashed_css)).unwrap();

    assert!(css.contains(hashed_sprite), "css: {css}");
    assert!(!css.contains("url(sprite.svg"), "css: {css}");
}

#[test]
fn image_copy_produces_hashed_file_and_manifest_entry() {
    let dir = tempdir().unwrap();
    scaffold_site(dir.path());

    let ctx = build(dir.path(), BuildMode::Production).unwrap();

    let images = ctx.manifests().read(AssetClass::Images).unwrap();
    let hashed = images.get("logo.png").unwrap();
    assert!(hashed.starts_with("logo-") && hashed.ends_with(".png"));
    assert!(dir.path().join("public/img").join(hashed).exists());

    // and the css picked the hashed name up
    let styles = ctx.manifests().read(AssetClass::Styles).unwrap();
    let css_name = styles.get("common.css").unwrap();
    let css = fs::read_to_string(dir.path().join("public/styles").join(css_name)).unwrap();
    assert!(css.contains(hashed));
}

#[test]
fn copied_assets_are_rewritten_but_not_hashed() {
    let dir = tempdir().unwrap();
    scaffold_site(dir.path());

    let ctx = build(dir.path(), BuildMode::Production).unwrap();

    let html = fs::read_to_string(dir.path().join("public/landing.html")).unwrap();
    let styles = ctx.manifests().read(AssetClass::Styles).unwrap();
    let scripts = ctx.manifests().read(AssetClass::Scripts).unwrap();
    assert!(html.contains(styles.get("common.css").unwrap()));
    assert!(html.contains(scripts.get("index.js").unwrap()));

    // stable names for entry points and plain assets
    assert!(dir.path().join("public/robots.txt").exists());
    assert!(dir.path().join("public/index.html").exists());
}

#[test]
fn repeated_builds_on_unchanged_input_are_identical() {
    let dir = tempdir().unwrap();
    scaffold_site(dir.path());

    build(dir.path(), BuildMode::Production).unwrap();
    let public_first = tree_snapshot(&dir.path().join("public"));
    let manifest_first = tree_snapshot(&dir.path().join("manifest"));
    assert!(!public_first.is_empty());

    build(dir.path(), BuildMode::Production).unwrap();
    let public_second = tree_snapshot(&dir.path().join("public"));
    let manifest_second = tree_snapshot(&dir.path().join("manifest"));

    assert_eq!(public_first, public_second);
    assert_eq!(manifest_first, manifest_second);
}

#[test]
fn clean_then_build_leaves_no_stale_output() {
    let dir = tempdir().unwrap();
    scaffold_site(dir.path());

    build(dir.path(), BuildMode::Production).unwrap();

    // Simulate a leftover from an older build plus a removed source
    fs::write(dir.path().join("public/stale.js"), "stale").unwrap();
    fs::remove_file(dir.path().join("src/styles/logo.png")).unwrap();

    build(dir.path(), BuildMode::Production).unwrap();

    assert!(!dir.path().join("public/stale.js").exists());
    let images: Vec<PathBuf> = fs::read_dir(dir.path().join("public/img"))
        .map(|entries| entries.flatten().map(|e| e.path()).collect())
        .unwrap_or_default();
    assert!(images.is_empty(), "stale images: {images:?}");
    assert!(!ctx_manifest_has_logo(dir.path()));
}

fn ctx_manifest_has_logo(root: &Path) -> bool {
    let store = conveyor::ManifestStore::new(root.join("manifest"));
    store
        .read(AssetClass::Images)
        .map(|m| m.contains("logo.png"))
        .unwrap_or(false)
}

#[test]
fn development_build_writes_no_manifests_and_keeps_logical_names() {
    let dir = tempdir().unwrap();
    scaffold_site(dir.path());

    build(dir.path(), BuildMode::Development).unwrap();

    assert!(
        !dir.path().join("manifest").exists(),
        "development build must not create the manifest root"
    );
    assert!(dir.path().join("public/js/index.js").exists());
    let css = fs::read_to_string(dir.path().join("public/styles/common.css")).unwrap();
    assert!(css.contains("url(sprite.svg#logo)"));

    let html = fs::read_to_string(dir.path().join("public/landing.html")).unwrap();
    assert!(html.contains(r#"href="styles/common.css""#));
}

#[test]
fn failing_tool_halts_the_build_and_names_the_stage() {
    let dir = tempdir().unwrap();
    scaffold_site(dir.path());

    let mut config = Config::default();
    config.tools.styles = Some("definitely-not-a-real-binary-5c2e".to_string());
    let mut ctx = BuildContext::new(dir.path(), BuildMode::Production, config);

    let err = Orchestrator::standard()
        .run(&mut ctx, &mut |_| {})
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("stage 'styles'"), "got: {message}");

    // stages before the failure already wrote output; no rollback
    assert!(dir.path().join("src/svg/sprite.svg").exists());
    assert!(dir.path().join("manifest/images.json").exists());
    // stages after the failure never ran
    assert!(!dir.path().join("public/landing.html").exists());
}
