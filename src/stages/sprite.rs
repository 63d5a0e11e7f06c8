//! SVG sprite stage
//!
//! Collects the SVG icons referenced from the stylesheets into one stack
//! sprite: each icon becomes a nested `<svg id="...">` shown only when
//! targeted (`sprite.svg#icon`). The sprite is written into the source tree
//! at `src/svg/sprite.svg`, where the copy-svgs stage (and, in watch mode,
//! the watcher) picks it up like any other SVG source.

use std::fs;

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::BuildContext;

use super::{glob_files, Stage, StageOutcome};

/// Where the generated sprite lands, relative to the project root
pub const SPRITE_PATH: &str = "src/svg/sprite.svg";

const INPUTS: &[&str] = &["src/styles/**/*.svg"];

pub struct SpriteStage;

impl Stage for SpriteStage {
    fn name(&self) -> &'static str {
        "sprite"
    }

    fn input_globs(&self) -> &'static [&'static str] {
        INPUTS
    }

    fn deps(&self) -> &'static [&'static str] {
        &["clean"]
    }

    fn run(&self, ctx: &mut BuildContext) -> PipelineResult<StageOutcome> {
        let files = glob_files(ctx, INPUTS)?;
        if files.is_empty() {
            return Ok(StageOutcome::default());
        }

        let mut icons = Vec::with_capacity(files.len());
        for file in &files {
            let id = icon_id(
                file.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
            if icons.iter().any(|(existing, _)| *existing == id) {
                return Err(PipelineError::Stage {
                    stage: self.name().to_string(),
                    message: format!("duplicate icon id '{}' (from {})", id, file.display()),
                });
            }
            let source = fs::read_to_string(file)?;
            let icon = parse_icon(&source).ok_or_else(|| PipelineError::Stage {
                stage: self.name().to_string(),
                message: format!("{} is not a usable SVG document", file.display()),
            })?;
            icons.push((id, icon));
        }

        let sprite_path = ctx.resolve(SPRITE_PATH);
        if let Some(parent) = sprite_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&sprite_path, render_sprite(&icons))?;

        Ok(StageOutcome {
            written: vec![sprite_path],
            skipped: 0,
        })
    }
}

/// Root attributes and inner markup of one source SVG
#[derive(Debug, Clone, PartialEq, Eq)]
struct Icon {
    view_box: Option<String>,
    body: String,
}

fn icon_id(stem: String) -> String {
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Pull the viewBox and inner content out of an SVG document without a full
/// XML parse; enough for the sprite, which reuses the markup verbatim.
fn parse_icon(source: &str) -> Option<Icon> {
    let open = source.find("<svg")?;
    let after_open = &source[open..];
    let tag_end = after_open.find('>')?;
    let attrs = &after_open[..tag_end];
    let rest = &after_open[tag_end + 1..];
    let close = rest.rfind("</svg>")?;

    Some(Icon {
        view_box: attr_value(attrs, "viewBox"),
        body: rest[..close].trim().to_string(),
    })
}

fn attr_value(attrs: &str, name: &str) -> Option<String> {
    let start = attrs.find(&format!("{}=\"", name))? + name.len() + 2;
    let end = attrs[start..].find('"')? + start;
    Some(attrs[start..end].to_string())
}

/// Render the stack sprite: icons hidden by default, shown via `:target`
fn render_sprite(icons: &[(String, Icon)]) -> String {
    let mut out = String::new();
    out.push_str(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">\n",
    );
    out.push_str("<style>:root > svg { display: none } :root > svg:target { display: block }</style>\n");
    for (id, icon) in icons {
        match &icon.view_box {
            Some(vb) => out.push_str(&format!("<svg id=\"{}\" viewBox=\"{}\">", id, vb)),
            None => out.push_str(&format!("<svg id=\"{}\">", id)),
        }
        out.push_str(&icon.body);
        out.push_str("</svg>\n");
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::BuildMode;
    use tempfile::tempdir;

    #[test]
    fn parse_icon_extracts_viewbox_and_body() {
        let icon = parse_icon(
            r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16">
  <path d="M0 0h16v16H0z"/>
</svg>"#,
        )
        .unwrap();
        assert_eq!(icon.view_box.as_deref(), Some("0 0 16 16"));
        assert_eq!(icon.body, r#"<path d="M0 0h16v16H0z"/>"#);
    }

    #[test]
    fn parse_icon_rejects_non_svg() {
        assert!(parse_icon("<html></html>").is_none());
        assert!(parse_icon("<svg unterminated").is_none());
    }

    #[test]
    fn icon_id_sanitizes_stems() {
        assert_eq!(icon_id("arrow left@2x".to_string()), "arrow-left-2x");
    }

    #[test]
    fn sprite_contains_one_nested_svg_per_icon() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/styles/icons")).unwrap();
        fs::write(
            dir.path().join("src/styles/icons/arrow.svg"),
            r#"<svg viewBox="0 0 8 8"><path d="M0 0"/></svg>"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("src/styles/icons/dot.svg"),
            r#"<svg viewBox="0 0 4 4"><circle r="2"/></svg>"#,
        )
        .unwrap();

        let mut ctx = BuildContext::new(dir.path(), BuildMode::Development, Config::default());
        let outcome = SpriteStage.run(&mut ctx).unwrap();
        assert_eq!(outcome.written.len(), 1);

        let sprite = fs::read_to_string(dir.path().join("src/svg/sprite.svg")).unwrap();
        assert!(sprite.contains(r#"<svg id="arrow" viewBox="0 0 8 8">"#));
        assert!(sprite.contains(r#"<svg id="dot" viewBox="0 0 4 4">"#));
        assert!(sprite.contains(":target"));
    }

    #[test]
    fn sprite_is_deterministic() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/styles")).unwrap();
        fs::write(
            dir.path().join("src/styles/b.svg"),
            r#"<svg viewBox="0 0 1 1"><g/></svg>"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("src/styles/a.svg"),
            r#"<svg viewBox="0 0 2 2"><g/></svg>"#,
        )
        .unwrap();

        let mut ctx = BuildContext::new(dir.path(), BuildMode::Development, Config::default());
        SpriteStage.run(&mut ctx).unwrap();
        let first = fs::read(dir.path().join("src/svg/sprite.svg")).unwrap();
        SpriteStage.run(&mut ctx).unwrap();
        let second = fs::read(dir.path().join("src/svg/sprite.svg")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn no_sources_means_no_sprite() {
        let dir = tempdir().unwrap();
        let mut ctx = BuildContext::new(dir.path(), BuildMode::Development, Config::default());
        let outcome = SpriteStage.run(&mut ctx).unwrap();
        assert!(outcome.written.is_empty());
        assert!(!dir.path().join("src/svg/sprite.svg").exists());
    }

    #[test]
    fn duplicate_icon_ids_are_an_error() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/styles/a")).unwrap();
        fs::create_dir_all(dir.path().join("src/styles/b")).unwrap();
        let svg = r#"<svg viewBox="0 0 1 1"><g/></svg>"#;
        fs::write(dir.path().join("src/styles/a/icon.svg"), svg).unwrap();
        fs::write(dir.path().join("src/styles/b/icon.svg"), svg).unwrap();

        let mut ctx = BuildContext::new(dir.path(), BuildMode::Development, Config::default());
        let err = SpriteStage.run(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("duplicate icon id"));
    }
}
