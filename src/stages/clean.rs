//! Clean stage: destructive cleanup before a fresh build
//!
//! Removes the output root, the manifest root, and the generated sprite
//! from the source tree, then invalidates incremental watermarks.

use std::fs;

use crate::error::PipelineResult;
use crate::pipeline::BuildContext;

use super::{sprite, Stage, StageOutcome};

pub struct CleanStage;

impl Stage for CleanStage {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn input_globs(&self) -> &'static [&'static str] {
        &[]
    }

    fn run(&self, ctx: &mut BuildContext) -> PipelineResult<StageOutcome> {
        let output_root = ctx.output_root();
        if output_root.exists() {
            fs::remove_dir_all(&output_root)?;
        }

        let manifest_root = ctx.manifests().root().to_path_buf();
        if manifest_root.exists() {
            fs::remove_dir_all(&manifest_root)?;
        }

        let sprite = ctx.resolve(sprite::SPRITE_PATH);
        if sprite.exists() {
            fs::remove_file(&sprite)?;
        }

        ctx.clear_watermarks();
        Ok(StageOutcome::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::BuildMode;
    use std::time::SystemTime;
    use tempfile::tempdir;

    #[test]
    fn removes_output_manifests_and_sprite() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("public/js")).unwrap();
        fs::write(dir.path().join("public/js/index.js"), "x").unwrap();
        fs::create_dir_all(dir.path().join("manifest")).unwrap();
        fs::write(dir.path().join("manifest/js.json"), "{}").unwrap();
        fs::create_dir_all(dir.path().join("src/svg")).unwrap();
        fs::write(dir.path().join("src/svg/sprite.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("src/svg/other.svg"), "<svg/>").unwrap();

        let mut ctx = BuildContext::new(dir.path(), BuildMode::Production, Config::default());
        ctx.set_watermark("copy-svgs", SystemTime::now());

        CleanStage.run(&mut ctx).unwrap();

        assert!(!dir.path().join("public").exists());
        assert!(!dir.path().join("manifest").exists());
        assert!(!dir.path().join("src/svg/sprite.svg").exists());
        // hand-written SVG sources survive
        assert!(dir.path().join("src/svg/other.svg").exists());
        assert!(ctx.watermark("copy-svgs").is_none());
    }

    #[test]
    fn clean_on_fresh_checkout_is_a_noop() {
        let dir = tempdir().unwrap();
        let mut ctx = BuildContext::new(dir.path(), BuildMode::Development, Config::default());
        assert!(CleanStage.run(&mut ctx).is_ok());
    }
}
