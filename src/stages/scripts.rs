//! Scripts stage
//!
//! Hands the entry point to the configured bundler and writes the bundle to
//! `public/js/`. Production adds the optional minify filter, content
//! hashing, and the scripts manifest. Without a configured bundler the
//! entry file passes through unchanged.

use std::fs;

use crate::error::PipelineResult;
use crate::models::AssetClass;
use crate::pipeline::BuildContext;

use super::{emit, tool, Stage, StageOutcome};

const ENTRY: &str = "src/js/index.js";
const INPUTS: &[&str] = &["src/js/**/*.js"];

pub struct ScriptsStage;

impl Stage for ScriptsStage {
    fn name(&self) -> &'static str {
        "scripts"
    }

    fn input_globs(&self) -> &'static [&'static str] {
        INPUTS
    }

    fn deps(&self) -> &'static [&'static str] {
        &["clean"]
    }

    fn run(&self, ctx: &mut BuildContext) -> PipelineResult<StageOutcome> {
        let entry = ctx.resolve(ENTRY);
        if !entry.exists() {
            return Ok(StageOutcome::default());
        }

        let mut bytes = match tool(&ctx.config().tools.scripts) {
            Some(bundler) => bundler.run_on_file(&entry)?,
            None => fs::read(&entry)?,
        };

        let mut manifest = if ctx.is_production() {
            if let Some(minifier) = tool(&ctx.config().tools.minify_js) {
                bytes = minifier.run_filter(&bytes)?;
            }
            Some(ctx.manifests().read(AssetClass::Scripts)?)
        } else {
            None
        };

        let dest = ctx.output_root().join("js");
        let written = emit(&dest, "index.js", &bytes, manifest.as_mut())?;

        if let Some(manifest) = manifest {
            ctx.manifests().write(AssetClass::Scripts, &manifest)?;
        }

        Ok(StageOutcome {
            written: vec![written],
            skipped: 0,
        })
    }
}
