//! Styles stage
//!
//! Compiles the root stylesheet via the configured style compiler and writes
//! `common.css` to `public/styles/`. The production chain mirrors the asset
//! flow: autoprefix → rewrite references against the svg and images
//! manifests → minify → hash into the styles manifest. In development the
//! compiler output passes straight through under its logical name.

use std::fs;

use crate::error::{PipelineError, PipelineResult};
use crate::models::AssetClass;
use crate::pipeline::BuildContext;
use crate::rewrite::Rewriter;

use super::{emit, tool, Stage, StageOutcome};

const ENTRY: &str = "src/styles/common.scss";
const INPUTS: &[&str] = &["src/styles/**/*.scss"];

pub struct StylesStage;

impl Stage for StylesStage {
    fn name(&self) -> &'static str {
        "styles"
    }

    fn input_globs(&self) -> &'static [&'static str] {
        INPUTS
    }

    /// The sprite must exist for `@import`-adjacent references, and both
    /// manifests must be final before references are rewritten.
    fn deps(&self) -> &'static [&'static str] {
        &["sprite", "copy-svgs", "copy-images"]
    }

    fn run(&self, ctx: &mut BuildContext) -> PipelineResult<StageOutcome> {
        let entry = ctx.resolve(ENTRY);
        if !entry.exists() {
            return Ok(StageOutcome::default());
        }

        let mut bytes = match tool(&ctx.config().tools.styles) {
            Some(compiler) => compiler.run_on_file(&entry)?,
            None => fs::read(&entry)?,
        };

        let mut manifest = if ctx.is_production() {
            if let Some(prefixer) = tool(&ctx.config().tools.autoprefix) {
                bytes = prefixer.run_filter(&bytes)?;
            }

            let rewriter = Rewriter::new(vec![
                (AssetClass::Svg, ctx.manifests().read(AssetClass::Svg)?),
                (AssetClass::Images, ctx.manifests().read(AssetClass::Images)?),
            ])?;
            if !rewriter.is_empty() {
                let text = String::from_utf8(bytes).map_err(|_| PipelineError::Stage {
                    stage: self.name().to_string(),
                    message: "style compiler output is not valid UTF-8".to_string(),
                })?;
                bytes = rewriter.rewrite(&text).into_bytes();
            }

            if let Some(minifier) = tool(&ctx.config().tools.minify_css) {
                bytes = minifier.run_filter(&bytes)?;
            }
            Some(ctx.manifests().read(AssetClass::Styles)?)
        } else {
            None
        };

        let dest = ctx.output_root().join("styles");
        let written = emit(&dest, "common.css", &bytes, manifest.as_mut())?;

        if let Some(manifest) = manifest {
            ctx.manifests().write(AssetClass::Styles, &manifest)?;
        }

        Ok(StageOutcome {
            written: vec![written],
            skipped: 0,
        })
    }
}
