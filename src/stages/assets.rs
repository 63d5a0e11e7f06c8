//! Copy-assets stage
//!
//! Copies `src/assets/**` to the output root. In production every text
//! asset is rewritten against the css, js, and svg manifests (in that fixed
//! order) so hand-written HTML keeps pointing at the hashed bundles; binary
//! assets are copied verbatim. The copied files themselves are never
//! hashed — they are the stable entry points.

use std::fs;

use crate::error::PipelineResult;
use crate::models::AssetClass;
use crate::pipeline::BuildContext;
use crate::rewrite::Rewriter;

use super::{emit, glob_files, logical_path, Stage, StageOutcome};

const INPUTS: &[&str] = &["src/assets/**/*"];
const SOURCE_BASE: &str = "src/assets";

pub struct CopyAssetsStage;

impl Stage for CopyAssetsStage {
    fn name(&self) -> &'static str {
        "copy-assets"
    }

    fn input_globs(&self) -> &'static [&'static str] {
        INPUTS
    }

    /// All three manifests must be final before references are rewritten
    fn deps(&self) -> &'static [&'static str] {
        &["scripts", "styles", "copy-svgs"]
    }

    fn run(&self, ctx: &mut BuildContext) -> PipelineResult<StageOutcome> {
        let files = glob_files(ctx, INPUTS)?;
        if files.is_empty() {
            return Ok(StageOutcome::default());
        }

        let rewriter = if ctx.is_production() {
            Some(Rewriter::new(vec![
                (AssetClass::Styles, ctx.manifests().read(AssetClass::Styles)?),
                (AssetClass::Scripts, ctx.manifests().read(AssetClass::Scripts)?),
                (AssetClass::Svg, ctx.manifests().read(AssetClass::Svg)?),
            ])?)
        } else {
            None
        };

        let dest = ctx.output_root();
        let base = ctx.resolve(SOURCE_BASE);

        let mut written = Vec::new();
        for file in &files {
            let mut bytes = fs::read(file)?;
            if let Some(rewriter) = &rewriter {
                // Binary assets pass through untouched
                if let Ok(text) = String::from_utf8(bytes.clone()) {
                    bytes = rewriter.rewrite(&text).into_bytes();
                }
            }
            let logical = logical_path(&base, file);
            written.push(emit(&dest, &logical, &bytes, None)?);
        }

        Ok(StageOutcome {
            written,
            skipped: 0,
        })
    }
}
