//! Copy-svgs stage
//!
//! Copies everything under `src/svg/` (including the generated sprite) next
//! to the compiled stylesheets, hashing into the svg manifest in production.
//! Incremental: only files changed since the last successful run.

use crate::error::PipelineResult;
use crate::models::AssetClass;
use crate::pipeline::BuildContext;

use super::{run_copy, CopySpec, Stage, StageOutcome};

const SPEC: CopySpec = CopySpec {
    stage: "copy-svgs",
    inputs: &["src/svg/**/*.svg"],
    source_base: "src/svg",
    dest_subdir: "styles",
    class: AssetClass::Svg,
};

pub struct CopySvgsStage;

impl Stage for CopySvgsStage {
    fn name(&self) -> &'static str {
        SPEC.stage
    }

    fn input_globs(&self) -> &'static [&'static str] {
        SPEC.inputs
    }

    fn deps(&self) -> &'static [&'static str] {
        &["sprite"]
    }

    fn incremental(&self) -> bool {
        true
    }

    fn run(&self, ctx: &mut BuildContext) -> PipelineResult<StageOutcome> {
        run_copy(ctx, &SPEC)
    }
}
