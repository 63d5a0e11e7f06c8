//! Copy-images stage
//!
//! Raster assets living next to the stylesheets (`src/styles/**`) land in
//! `public/img/`, hashed into the images manifest in production.
//! Incremental: only files changed since the last successful run.

use crate::error::PipelineResult;
use crate::models::AssetClass;
use crate::pipeline::BuildContext;

use super::{run_copy, CopySpec, Stage, StageOutcome};

const SPEC: CopySpec = CopySpec {
    stage: "copy-images",
    inputs: &["src/styles/**/*.png", "src/styles/**/*.jpg"],
    source_base: "src/styles",
    dest_subdir: "img",
    class: AssetClass::Images,
};

pub struct CopyImagesStage;

impl Stage for CopyImagesStage {
    fn name(&self) -> &'static str {
        SPEC.stage
    }

    fn input_globs(&self) -> &'static [&'static str] {
        SPEC.inputs
    }

    fn deps(&self) -> &'static [&'static str] {
        &["clean"]
    }

    fn incremental(&self) -> bool {
        true
    }

    fn run(&self, ctx: &mut BuildContext) -> PipelineResult<StageOutcome> {
        run_copy(ctx, &SPEC)
    }
}
