//! Concrete pipeline stages
//!
//! Each stage declares its name, the globs that own its inputs (used by the
//! watch loop), the stages whose outputs it consumes, and whether it only
//! processes files changed since its last successful run. Execution order is
//! never written down: the orchestrator derives it from the declared
//! dependencies.

mod assets;
mod clean;
mod images;
mod scripts;
mod sprite;
mod styles;
mod svgs;
mod templates;

pub use assets::CopyAssetsStage;
pub use clean::CleanStage;
pub use images::CopyImagesStage;
pub use scripts::ScriptsStage;
pub use sprite::{SpriteStage, SPRITE_PATH};
pub use styles::StylesStage;
pub use svgs::CopySvgsStage;
pub use templates::TemplatesStage;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{PipelineError, PipelineResult};
use crate::hash::{hashed_filename, ContentHash};
use crate::manifest::Manifest;
use crate::models::AssetClass;
use crate::pipeline::BuildContext;
use crate::tools::ToolCommand;

/// One pipeline step transforming a source file set into destination output.
///
/// Stages are idempotent: written files are byte-identical to a from-scratch
/// build given identical inputs.
pub trait Stage {
    /// Stable stage name used in events, errors, and dependency edges
    fn name(&self) -> &'static str;

    /// Globs (relative to the project root) owning this stage's inputs.
    /// The watch loop re-runs a stage when a changed path matches one.
    fn input_globs(&self) -> &'static [&'static str];

    /// Names of stages whose outputs this stage consumes
    fn deps(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the stage only processes files changed since its last
    /// successful run (process-local watermark)
    fn incremental(&self) -> bool {
        false
    }

    fn run(&self, ctx: &mut BuildContext) -> PipelineResult<StageOutcome>;
}

/// Outcome summary of one stage run
#[derive(Debug, Clone, Default)]
pub struct StageOutcome {
    /// Destination files written by this run
    pub written: Vec<PathBuf>,
    /// Inputs skipped as unchanged since the stage's watermark
    pub skipped: usize,
}

/// All stages of the standard build pipeline.
///
/// Declared in the natural build order; the orchestrator's tie-breaking
/// keeps execution in this order wherever the dependency edges allow it.
pub fn all_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(CleanStage),
        Box::new(SpriteStage),
        Box::new(CopySvgsStage),
        Box::new(CopyImagesStage),
        Box::new(ScriptsStage),
        Box::new(StylesStage),
        Box::new(TemplatesStage),
        Box::new(CopyAssetsStage),
    ]
}

/// Expand globs relative to the project root into a sorted, deduplicated
/// file list. Sorting keeps every downstream artifact deterministic.
pub(crate) fn glob_files(ctx: &BuildContext, patterns: &[&str]) -> PipelineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let absolute = ctx.project_root().join(pattern);
        let absolute = absolute.to_string_lossy().into_owned();
        let paths = glob::glob(&absolute).map_err(|e| PipelineError::InvalidPattern {
            pattern: (*pattern).to_string(),
            message: e.to_string(),
        })?;
        for entry in paths {
            let path = entry.map_err(|e| PipelineError::Io(e.into_error()))?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Apply an incremental watermark: keep files modified after `mark`,
/// count the rest as skipped. No watermark means everything is fresh.
pub(crate) fn filter_since(
    files: Vec<PathBuf>,
    mark: Option<SystemTime>,
) -> PipelineResult<(Vec<PathBuf>, usize)> {
    let Some(mark) = mark else {
        return Ok((files, 0));
    };
    let mut fresh = Vec::new();
    let mut skipped = 0;
    for file in files {
        let modified = fs::metadata(&file)?.modified()?;
        if modified > mark {
            fresh.push(file);
        } else {
            skipped += 1;
        }
    }
    Ok((fresh, skipped))
}

/// Destination-relative logical path for a source file (forward slashes)
pub(crate) fn logical_path(base: &Path, file: &Path) -> String {
    file.strip_prefix(base)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Write one output artifact.
///
/// With a manifest (production, manifest-bearing class) the content is
/// hashed, the file lands under its cache-busting name, and the
/// logical→hashed entry is recorded. Without one the logical name is used
/// as-is.
pub(crate) fn emit(
    dest_dir: &Path,
    logical: &str,
    bytes: &[u8],
    manifest: Option<&mut Manifest>,
) -> PipelineResult<PathBuf> {
    let name = match manifest {
        Some(manifest) => {
            let hash = ContentHash::of(bytes);
            let hashed = hashed_filename(logical, &hash);
            manifest.insert(logical, hashed.clone());
            hashed
        }
        None => logical.to_string(),
    };
    let path = dest_dir.join(&name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Shared shape of the copy stages (svgs, images)
pub(crate) struct CopySpec {
    pub stage: &'static str,
    pub inputs: &'static [&'static str],
    pub source_base: &'static str,
    pub dest_subdir: &'static str,
    pub class: AssetClass,
}

/// Copy a file set into its destination, hashing and recording manifest
/// entries in production. Re-runs merge into the existing manifest so an
/// incremental pass never drops entries for unchanged files.
pub(crate) fn run_copy(ctx: &mut BuildContext, spec: &CopySpec) -> PipelineResult<StageOutcome> {
    let files = glob_files(ctx, spec.inputs)?;
    let (files, skipped) = filter_since(files, ctx.watermark(spec.stage))?;

    let dest = ctx.output_root().join(spec.dest_subdir);
    let base = ctx.resolve(spec.source_base);
    let mut manifest = if ctx.is_production() {
        Some(ctx.manifests().read(spec.class)?)
    } else {
        None
    };

    let mut written = Vec::new();
    for file in &files {
        let bytes = fs::read(file)?;
        let logical = logical_path(&base, file);
        written.push(emit(&dest, &logical, &bytes, manifest.as_mut())?);
    }

    if let Some(manifest) = manifest {
        if !written.is_empty() {
            ctx.manifests().write(spec.class, &manifest)?;
        }
    }

    Ok(StageOutcome { written, skipped })
}

/// Parse an optional configured tool command
pub(crate) fn tool(config: &Option<String>) -> Option<ToolCommand> {
    config.as_deref().and_then(ToolCommand::parse)
}
