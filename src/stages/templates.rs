//! Templates stage
//!
//! Compiles each page template to an `.html` file at the output root via
//! the configured template compiler (passthrough without one). Template
//! output is served directly and is not hashed — HTML entry points keep
//! stable URLs; reference rewriting inside pages is the copy-assets
//! stage's job for static HTML.

use std::fs;

use crate::error::PipelineResult;
use crate::pipeline::BuildContext;

use super::{emit, glob_files, tool, Stage, StageOutcome};

const PAGES: &[&str] = &["src/templates/pages/*.*"];
const INPUTS: &[&str] = &["src/templates/**/*"];

pub struct TemplatesStage;

impl Stage for TemplatesStage {
    fn name(&self) -> &'static str {
        "templates"
    }

    /// Own the whole templates tree: a change to a shared include re-runs
    /// the stage even though only pages are compiled.
    fn input_globs(&self) -> &'static [&'static str] {
        INPUTS
    }

    fn deps(&self) -> &'static [&'static str] {
        &["clean"]
    }

    fn run(&self, ctx: &mut BuildContext) -> PipelineResult<StageOutcome> {
        let pages = glob_files(ctx, PAGES)?;
        if pages.is_empty() {
            return Ok(StageOutcome::default());
        }

        let compiler = tool(&ctx.config().tools.templates);
        let dest = ctx.output_root();

        let mut written = Vec::new();
        for page in &pages {
            let bytes = match &compiler {
                Some(compiler) => compiler.run_on_file(page)?,
                None => fs::read(page)?,
            };
            let stem = page
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            written.push(emit(&dest, &format!("{stem}.html"), &bytes, None)?);
        }

        Ok(StageOutcome {
            written,
            skipped: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::BuildMode;
    use tempfile::tempdir;

    #[test]
    fn pages_compile_to_html_at_output_root() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/templates/pages")).unwrap();
        fs::write(dir.path().join("src/templates/pages/index.pug"), "html body").unwrap();
        fs::write(dir.path().join("src/templates/pages/about.pug"), "html").unwrap();

        let mut ctx = BuildContext::new(dir.path(), BuildMode::Production, Config::default());
        let outcome = TemplatesStage.run(&mut ctx).unwrap();
        assert_eq!(outcome.written.len(), 2);
        assert!(dir.path().join("public/index.html").exists());
        assert!(dir.path().join("public/about.html").exists());
    }

    #[test]
    fn template_output_is_never_hashed() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/templates/pages")).unwrap();
        fs::write(dir.path().join("src/templates/pages/index.html"), "<html/>").unwrap();

        let mut ctx = BuildContext::new(dir.path(), BuildMode::Production, Config::default());
        TemplatesStage.run(&mut ctx).unwrap();
        assert!(dir.path().join("public/index.html").exists());
    }
}
