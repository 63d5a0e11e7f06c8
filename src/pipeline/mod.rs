//! Pipeline orchestration
//!
//! The orchestrator owns the stage registry, derives a deterministic
//! execution order from each stage's declared dependencies, and runs the
//! stages strictly in sequence. A stage failure halts the remaining
//! sequence and surfaces the failing stage's name with the underlying
//! message; output already written stays in place.

mod context;
mod event;
mod graph;

pub use context::BuildContext;
pub use event::BuildEvent;

use std::path::Path;
use std::time::{Instant, SystemTime};

use glob::Pattern;

use crate::error::{PipelineError, PipelineResult};
use crate::stages::{all_stages, Stage, StageOutcome};

/// Sequences stages respecting declared data dependencies
pub struct Orchestrator {
    stages: Vec<Box<dyn Stage>>,
}

impl Orchestrator {
    /// The standard build pipeline:
    /// clean → sprite → copy-svgs → copy-images → scripts → styles →
    /// templates → copy-assets.
    pub fn standard() -> Self {
        Self::with_stages(all_stages())
    }

    pub fn with_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Box<dyn Stage>] {
        &self.stages
    }

    fn nodes(&self) -> Vec<(&'static str, Vec<&'static str>)> {
        self.stages
            .iter()
            .map(|s| (s.name(), s.deps().to_vec()))
            .collect()
    }

    /// Stage names in execution order
    pub fn execution_order(&self) -> PipelineResult<Vec<&'static str>> {
        let order = graph::execution_order(&self.nodes())?;
        Ok(order.into_iter().map(|i| self.stages[i].name()).collect())
    }

    /// Run the full pipeline. Events are delivered to `on_event` as stages
    /// start, finish, or fail.
    pub fn run(
        &self,
        ctx: &mut BuildContext,
        on_event: &mut dyn FnMut(BuildEvent),
    ) -> PipelineResult<()> {
        let order = graph::execution_order(&self.nodes())?;
        on_event(BuildEvent::BuildStarted {
            mode: ctx.mode(),
            stages: order.len(),
        });

        let build_started = Instant::now();
        for i in order.iter().copied() {
            let stage = &self.stages[i];
            let name = stage.name();
            on_event(BuildEvent::StageStarted { stage: name });

            let wall = SystemTime::now();
            let started = Instant::now();
            match stage.run(ctx) {
                Ok(outcome) => {
                    if stage.incremental() {
                        ctx.set_watermark(name, wall);
                    }
                    on_event(BuildEvent::StageComplete {
                        stage: name,
                        written: outcome.written.len(),
                        skipped: outcome.skipped,
                        duration_ms: started.elapsed().as_millis() as u64,
                    });
                }
                Err(err) => {
                    let err = wrap_stage_error(name, err);
                    on_event(BuildEvent::StageFailed {
                        stage: name,
                        message: err.to_string(),
                    });
                    return Err(err);
                }
            }
        }

        on_event(BuildEvent::BuildComplete {
            stages: order.len(),
            duration_ms: build_started.elapsed().as_millis() as u64,
        });
        Ok(())
    }

    /// Re-run a single stage by name (watch mode)
    pub fn run_stage(&self, name: &str, ctx: &mut BuildContext) -> PipelineResult<StageOutcome> {
        let stage = self
            .stages
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| PipelineError::Stage {
                stage: name.to_string(),
                message: "stage is not registered".to_string(),
            })?;

        let wall = SystemTime::now();
        let outcome = stage
            .run(ctx)
            .map_err(|e| wrap_stage_error(stage.name(), e))?;
        if stage.incremental() {
            ctx.set_watermark(stage.name(), wall);
        }
        Ok(outcome)
    }

    /// Compile each stage's ownership globs for watch-mode path matching
    pub fn matchers(&self) -> PipelineResult<Vec<(&'static str, Vec<Pattern>)>> {
        self.stages
            .iter()
            .map(|stage| {
                let patterns = stage
                    .input_globs()
                    .iter()
                    .map(|g| {
                        Pattern::new(g).map_err(|e| PipelineError::InvalidPattern {
                            pattern: (*g).to_string(),
                            message: e.to_string(),
                        })
                    })
                    .collect::<PipelineResult<Vec<_>>>()?;
                Ok((stage.name(), patterns))
            })
            .collect()
    }

    /// Stages whose declared globs own a project-relative path
    pub fn stages_for_path(&self, rel: &Path) -> PipelineResult<Vec<&'static str>> {
        let matchers = self.matchers()?;
        Ok(matchers
            .into_iter()
            .filter(|(_, patterns)| patterns.iter().any(|p| p.matches_path(rel)))
            .map(|(name, _)| name)
            .collect())
    }

    /// Filter `names` down to registered stages, in execution order
    pub fn order_subset(&self, names: &[&str]) -> PipelineResult<Vec<&'static str>> {
        let order = self.execution_order()?;
        Ok(order
            .into_iter()
            .filter(|name| names.contains(name))
            .collect())
    }

    /// Human-readable execution order with dependency edges, one stage per
    /// line (`conveyor graph`)
    pub fn describe(&self) -> PipelineResult<String> {
        let mut out = String::new();
        for i in graph::execution_order(&self.nodes())? {
            let stage = &self.stages[i];
            if stage.deps().is_empty() {
                out.push_str(stage.name());
            } else {
                out.push_str(&format!("{} <- {}", stage.name(), stage.deps().join(", ")));
            }
            out.push('\n');
        }
        Ok(out)
    }
}

/// Give errors escaping a stage the stage's name, once
fn wrap_stage_error(stage: &str, err: PipelineError) -> PipelineError {
    match err {
        already @ PipelineError::Stage { .. } => already,
        other => PipelineError::Stage {
            stage: stage.to_string(),
            message: other.to_string(),
        },
    }
}
