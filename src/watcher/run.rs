//! Watch loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::{BuildContext, Orchestrator};

use super::event::{WatchEvent, WatcherState};

/// Watch the source tree and re-run the owning stages on change.
///
/// Runs until `running` flips to false (Ctrl+C). Startup failures — a
/// missing source root or a watcher that cannot register — are fatal;
/// stage failures during the loop are reported and skipped.
pub fn watch(
    orchestrator: &Orchestrator,
    ctx: &mut BuildContext,
    running: Arc<AtomicBool>,
    on_event: impl Fn(WatchEvent),
) -> PipelineResult<()> {
    let matchers = orchestrator.matchers()?;

    let src_root = ctx.resolve("src");
    if !src_root.is_dir() {
        return Err(PipelineError::Watcher {
            message: format!("source root {} does not exist", src_root.display()),
        });
    }

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| PipelineError::Watcher {
        message: e.to_string(),
    })?;

    watcher
        .watch(&src_root, RecursiveMode::Recursive)
        .map_err(|e| PipelineError::Watcher {
            message: e.to_string(),
        })?;

    on_event(WatchEvent::WatchStarted {
        root: src_root.display().to_string(),
    });

    let debounce = Duration::from_millis(ctx.config().watch.debounce_ms);
    let mut state = WatcherState::new(debounce);

    while running.load(Ordering::SeqCst) {
        // Non-blocking poll so shutdown and the debounce window stay responsive
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(50)) {
            if let Ok(rel) = path.strip_prefix(ctx.project_root()) {
                state.add_change(rel.to_path_buf());
            }
        }

        if !state.should_run() {
            continue;
        }

        let changes = state.take_changes();
        let mut owners: Vec<&str> = Vec::new();
        for change in &changes {
            on_event(WatchEvent::FileChanged {
                path: change.display().to_string(),
            });
            for (name, patterns) in &matchers {
                if patterns.iter().any(|p| p.matches_path(change)) && !owners.contains(name) {
                    owners.push(*name);
                }
            }
        }
        if owners.is_empty() {
            continue;
        }

        let ordered = orchestrator.order_subset(&owners)?;
        on_event(WatchEvent::RunStarted {
            stages: ordered.iter().map(|s| s.to_string()).collect(),
        });

        for name in ordered {
            match orchestrator.run_stage(name, ctx) {
                Ok(outcome) => on_event(WatchEvent::StageComplete {
                    stage: name.to_string(),
                    written: outcome.written.len(),
                    skipped: outcome.skipped,
                }),
                Err(err) => on_event(WatchEvent::StageFailed {
                    stage: name.to_string(),
                    message: err.to_string(),
                }),
            }
        }
    }

    on_event(WatchEvent::Shutdown);
    Ok(())
}
