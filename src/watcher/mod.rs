//! File watcher for the development loop
//!
//! Maps filesystem change events to the minimal set of stages that must
//! re-run:
//! - debouncing coalesces a batch of events into one re-run
//! - changed paths are matched against each stage's declared globs
//! - matched stages re-run in execution order
//! - a failing stage is reported and the loop keeps running
//! - NDJSON output for CI

mod event;
mod run;

pub use event::WatchEvent;
pub use run::watch;
