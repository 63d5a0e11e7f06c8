//! Stage dependency graph
//!
//! Dependencies between stages are declared explicitly on each stage; the
//! execution order is derived here rather than written down by hand. Kahn's
//! algorithm with declaration-order tie-breaking keeps the result
//! deterministic, so a registry declared in the natural reading order runs
//! in that order whenever the edges allow it.

use crate::error::{PipelineError, PipelineResult};

/// Topologically sort stage nodes given as `(name, deps)` pairs.
///
/// Returns indices into `nodes` in execution order. Unknown dependency
/// names and cycles are configuration errors reported before any stage
/// runs.
pub(crate) fn execution_order(
    nodes: &[(&'static str, Vec<&'static str>)],
) -> PipelineResult<Vec<usize>> {
    let index_of = |name: &str| nodes.iter().position(|(n, _)| *n == name);

    let mut in_degree = vec![0usize; nodes.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

    for (i, (name, deps)) in nodes.iter().enumerate() {
        for dep in deps {
            let Some(j) = index_of(dep) else {
                return Err(PipelineError::UnknownDependency {
                    stage: (*name).to_string(),
                    dependency: (*dep).to_string(),
                });
            };
            in_degree[i] += 1;
            successors[j].push(i);
        }
    }

    let mut order = Vec::with_capacity(nodes.len());
    let mut done = vec![false; nodes.len()];

    while order.len() < nodes.len() {
        // Lowest declaration index among ready nodes; O(n^2) is fine at
        // pipeline scale and keeps ties deterministic.
        let next = (0..nodes.len()).find(|&i| !done[i] && in_degree[i] == 0);
        let Some(i) = next else {
            let stuck = (0..nodes.len())
                .find(|&i| !done[i])
                .map(|i| nodes[i].0)
                .unwrap_or("?");
            return Err(PipelineError::DependencyCycle {
                stage: stuck.to_string(),
            });
        };
        done[i] = true;
        order.push(i);
        for &succ in &successors[i] {
            in_degree[succ] -= 1;
        }
    }

    Ok(order)
}
