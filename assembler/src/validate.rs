// validate.rs — Graph validation and freezing
//
// Runs the post-build checks in a fixed order and, on success, turns the
// builder into an immutable `RenderGraph`:
//
//   1. cycle detection over the pass-level edge relation (three-colour DFS);
//   2. dangling-port scan, re-checking every edge endpoint;
//   3. empty-output check.
//
// Also hosts `lint`, which reports warning-level findings on a frozen graph
// without failing the build.
//
// Preconditions: none; the builder may be in any state.
// Postconditions: `Ok(graph)` satisfies every invariant in `graph.rs`.
// Failure modes: `CycleDetected`, `UnknownNode`, `UnknownPort`,
//   `NoOutputsMarked`.
// Side effects: one `info!` event per successful validation, `warn!` per
//   lint finding.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::builder::GraphBuilder;
use crate::catalog::PortDirection;
use crate::diag::{codes, DiagLevel, Diagnostic};
use crate::error::GraphError;
use crate::graph::RenderGraph;
use crate::reference;

pub fn validate(builder: GraphBuilder) -> Result<RenderGraph, GraphError> {
    if let Some(path) = find_cycle(&builder) {
        return Err(GraphError::CycleDetected { path });
    }
    check_endpoints(&builder)?;
    if builder.outputs.is_empty() {
        return Err(GraphError::NoOutputsMarked);
    }

    info!(
        graph = %builder.name,
        passes = builder.passes.len(),
        edges = builder.edges.len(),
        outputs = builder.outputs.len(),
        "render graph validated"
    );
    Ok(RenderGraph::freeze(
        builder.name,
        builder.selection,
        builder.passes,
        builder.edges,
        builder.outputs,
    ))
}

// ── Cycle detection ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// First cycle found, as pass names starting at the back-edge target.
/// Roots are visited in pass insertion order, successors in edge order.
fn find_cycle(builder: &GraphBuilder) -> Option<Vec<String>> {
    let n = builder.passes.len();
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in &builder.edges {
        // Endpoints that do not resolve are left to the dangling-port scan.
        let (Some(&s), Some(&d)) = (
            builder.index.get(&edge.src.node),
            builder.index.get(&edge.dst.node),
        ) else {
            continue;
        };
        if !adj[s].contains(&d) {
            adj[s].push(d);
        }
    }

    let mut marks = vec![Mark::Unvisited; n];
    for root in 0..n {
        if marks[root] == Mark::Unvisited {
            if let Some(cycle) = dfs_cycle(root, &adj, &mut marks) {
                return Some(
                    cycle
                        .into_iter()
                        .map(|i| builder.passes[i].name().to_string())
                        .collect(),
                );
            }
        }
    }
    None
}

/// Iterative DFS from `root`. Each stack frame is (node, next successor
/// index); the frames themselves form the current path.
fn dfs_cycle(root: usize, adj: &[Vec<usize>], marks: &mut [Mark]) -> Option<Vec<usize>> {
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
    marks[root] = Mark::InProgress;

    while let Some(frame) = stack.last_mut() {
        let (node, cursor) = *frame;
        let Some(&next) = adj[node].get(cursor) else {
            marks[node] = Mark::Done;
            stack.pop();
            continue;
        };
        frame.1 += 1;

        match marks[next] {
            Mark::Unvisited => {
                marks[next] = Mark::InProgress;
                stack.push((next, 0));
            }
            Mark::InProgress => {
                let pos = stack.iter().position(|&(n, _)| n == next)?;
                return Some(stack[pos..].iter().map(|&(n, _)| n).collect());
            }
            Mark::Done => {}
        }
    }
    None
}

// ── Dangling-port scan ──────────────────────────────────────────────────────

fn check_endpoints(builder: &GraphBuilder) -> Result<(), GraphError> {
    for edge in &builder.edges {
        for (port, direction) in [
            (&edge.src, PortDirection::Output),
            (&edge.dst, PortDirection::Input),
        ] {
            let node = builder.pass(&port.node).ok_or_else(|| GraphError::UnknownNode {
                reference: port.to_string(),
                node: port.node.clone(),
            })?;
            reference::require_port(node, direction, &port.port)?;
        }
    }
    for output in &builder.outputs {
        let node = builder.pass(&output.node).ok_or_else(|| GraphError::UnknownNode {
            reference: output.to_string(),
            node: output.node.clone(),
        })?;
        reference::require_port(node, PortDirection::Output, &output.port)?;
    }
    Ok(())
}

// ── Lint ────────────────────────────────────────────────────────────────────

/// Warning-level findings on a frozen graph. Currently: passes with no
/// edge at all in a graph of more than one pass.
pub fn lint(graph: &RenderGraph) -> Vec<Diagnostic> {
    if graph.passes().len() < 2 {
        return Vec::new();
    }
    let mut degree: HashMap<&str, usize> = graph.pass_names().map(|n| (n, 0)).collect();
    for edge in graph.edges() {
        for node in [edge.src.node.as_str(), edge.dst.node.as_str()] {
            if let Some(d) = degree.get_mut(node) {
                *d += 1;
            }
        }
    }

    let mut diags = Vec::new();
    for name in graph.pass_names() {
        if degree.get(name).copied().unwrap_or(0) == 0 {
            warn!(graph = graph.name(), pass = name, "orphan pass");
            diags.push(
                Diagnostic::new(
                    DiagLevel::Warning,
                    format!("pass '{name}' in graph '{}' has no edges", graph.name()),
                )
                .with_code(codes::W0400)
                .with_pass(name)
                .with_hint("connect the pass or remove it"),
            );
        }
    }
    diags
}
