// dot.rs — Graphviz DOT output for render graphs
//
// Transforms a frozen RenderGraph into DOT format suitable for rendering
// with `dot` or other Graphviz layout engines.
//
// Port-level edges between the same two passes are merged into one DOT
// edge labelled with every `src:dst` port pair. Probe passes (passes that
// declare no outputs) are drawn as dashed side taps that do not constrain
// the layout, and each marked output gets its own plaintext sink.
//
// Preconditions: `graph` has passed validation.
// Postconditions: returns a valid DOT string; equal graphs give equal text.
// Failure modes: none (pure string formatting).
// Side effects: none.

use std::collections::HashMap;
use std::fmt;

use crate::catalog::PassInstance;
use crate::graph::RenderGraph;

/// `Display` adapter rendering a graph as DOT.
pub struct Dot<'a>(pub &'a RenderGraph);

/// Emit the render graph as a Graphviz DOT string.
pub fn emit_dot(graph: &RenderGraph) -> String {
    Dot(graph).to_string()
}

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.0;
        writeln!(f, "digraph render_graph {{")?;
        writeln!(f, "    label=\"{}\";", escape(graph.name()))?;
        writeln!(f, "    labelloc=t;")?;
        writeln!(f, "    rankdir=LR;")?;
        writeln!(f, "    node [fontname=\"Helvetica\", fontsize=10];")?;
        writeln!(f, "    edge [fontname=\"Helvetica\", fontsize=9];")?;

        writeln!(f)?;
        for pass in graph.passes() {
            writeln!(f, "    {} [{}];", node_id(pass.name()), node_attrs(pass))?;
        }

        writeln!(f)?;
        for ((src, dst), labels) in grouped_edges(graph) {
            let probe = graph.pass(dst).is_some_and(is_probe);
            let style = if probe {
                ", style=dashed, constraint=false"
            } else {
                ""
            };
            writeln!(
                f,
                "    {} -> {} [label=\"{}\"{style}];",
                node_id(src),
                node_id(dst),
                escape(&labels.join("\n")),
            )?;
        }

        if !graph.outputs().is_empty() {
            writeln!(f)?;
            writeln!(f, "    // Marked outputs")?;
            for (i, output) in graph.outputs().iter().enumerate() {
                writeln!(
                    f,
                    "    out{i} [shape=plaintext, label=\"{}\"];",
                    escape(&output.to_string())
                )?;
                writeln!(
                    f,
                    "    {} -> out{i} [style=bold, color=darkgreen];",
                    node_id(&output.node)
                )?;
            }
        }

        writeln!(f, "}}")
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Port-level edges grouped by pass pair, in order of first appearance.
fn grouped_edges(graph: &RenderGraph) -> Vec<((&str, &str), Vec<String>)> {
    let mut groups: Vec<((&str, &str), Vec<String>)> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    for edge in graph.edges() {
        let key = (edge.src.node.as_str(), edge.dst.node.as_str());
        let label = if edge.src.port == edge.dst.port {
            edge.src.port.clone()
        } else {
            format!("{}:{}", edge.src.port, edge.dst.port)
        };
        match index.get(&key) {
            Some(&i) => groups[i].1.push(label),
            None => {
                index.insert(key, groups.len());
                groups.push((key, vec![label]));
            }
        }
    }
    groups
}

/// A pass that only observes: it declares inputs and no outputs.
fn is_probe(pass: &PassInstance) -> bool {
    pass.outputs().is_empty()
}

fn node_attrs(pass: &PassInstance) -> String {
    let (shape, color) = if is_probe(pass) {
        ("note", "lightgreen")
    } else {
        ("box", "lightblue")
    };
    format!(
        "shape={shape}, style=filled, fillcolor={color}, label=\"{}\\n{}\"",
        escape(pass.name()),
        escape(pass.type_name())
    )
}

/// Sanitize a pass name to valid DOT identifier characters.
fn node_id(name: &str) -> String {
    let body: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("p_{body}")
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
