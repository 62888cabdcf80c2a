// graph.rs — Frozen render graph
//
// The validated result of a build. Only `validate::validate` constructs a
// `RenderGraph`; afterwards it exposes read-only accessors and can be
// rendered as text, canonical JSON, or a SHA-256 fingerprint.
//
// Invariants (established by the validator, never re-checked here):
//   - pass names are unique;
//   - every edge endpoint names a declared port on a registered pass;
//   - the pass-level edge relation is acyclic;
//   - `outputs` is non-empty and duplicate-free.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::catalog::PassInstance;
use crate::reference::PortRef;
use crate::variant::VariantSelection;

/// A directed connection from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub src: PortRef,
    pub dst: PortRef,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderGraph {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    selection: Option<VariantSelection>,
    passes: Vec<PassInstance>,
    edges: Vec<Edge>,
    outputs: Vec<PortRef>,
}

impl RenderGraph {
    pub(crate) fn freeze(
        name: String,
        selection: Option<VariantSelection>,
        passes: Vec<PassInstance>,
        edges: Vec<Edge>,
        outputs: Vec<PortRef>,
    ) -> Self {
        RenderGraph {
            name,
            selection,
            passes,
            edges,
            outputs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The variant selection this graph was assembled from, if any.
    pub fn selection(&self) -> Option<VariantSelection> {
        self.selection
    }

    /// Passes in insertion order.
    pub fn passes(&self) -> &[PassInstance] {
        &self.passes
    }

    pub fn pass(&self, name: &str) -> Option<&PassInstance> {
        self.passes.iter().find(|p| p.name() == name)
    }

    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|p| p.name())
    }

    /// Concrete port-level edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Marked output ports in marking order.
    pub fn outputs(&self) -> &[PortRef] {
        &self.outputs
    }

    pub fn is_output(&self, port: &PortRef) -> bool {
        self.outputs.contains(port)
    }

    /// Distinct pass-level `(src, dst)` pairs.
    pub fn pass_edges(&self) -> BTreeSet<(&str, &str)> {
        self.edges
            .iter()
            .map(|e| (e.src.node.as_str(), e.dst.node.as_str()))
            .collect()
    }

    /// Edges whose destination is `pass`.
    pub fn incoming<'a>(&'a self, pass: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.dst.node == pass)
    }

    /// Edges whose source is `pass`.
    pub fn outgoing<'a>(&'a self, pass: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.src.node == pass)
    }

    /// Compact canonical JSON. Config maps are ordered, so equal graphs
    /// serialize to equal strings.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Indented JSON for `--emit json`.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 of `canonical_json()`.
    pub fn fingerprint(&self) -> Result<[u8; 32], serde_json::Error> {
        let canonical = self.canonical_json()?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Ok(hash)
    }

    /// Hex string of the fingerprint (64 characters).
    pub fn fingerprint_hex(&self) -> Result<String, serde_json::Error> {
        Ok(bytes_to_hex(&self.fingerprint()?))
    }
}

impl fmt::Display for RenderGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "RenderGraph {:?} ({} passes, {} edges, {} outputs)",
            self.name,
            self.passes.len(),
            self.edges.len(),
            self.outputs.len()
        )?;
        for pass in &self.passes {
            writeln!(f, "  pass {}: {}", pass.name(), pass.type_name())?;
        }
        for edge in &self.edges {
            writeln!(f, "  edge {edge}")?;
        }
        for output in &self.outputs {
            writeln!(f, "  output {output}")?;
        }
        Ok(())
    }
}

fn bytes_to_hex(bytes: &[u8; 32]) -> String {
    let mut s = String::with_capacity(64);
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(s, "{:02x}", b);
    }
    s
}
