// builder.rs — Mutable graph under construction
//
// Accumulates passes, edges, and marked outputs. Every mutating call checks
// its own preconditions up front and leaves the builder untouched on error,
// so a failed `add_edge` never adds part of a wildcard expansion.
//
// Preconditions: edges may only reference passes already added.
// Postconditions: after any successful call, invariants (a), (b) and (d)
//   hold for the accumulated state; (c) and (e) are checked by `validate`.
// Failure modes: `DuplicateNodeName`, `UnknownNode`, `UnknownPort`,
//   `MalformedReference`, `MixedReferenceForms`, `NoMatchingPorts`,
//   `InputAlreadyConnected`.
// Side effects: `debug!` events per accepted mutation.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::{PassInstance, PortDirection};
use crate::error::GraphError;
use crate::graph::{Edge, RenderGraph};
use crate::reference::{self, PortRef, Reference};
use crate::variant::VariantSelection;

#[derive(Debug)]
pub struct GraphBuilder {
    pub(crate) name: String,
    pub(crate) selection: Option<VariantSelection>,
    pub(crate) passes: Vec<PassInstance>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) edges: Vec<Edge>,
    /// Input port → the output driving it.
    pub(crate) drivers: HashMap<PortRef, PortRef>,
    pub(crate) outputs: Vec<PortRef>,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        GraphBuilder {
            name: name.into(),
            selection: None,
            passes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            drivers: HashMap::new(),
            outputs: Vec::new(),
        }
    }

    /// Record the selection the graph is assembled from.
    pub fn with_selection(mut self, selection: VariantSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pass(&self, name: &str) -> Option<&PassInstance> {
        self.index.get(name).map(|&i| &self.passes[i])
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn outputs(&self) -> &[PortRef] {
        &self.outputs
    }

    /// Register `instance` under its own name. On a clash the existing
    /// pass is kept.
    pub fn add_pass(&mut self, instance: PassInstance) -> Result<(), GraphError> {
        if self.index.contains_key(instance.name()) {
            return Err(GraphError::DuplicateNodeName {
                name: instance.name().to_string(),
            });
        }
        debug!(pass = instance.name(), ty = instance.type_name(), "pass added");
        self.index
            .insert(instance.name().to_string(), self.passes.len());
        self.passes.push(instance);
        Ok(())
    }

    /// Connect `src` to `dst`. Both are `Node.Port` (one edge) or both are
    /// bare `Node` (one edge per shared port name). Returns how many
    /// concrete edges were added.
    pub fn add_edge(&mut self, src: &str, dst: &str) -> Result<usize, GraphError> {
        let src_ref = Reference::parse(src)?;
        let dst_ref = Reference::parse(dst)?;
        let src_node = self.lookup(src, src_ref.node)?;
        let dst_node = self.lookup(dst, dst_ref.node)?;

        let pairs = reference::expand(&src_ref, &dst_ref, src_node, dst_node)?;

        for (i, (_, input)) in pairs.iter().enumerate() {
            let existing = self
                .drivers
                .get(input)
                .or_else(|| pairs[..i].iter().find(|(_, d)| d == input).map(|(s, _)| s));
            if let Some(driver) = existing {
                return Err(GraphError::InputAlreadyConnected {
                    input: input.to_string(),
                    driver: driver.to_string(),
                });
            }
        }

        let added = pairs.len();
        for (src, dst) in pairs {
            debug!(src = %src, dst = %dst, "edge added");
            self.drivers.insert(dst.clone(), src.clone());
            self.edges.push(Edge { src, dst });
        }
        Ok(added)
    }

    /// Mark an output port as an externally observable result. Marking the
    /// same port twice is a no-op.
    pub fn mark_output(&mut self, port: &str) -> Result<(), GraphError> {
        let r = Reference::parse(port)?;
        let Some(port_name) = r.port else {
            return Err(GraphError::MalformedReference {
                reference: port.to_string(),
            });
        };
        let node = self.lookup(port, r.node)?;
        reference::require_port(node, PortDirection::Output, port_name)?;

        let output = PortRef::new(r.node, port_name);
        if self.outputs.contains(&output) {
            return Ok(());
        }
        debug!(output = %output, "output marked");
        self.outputs.push(output);
        Ok(())
    }

    /// Check the accumulated graph and freeze it. Consumes the builder.
    pub fn validate(self) -> Result<RenderGraph, GraphError> {
        crate::validate::validate(self)
    }

    fn lookup(&self, reference: &str, node: &str) -> Result<&PassInstance, GraphError> {
        self.pass(node).ok_or_else(|| GraphError::UnknownNode {
            reference: reference.to_string(),
            node: node.to_string(),
        })
    }
}
