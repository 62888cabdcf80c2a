// reference.rs — Port reference parsing and wildcard expansion
//
// A reference is either `Node.Port` (one port) or a bare `Node` (every
// port). The string is split at the first '.', so port names may contain
// further dots or spaces (`TemporalFilter.Filtered image`).
//
// Wildcard expansion is pure: it pairs every output-port name on the
// source with the same-named input port on the destination, in lexical
// order, so a given pair of declarations always decomposes into the same
// concrete edge list.
//
// Preconditions: node instances come from the caller's current node map.
// Postconditions: every returned `(PortRef, PortRef)` names a declared
//   output on `src` and a declared input on `dst`.
// Failure modes: `MalformedReference`, `UnknownPort`, `MixedReferenceForms`,
//   `NoMatchingPorts`.
// Side effects: none.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::catalog::{PassInstance, PortDirection};
use crate::error::GraphError;

/// A parsed, not yet resolved, reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    pub node: &'a str,
    pub port: Option<&'a str>,
}

impl<'a> Reference<'a> {
    pub fn parse(text: &'a str) -> Result<Self, GraphError> {
        let malformed = || GraphError::MalformedReference {
            reference: text.to_string(),
        };
        match text.split_once('.') {
            Some((node, port)) if !node.is_empty() && !port.is_empty() => Ok(Reference {
                node,
                port: Some(port),
            }),
            Some(_) => Err(malformed()),
            None if text.is_empty() => Err(malformed()),
            None => Ok(Reference {
                node: text,
                port: None,
            }),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.port.is_none()
    }
}

/// A fully qualified port: `(node name, port name)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PortRef {
    pub node: String,
    pub port: String,
}

impl PortRef {
    pub fn new(node: impl Into<String>, port: impl Into<String>) -> Self {
        PortRef {
            node: node.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

/// Port names declared as outputs on `src` and inputs on `dst`, sorted.
pub fn matching_ports(src: &PassInstance, dst: &PassInstance) -> Vec<String> {
    let outputs: BTreeSet<&str> = src.outputs().iter().map(|p| p.name.as_str()).collect();
    let inputs: BTreeSet<&str> = dst.inputs().iter().map(|p| p.name.as_str()).collect();
    outputs
        .intersection(&inputs)
        .map(|name| name.to_string())
        .collect()
}

/// Resolve a reference pair into concrete `(output, input)` port pairs.
///
/// `src_node` and `dst_node` must be the instances named by the references;
/// node existence is the caller's concern.
pub fn expand(
    src: &Reference<'_>,
    dst: &Reference<'_>,
    src_node: &PassInstance,
    dst_node: &PassInstance,
) -> Result<Vec<(PortRef, PortRef)>, GraphError> {
    match (src.port, dst.port) {
        (Some(out), Some(inp)) => {
            require_port(src_node, PortDirection::Output, out)?;
            require_port(dst_node, PortDirection::Input, inp)?;
            Ok(vec![(
                PortRef::new(src_node.name(), out),
                PortRef::new(dst_node.name(), inp),
            )])
        }
        (None, None) => {
            let names = matching_ports(src_node, dst_node);
            if names.is_empty() {
                return Err(GraphError::NoMatchingPorts {
                    src: src_node.name().to_string(),
                    dst: dst_node.name().to_string(),
                });
            }
            Ok(names
                .into_iter()
                .map(|name| {
                    (
                        PortRef::new(src_node.name(), name.clone()),
                        PortRef::new(dst_node.name(), name),
                    )
                })
                .collect())
        }
        _ => Err(GraphError::MixedReferenceForms {
            src: display_reference(src),
            dst: display_reference(dst),
        }),
    }
}

/// Fail with `UnknownPort` unless `node` declares `port` in `direction`.
pub fn require_port(
    node: &PassInstance,
    direction: PortDirection,
    port: &str,
) -> Result<(), GraphError> {
    if node.has_port(direction, port) {
        Ok(())
    } else {
        Err(GraphError::UnknownPort {
            node: node.name().to_string(),
            port: port.to_string(),
            direction,
        })
    }
}

fn display_reference(reference: &Reference<'_>) -> String {
    match reference.port {
        Some(port) => format!("{}.{}", reference.node, port),
        None => reference.node.to_string(),
    }
}
