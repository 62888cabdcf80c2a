// error.rs — Construction-time error taxonomy
//
// Every failure the catalog, builder, or validator can raise. All variants
// abort the current build; none are recovered from inside the assembler.
// Each variant carries the pass/port names needed to fix the configuration
// and maps to a stable diagnostic code (see `diag::codes`).

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::PortDirection;
use crate::diag::{codes, DiagCode};

#[derive(Debug, Error)]
pub enum GraphError {
    // ── Catalog ────────────────────────────────────────────────────────────
    #[error("unknown pass type '{type_name}'")]
    UnknownPassType { type_name: String },

    #[error("pass type '{type_name}' is already declared")]
    DuplicatePassType { type_name: String },

    #[error("pass type '{type_name}' declares {direction} port '{port}' twice")]
    DuplicatePort {
        type_name: String,
        port: String,
        direction: PortDirection,
    },

    #[error("pass type '{type_name}' has no configuration option '{option}'")]
    UnknownConfigOption { type_name: String, option: String },

    #[error(
        "option '{option}' of pass type '{type_name}' expects {expected}, found {found}"
    )]
    InvalidConfigValue {
        type_name: String,
        option: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot read catalog manifest {}: {source}", .path.display())]
    ManifestIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid catalog manifest {}: {source}", .path.display())]
    ManifestJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    // ── Builder ────────────────────────────────────────────────────────────
    #[error("a pass named '{name}' is already in the graph")]
    DuplicateNodeName { name: String },

    #[error("'{reference}' refers to pass '{node}', which has not been added")]
    UnknownNode { reference: String, node: String },

    #[error("pass '{node}' has no {direction} port '{port}'")]
    UnknownPort {
        node: String,
        port: String,
        direction: PortDirection,
    },

    #[error("malformed port reference '{reference}'")]
    MalformedReference { reference: String },

    #[error("cannot connect '{src}' to '{dst}': both ends must name a port, or neither")]
    MixedReferenceForms { src: String, dst: String },

    #[error("no output of '{src}' matches an input of '{dst}' by name")]
    NoMatchingPorts { src: String, dst: String },

    #[error("input '{input}' is already driven by '{driver}'")]
    InputAlreadyConnected { input: String, driver: String },

    // ── Validator ──────────────────────────────────────────────────────────
    #[error("cycle detected: {}", format_cycle(.path))]
    CycleDetected { path: Vec<String> },

    #[error("graph marks no outputs")]
    NoOutputsMarked,
}

impl GraphError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> DiagCode {
        match self {
            GraphError::UnknownPassType { .. } => codes::E0100,
            GraphError::DuplicatePassType { .. } => codes::E0101,
            GraphError::DuplicatePort { .. } => codes::E0102,
            GraphError::UnknownConfigOption { .. } => codes::E0103,
            GraphError::InvalidConfigValue { .. } => codes::E0104,
            GraphError::ManifestIo { .. } | GraphError::ManifestJson { .. } => codes::E0105,
            GraphError::DuplicateNodeName { .. } => codes::E0200,
            GraphError::UnknownNode { .. } => codes::E0201,
            GraphError::UnknownPort { .. } => codes::E0202,
            GraphError::MalformedReference { .. } => codes::E0203,
            GraphError::MixedReferenceForms { .. } => codes::E0204,
            GraphError::NoMatchingPorts { .. } => codes::E0205,
            GraphError::InputAlreadyConnected { .. } => codes::E0206,
            GraphError::CycleDetected { .. } => codes::E0300,
            GraphError::NoOutputsMarked => codes::E0301,
        }
    }

    /// True for errors raised while reading catalog input rather than
    /// while assembling a graph.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            GraphError::ManifestIo { .. } | GraphError::ManifestJson { .. }
        )
    }
}

/// Render a cycle path as `A -> B -> C -> A`.
fn format_cycle(path: &[String]) -> String {
    match path.first() {
        Some(first) => format!("{} -> {}", path.join(" -> "), first),
        None => String::new(),
    }
}
