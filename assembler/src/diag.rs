// diag.rs — Unified diagnostics model
//
// Shared diagnostic types used by the builder, validator, lint pass, and the
// `rgc` binary. Errors from `GraphError` convert into error-level
// diagnostics with a remediation hint; lint findings are warnings.
//
// Preconditions: none (types only).
// Postconditions: none (types only).
// Failure modes: none.
// Side effects: none.

use std::fmt;

use crate::error::GraphError;

// ── Diagnostic code ──────────────────────────────────────────────────────

/// A stable diagnostic code (e.g., `E0201`, `W0400`).
///
/// Once assigned, a code must never be reassigned to a different meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagCode(pub &'static str);

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Code registry.
///
/// E01xx: catalog. E02xx: builder. E03xx: validator. W04xx: lint.
pub mod codes {
    use super::DiagCode;

    pub const E0100: DiagCode = DiagCode("E0100"); // unknown pass type
    pub const E0101: DiagCode = DiagCode("E0101"); // duplicate pass type
    pub const E0102: DiagCode = DiagCode("E0102"); // duplicate port declaration
    pub const E0103: DiagCode = DiagCode("E0103"); // unknown config option
    pub const E0104: DiagCode = DiagCode("E0104"); // config value kind mismatch
    pub const E0105: DiagCode = DiagCode("E0105"); // unreadable manifest

    pub const E0200: DiagCode = DiagCode("E0200"); // duplicate node name
    pub const E0201: DiagCode = DiagCode("E0201"); // unknown node
    pub const E0202: DiagCode = DiagCode("E0202"); // unknown port
    pub const E0203: DiagCode = DiagCode("E0203"); // malformed reference
    pub const E0204: DiagCode = DiagCode("E0204"); // mixed reference forms
    pub const E0205: DiagCode = DiagCode("E0205"); // wildcard matched nothing
    pub const E0206: DiagCode = DiagCode("E0206"); // input driven twice

    pub const E0300: DiagCode = DiagCode("E0300"); // cycle
    pub const E0301: DiagCode = DiagCode("E0301"); // no outputs marked

    pub const W0400: DiagCode = DiagCode("W0400"); // orphan pass
}

// ── Severity level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Error,
    Warning,
}

// ── Diagnostic ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<DiagCode>,
    pub level: DiagLevel,
    pub message: String,
    pub hint: Option<String>,
    /// Passes involved, in the order they are relevant (e.g. a cycle path).
    pub passes: Vec<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with no code, hint, or related passes.
    pub fn new(level: DiagLevel, message: impl Into<String>) -> Self {
        Self {
            code: None,
            level,
            message: message.into(),
            hint: None,
            passes: Vec::new(),
        }
    }

    /// Attach a stable diagnostic code.
    pub fn with_code(mut self, code: DiagCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attach a related pass name.
    pub fn with_pass(mut self, pass: impl Into<String>) -> Self {
        self.passes.push(pass.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagLevel::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagLevel::Error => "error",
            DiagLevel::Warning => "warning",
        };
        if let Some(code) = &self.code {
            write!(f, "{}[{}]: {}", level, code, self.message)?;
        } else {
            write!(f, "{}: {}", level, self.message)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

impl From<&GraphError> for Diagnostic {
    fn from(err: &GraphError) -> Self {
        let diag = Diagnostic::new(DiagLevel::Error, err.to_string()).with_code(err.code());
        match err {
            GraphError::UnknownPassType { .. } => {
                diag.with_hint("declare the pass type in the catalog before building")
            }
            GraphError::UnknownConfigOption { .. } => {
                diag.with_hint("configuration options are a closed set; check the spelling")
            }
            GraphError::DuplicateNodeName { name } => diag
                .with_pass(name.clone())
                .with_hint("pass names must be unique within one graph"),
            GraphError::UnknownNode { node, .. } => diag
                .with_pass(node.clone())
                .with_hint("add both passes before connecting them"),
            GraphError::UnknownPort { node, .. } => diag.with_pass(node.clone()),
            GraphError::NoMatchingPorts { src, dst } => diag
                .with_pass(src.clone())
                .with_pass(dst.clone())
                .with_hint("use an explicit 'Pass.port' reference on both ends"),
            GraphError::CycleDetected { path } => {
                let mut diag = diag;
                for pass in path {
                    diag = diag.with_pass(pass.clone());
                }
                diag.with_hint("render graphs must be acyclic; remove the back edge")
            }
            GraphError::NoOutputsMarked => {
                diag.with_hint("mark at least one pass output as a graph result")
            }
            _ => diag,
        }
    }
}
