// catalog.rs — Pass type catalog
//
// Maps a pass type name to its declared ports and configuration schema, and
// stamps out `PassInstance`s with the schema defaults overridden by caller
// values. Populated once at start-up (built-in declarations or a JSON
// manifest) and read-only afterwards; lookups take `&self`, so one catalog
// can serve concurrent builds.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

// ── Ports ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => write!(f, "input"),
            PortDirection::Output => write!(f, "output"),
        }
    }
}

/// Texture format a port produces or expects. Informational: the builder
/// matches ports by name only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortFormat {
    #[default]
    Any,
    Rgba32Float,
    Rgba16Float,
    R32Float,
    R32Uint,
}

impl PortFormat {
    /// `Any` is compatible with everything; concrete formats only with themselves.
    pub fn is_compatible(self, other: PortFormat) -> bool {
        self == PortFormat::Any || other == PortFormat::Any || self == other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_any")]
    pub format: PortFormat,
}

fn is_any(format: &PortFormat) -> bool {
    *format == PortFormat::Any
}

impl PortDecl {
    pub fn new(name: impl Into<String>) -> Self {
        PortDecl {
            name: name.into(),
            format: PortFormat::Any,
        }
    }

    pub fn with_format(name: impl Into<String>, format: PortFormat) -> Self {
        PortDecl {
            name: name.into(),
            format,
        }
    }
}

// ── Configuration ───────────────────────────────────────────────────────────

/// A single configuration value. Deserializes from a bare JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConfigValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::Str(_) => "string",
        }
    }

    /// Coerce `self` to the kind of `default`. Int widens to Float; every
    /// other mismatch is rejected.
    fn coerce_to(self, default: &ConfigValue) -> Option<ConfigValue> {
        match (default, self) {
            (ConfigValue::Bool(_), v @ ConfigValue::Bool(_)) => Some(v),
            (ConfigValue::Int(_), v @ ConfigValue::Int(_)) => Some(v),
            (ConfigValue::Float(_), v @ ConfigValue::Float(_)) => Some(v),
            (ConfigValue::Float(_), ConfigValue::Int(n)) => Some(ConfigValue::Float(n as f64)),
            (ConfigValue::Str(_), v @ ConfigValue::Str(_)) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Int(n) => write!(f, "{n}"),
            ConfigValue::Float(x) => write!(f, "{x:?}"),
            ConfigValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(v.into())
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

/// Named configuration values, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassConfig(BTreeMap<String, ConfigValue>);

impl PassConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<ConfigValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── Declarations ────────────────────────────────────────────────────────────

/// A reusable pass type: its ports and its configuration schema. The
/// schema is the set of option names with their default values; the
/// default's kind fixes the option's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassDecl {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub inputs: Vec<PortDecl>,
    #[serde(default)]
    pub outputs: Vec<PortDecl>,
    #[serde(default)]
    pub options: PassConfig,
}

impl PassDecl {
    pub fn new(type_name: &str) -> Self {
        PassDecl {
            type_name: type_name.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            options: PassConfig::new(),
        }
    }

    pub fn input(mut self, name: &str) -> Self {
        self.inputs.push(PortDecl::new(name));
        self
    }

    pub fn input_as(mut self, name: &str, format: PortFormat) -> Self {
        self.inputs.push(PortDecl::with_format(name, format));
        self
    }

    pub fn output(mut self, name: &str) -> Self {
        self.outputs.push(PortDecl::new(name));
        self
    }

    pub fn output_as(mut self, name: &str, format: PortFormat) -> Self {
        self.outputs.push(PortDecl::with_format(name, format));
        self
    }

    pub fn option(mut self, name: &str, default: impl Into<ConfigValue>) -> Self {
        self.options = self.options.with(name, default);
        self
    }
}

/// On-disk catalog format.
#[derive(Debug, Deserialize)]
struct Manifest {
    passes: Vec<PassDecl>,
}

// ── Instances ───────────────────────────────────────────────────────────────

/// A named pass, not yet attached to a graph. Ports are copied verbatim
/// from the declaration; the config is fully populated (defaults + overrides).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassInstance {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    inputs: Vec<PortDecl>,
    outputs: Vec<PortDecl>,
    config: PassConfig,
}

impl PassInstance {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn inputs(&self) -> &[PortDecl] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PortDecl] {
        &self.outputs
    }

    pub fn config(&self) -> &PassConfig {
        &self.config
    }

    pub fn port(&self, direction: PortDirection, name: &str) -> Option<&PortDecl> {
        let ports = match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        };
        ports.iter().find(|p| p.name == name)
    }

    pub fn has_port(&self, direction: PortDirection, name: &str) -> bool {
        self.port(direction, name).is_some()
    }
}

// ── Catalog ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct PassCatalog {
    passes: HashMap<String, PassDecl>,
}

impl PassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of declarations, rejecting duplicates.
    pub fn from_declarations(
        decls: impl IntoIterator<Item = PassDecl>,
    ) -> Result<Self, GraphError> {
        let mut catalog = PassCatalog::new();
        for decl in decls {
            catalog.declare(decl)?;
        }
        Ok(catalog)
    }

    /// Load declarations from a JSON manifest file.
    pub fn load_manifest(path: &Path) -> Result<Self, GraphError> {
        let source = std::fs::read_to_string(path).map_err(|e| GraphError::ManifestIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_manifest_str(&source, path)
    }

    /// Parse a JSON manifest. `origin` only labels errors.
    pub fn from_manifest_str(source: &str, origin: &Path) -> Result<Self, GraphError> {
        let manifest: Manifest =
            serde_json::from_str(source).map_err(|e| GraphError::ManifestJson {
                path: origin.to_path_buf(),
                source: e,
            })?;
        let catalog = Self::from_declarations(manifest.passes)?;
        tracing::debug!(
            manifest = %origin.display(),
            pass_types = catalog.len(),
            "catalog manifest loaded"
        );
        Ok(catalog)
    }

    /// Register a pass type. Each type may be declared once.
    pub fn declare(&mut self, decl: PassDecl) -> Result<(), GraphError> {
        if self.passes.contains_key(&decl.type_name) {
            return Err(GraphError::DuplicatePassType {
                type_name: decl.type_name,
            });
        }
        for (direction, ports) in [
            (PortDirection::Input, &decl.inputs),
            (PortDirection::Output, &decl.outputs),
        ] {
            let mut seen = HashSet::new();
            for port in ports {
                if !seen.insert(port.name.as_str()) {
                    return Err(GraphError::DuplicatePort {
                        type_name: decl.type_name.clone(),
                        port: port.name.clone(),
                        direction,
                    });
                }
            }
        }
        self.passes.insert(decl.type_name.clone(), decl);
        Ok(())
    }

    pub fn lookup(&self, type_name: &str) -> Option<&PassDecl> {
        self.passes.get(type_name)
    }

    /// Declared type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.passes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Create an unattached pass instance named `instance_name`.
    pub fn instantiate(
        &self,
        type_name: &str,
        instance_name: &str,
        overrides: &PassConfig,
    ) -> Result<PassInstance, GraphError> {
        let decl = self
            .lookup(type_name)
            .ok_or_else(|| GraphError::UnknownPassType {
                type_name: type_name.to_string(),
            })?;

        let mut config = decl.options.clone();
        for (option, value) in overrides.iter() {
            let default = decl
                .options
                .get(option)
                .ok_or_else(|| GraphError::UnknownConfigOption {
                    type_name: type_name.to_string(),
                    option: option.to_string(),
                })?;
            let value = value.clone().coerce_to(default).ok_or_else(|| {
                GraphError::InvalidConfigValue {
                    type_name: type_name.to_string(),
                    option: option.to_string(),
                    expected: default.kind_name(),
                    found: value.kind_name(),
                }
            })?;
            config = config.with(option, value);
        }

        Ok(PassInstance {
            name: instance_name.to_string(),
            type_name: decl.type_name.clone(),
            inputs: decl.inputs.clone(),
            outputs: decl.outputs.clone(),
            config,
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tone_mapper() -> PassDecl {
        PassDecl::new("ToneMapper")
            .input("src")
            .output("dst")
            .option("exposureCompensation", 0.0)
            .option("autoExposure", false)
            .option("operator", "Aces")
    }

    #[test]
    fn instantiate_copies_ports_and_defaults() {
        let catalog = PassCatalog::from_declarations([tone_mapper()]).unwrap();
        let pass = catalog
            .instantiate("ToneMapper", "ToneMapping", &PassConfig::new())
            .unwrap();
        assert_eq!(pass.name(), "ToneMapping");
        assert_eq!(pass.type_name(), "ToneMapper");
        assert_eq!(pass.inputs(), &[PortDecl::new("src")]);
        assert_eq!(pass.outputs(), &[PortDecl::new("dst")]);
        assert_eq!(pass.config().len(), 3);
        assert_eq!(
            pass.config().get("operator"),
            Some(&ConfigValue::Str("Aces".into()))
        );
    }

    #[test]
    fn overrides_replace_defaults() {
        let catalog = PassCatalog::from_declarations([tone_mapper()]).unwrap();
        let cfg = PassConfig::new().with("autoExposure", true);
        let pass = catalog.instantiate("ToneMapper", "T", &cfg).unwrap();
        assert_eq!(pass.config().get("autoExposure"), Some(&ConfigValue::Bool(true)));
        assert_eq!(
            pass.config().get("exposureCompensation"),
            Some(&ConfigValue::Float(0.0))
        );
    }

    #[test]
    fn int_widens_to_float() {
        let catalog = PassCatalog::from_declarations([tone_mapper()]).unwrap();
        let cfg = PassConfig::new().with("exposureCompensation", 2);
        let pass = catalog.instantiate("ToneMapper", "T", &cfg).unwrap();
        assert_eq!(
            pass.config().get("exposureCompensation"),
            Some(&ConfigValue::Float(2.0))
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let catalog = PassCatalog::new();
        let err = catalog
            .instantiate("GBufferRaster", "GBuffer", &PassConfig::new())
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownPassType { type_name } if type_name == "GBufferRaster"));
    }

    #[test]
    fn unknown_option_is_rejected_not_ignored() {
        let catalog = PassCatalog::from_declarations([tone_mapper()]).unwrap();
        let cfg = PassConfig::new().with("exposure", 1.0);
        let err = catalog.instantiate("ToneMapper", "T", &cfg).unwrap_err();
        match err {
            GraphError::UnknownConfigOption { type_name, option } => {
                assert_eq!(type_name, "ToneMapper");
                assert_eq!(option, "exposure");
            }
            other => panic!("expected UnknownConfigOption, got: {other}"),
        }
    }

    #[test]
    fn mismatched_kind_is_rejected() {
        let catalog = PassCatalog::from_declarations([tone_mapper()]).unwrap();
        let cfg = PassConfig::new().with("autoExposure", "yes");
        let err = catalog.instantiate("ToneMapper", "T", &cfg).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConfigValue { expected: "bool", found: "string", .. }
        ));
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let err = PassCatalog::from_declarations([tone_mapper(), tone_mapper()]).unwrap_err();
        assert!(matches!(err, GraphError::DuplicatePassType { type_name } if type_name == "ToneMapper"));
    }

    #[test]
    fn duplicate_port_is_rejected() {
        let decl = PassDecl::new("Broken").input("a").input("a");
        let err = PassCatalog::from_declarations([decl]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::DuplicatePort { direction: PortDirection::Input, .. }
        ));
    }

    #[test]
    fn same_name_on_both_sides_is_allowed() {
        let decl = PassDecl::new("Passthrough").input("color").output("color");
        assert!(PassCatalog::from_declarations([decl]).is_ok());
    }

    #[test]
    fn manifest_parses_ports_formats_and_options() {
        let json = r#"{
            "passes": [
                {
                    "type": "AccumulatePass",
                    "inputs": [{ "name": "input" }],
                    "outputs": [{ "name": "output", "format": "rgba32_float" }],
                    "options": { "enabled": true, "subFrameCount": 0, "precision": "Single" }
                },
                { "type": "PixelInspectorPass", "inputs": [{ "name": "linColor" }] }
            ]
        }"#;
        let catalog = PassCatalog::from_manifest_str(json, &PathBuf::from("inline.json")).unwrap();
        assert_eq!(catalog.type_names(), vec!["AccumulatePass", "PixelInspectorPass"]);
        let accum = catalog.lookup("AccumulatePass").unwrap();
        assert_eq!(accum.outputs[0].format, PortFormat::Rgba32Float);
        assert_eq!(accum.options.get("enabled"), Some(&ConfigValue::Bool(true)));
        assert_eq!(accum.options.get("subFrameCount"), Some(&ConfigValue::Int(0)));
        let inspector = catalog.lookup("PixelInspectorPass").unwrap();
        assert!(inspector.outputs.is_empty());
        assert!(inspector.options.is_empty());
    }

    #[test]
    fn manifest_json_errors_carry_origin() {
        let err = PassCatalog::from_manifest_str("{ \"passes\": 3 }", &PathBuf::from("bad.json"))
            .unwrap_err();
        assert!(matches!(err, GraphError::ManifestJson { ref path, .. } if path == &PathBuf::from("bad.json")));
        assert!(err.is_input_error());
    }

    #[test]
    fn missing_manifest_is_io_error() {
        let path = std::env::temp_dir().join("rgc_no_such_manifest.json");
        let err = PassCatalog::load_manifest(&path).unwrap_err();
        assert!(matches!(err, GraphError::ManifestIo { .. }));
    }

    #[test]
    fn format_compatibility() {
        assert!(PortFormat::Any.is_compatible(PortFormat::Rgba16Float));
        assert!(PortFormat::Rgba32Float.is_compatible(PortFormat::Rgba32Float));
        assert!(!PortFormat::Rgba16Float.is_compatible(PortFormat::Rgba32Float));
    }
}
