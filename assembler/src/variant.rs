// variant.rs — Variant selection and filter-stage dispatch
//
// A `VariantSelection` picks one of three filter kinds, one of two filter
// orders, and whether debug instrumentation is attached: twelve
// topologies. Everything filter-specific (pass type, instance name, colour
// ports, guide inputs, config overrides) comes from one `FilterKind::stage`
// match, so the assembler never branches on the kind itself and can wire
// at most one filter per graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::PassConfig;
use crate::passes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Plain frame accumulation.
    Accumulation,
    /// Temporal multi-frame filter (SVGF).
    TemporalFilter,
    /// External denoiser (OptiX).
    DenoiserFilter,
}

impl FilterKind {
    pub const ALL: [FilterKind; 3] = [
        FilterKind::Accumulation,
        FilterKind::TemporalFilter,
        FilterKind::DenoiserFilter,
    ];

    /// Short label used in graph names.
    pub fn label(self) -> &'static str {
        match self {
            FilterKind::Accumulation => "Accum",
            FilterKind::TemporalFilter => "Temporal",
            FilterKind::DenoiserFilter => "Denoiser",
        }
    }

    /// Everything the assembler needs to wire this filter.
    pub fn stage(self) -> FilterStage {
        match self {
            FilterKind::Accumulation => FilterStage {
                kind: self,
                pass_type: passes::ACCUMULATE_PASS,
                instance: "Accumulation",
                color_in: "input",
                color_out: "output",
                source_guides: &[],
                gbuffer_guides: &[],
            },
            FilterKind::TemporalFilter => FilterStage {
                kind: self,
                pass_type: passes::SVGF_PASS,
                instance: "TemporalFilter",
                color_in: "Color",
                color_out: "Filtered image",
                source_guides: &[("albedo", "Albedo")],
                gbuffer_guides: &[
                    ("emissive", "Emission"),
                    ("posW", "WorldPosition"),
                    ("normW", "WorldNormal"),
                    ("pnFwidth", "PositionNormalFwidth"),
                    ("linearZ", "LinearZ"),
                    ("mvec", "MotionVec"),
                ],
            },
            FilterKind::DenoiserFilter => FilterStage {
                kind: self,
                pass_type: passes::OPTIX_DENOISER,
                instance: "Denoiser",
                color_in: "color",
                color_out: "output",
                source_guides: &[],
                gbuffer_guides: &[
                    ("diffuseOpacity", "albedo"),
                    ("normW", "normal"),
                    ("mvec", "mvec"),
                ],
            },
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the filter sits relative to tone mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOrder {
    /// source → filter → tone mapping
    Pre,
    /// source → tone mapping → filter ("late" filtering)
    Post,
}

impl FilterOrder {
    pub const ALL: [FilterOrder; 2] = [FilterOrder::Pre, FilterOrder::Post];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantSelection {
    pub filter: FilterKind,
    pub order: FilterOrder,
    pub debug: bool,
}

impl VariantSelection {
    pub fn new(filter: FilterKind, order: FilterOrder, debug: bool) -> Self {
        VariantSelection {
            filter,
            order,
            debug,
        }
    }

    /// All twelve selections: filter kind, then order, then debug off/on.
    pub fn all() -> Vec<VariantSelection> {
        let mut out = Vec::with_capacity(12);
        for filter in FilterKind::ALL {
            for order in FilterOrder::ALL {
                for debug in [false, true] {
                    out.push(VariantSelection::new(filter, order, debug));
                }
            }
        }
        out
    }

    /// `[Late Temporal] [Debug]`-style suffix shared by graph names.
    pub fn tag(&self) -> String {
        let late = match self.order {
            FilterOrder::Pre => "",
            FilterOrder::Post => "Late ",
        };
        let debug = if self.debug { " [Debug]" } else { "" };
        format!("[{late}{}]{debug}", self.filter.label())
    }
}

impl fmt::Display for VariantSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Wiring recipe for one filter kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterStage {
    pub kind: FilterKind,
    pub pass_type: &'static str,
    /// Pass name inside the graph.
    pub instance: &'static str,
    pub color_in: &'static str,
    pub color_out: &'static str,
    /// `(source output, filter input)` pairs fed by the shading pass.
    pub source_guides: &'static [(&'static str, &'static str)],
    /// `(G-buffer output, filter input)` pairs.
    pub gbuffer_guides: &'static [(&'static str, &'static str)],
}

impl FilterStage {
    /// Config overrides applied on top of the catalog defaults.
    pub fn config(&self) -> PassConfig {
        match self.kind {
            FilterKind::Accumulation => PassConfig::new(),
            FilterKind::TemporalFilter => PassConfig::new()
                .with("Iterations", 4)
                .with("FeedbackTap", 2)
                .with("PhiColor", 1.0)
                .with("PhiNormal", 128.0)
                .with("Alpha", 0.3)
                .with("MomentsAlpha", 0.2),
            FilterKind::DenoiserFilter => PassConfig::new().with("enabled", true),
        }
    }

    pub fn input(&self) -> String {
        format!("{}.{}", self.instance, self.color_in)
    }

    pub fn output(&self) -> String {
        format!("{}.{}", self.instance, self.color_out)
    }
}
