// assemble.rs — Variant-driven graph assembly
//
// One construction routine per graph family. The filter is wired through
// `FilterKind::stage()` and the order through a single `FilterOrder` match,
// so each build contains exactly one filter pass and one tone-mapping
// position. Debug instrumentation is attached after the primary pipeline
// is complete and only adds passes, edges, and outputs.
//
// Preconditions: `catalog` declares the built-in pass types (see `passes`).
// Postconditions: every returned graph has passed `validate`.
// Failure modes: any `GraphError`; with the built-in catalog none occur.
// Side effects: `debug!`/`info!` events from the builder and validator.

use tracing::debug;

use crate::builder::GraphBuilder;
use crate::catalog::{PassCatalog, PassConfig, PortDirection, PortFormat};
use crate::error::GraphError;
use crate::graph::RenderGraph;
use crate::passes;
use crate::variant::{FilterKind, FilterOrder, FilterStage, VariantSelection};

pub const GBUFFER: &str = "GBuffer";
pub const CAUSTICS: &str = "Caustics";
pub const PATH_TRACER: &str = "PathTracer";
pub const TONE_MAPPING: &str = "ToneMapping";

/// Passes attached by debug instrumentation, in insertion order.
pub const DEBUG_PASSES: [&str; 12] = [
    "ReferencePathTracer",
    "ReferenceAccumulation",
    "ReferenceToneMapping",
    "PhotonCountMap",
    "TraversalCountMap",
    "SearchRadiusMap",
    "InvalidPixelDetection",
    "PixelInspector",
    "ReferencePixelInspector",
    "ErrorMeasure",
    "SplitScreen",
    "ErrorToneMapping",
];

/// G-buffer output → shading-pass input.
const SHADING_EDGES: [(&str, &str); 10] = [
    ("vbuffer", "vbuffer"),
    ("posW", "posW"),
    ("normW", "normalW"),
    ("tangentW", "tangentW"),
    ("faceNormalW", "faceNormalW"),
    ("viewW", "viewW"),
    ("diffuseOpacity", "mtlDiffOpacity"),
    ("specRough", "mtlSpecRough"),
    ("emissive", "mtlEmissive"),
    ("matlExtra", "mtlParams"),
];

/// G-buffer output → pixel inspector input.
const INSPECTOR_TAPS: [(&str, &str); 9] = [
    ("posW", "posW"),
    ("normW", "normW"),
    ("faceNormalW", "faceNormalW"),
    ("texC", "texC"),
    ("diffuseOpacity", "diffuseOpacity"),
    ("specRough", "specRough"),
    ("emissive", "emissive"),
    ("matlExtra", "matlExtra"),
    ("vbuffer", "visBuffer"),
];

/// Caustics output → colour-map pass visualising it.
const COLOR_MAPS: [(&str, &str); 3] = [
    ("count", "PhotonCountMap"),
    ("traversedAABBCount", "TraversalCountMap"),
    ("searchRadius", "SearchRadiusMap"),
];

/// Ports of the filter / tone-mapping chain, resolved for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPorts {
    /// Last image of the chain.
    pub final_output: String,
    /// Image between the first and second stage of the chain.
    pub intermediate: String,
    /// Output of the filter pass.
    pub filtered: String,
    /// Output of the tone mapper.
    pub tone_mapped: String,
}

/// Assemble the screen-space caustics graph for `selection`.
pub fn build_caustics_graph(
    catalog: &PassCatalog,
    selection: VariantSelection,
) -> Result<RenderGraph, GraphError> {
    debug!(selection = %selection, "assembling caustics graph");
    let stage = selection.filter.stage();
    let mut b = GraphBuilder::new(format!("Screen-space caustics {}", selection.tag()))
        .with_selection(selection);

    add(&mut b, catalog, passes::GBUFFER_RASTER, GBUFFER, gbuffer_config())?;
    add(&mut b, catalog, passes::SCREEN_SPACE_CAUSTICS, CAUSTICS, caustics_config())?;
    add(&mut b, catalog, stage.pass_type, stage.instance, stage.config())?;
    add(&mut b, catalog, passes::TONE_MAPPER, TONE_MAPPING, PassConfig::new())?;

    wire_shading_inputs(&mut b, CAUSTICS)?;
    let chain = wire_filter_chain(&mut b, CAUSTICS, &stage, selection.order)?;
    b.mark_output(&chain.final_output)?;

    if selection.debug {
        attach_debug(&mut b, catalog, &stage, &chain)?;
    }

    b.validate()
}

/// Same as `build_caustics_graph`.
pub fn build(catalog: &PassCatalog, selection: VariantSelection) -> Result<RenderGraph, GraphError> {
    build_caustics_graph(catalog, selection)
}

/// Assemble the plain path-tracing graph: G-buffer, megakernel path
/// tracer, then the filter / tone-mapping chain.
pub fn build_path_tracing_graph(
    catalog: &PassCatalog,
    filter: FilterKind,
    order: FilterOrder,
) -> Result<RenderGraph, GraphError> {
    let selection = VariantSelection::new(filter, order, false);
    debug!(selection = %selection, "assembling path tracing graph");
    let stage = filter.stage();
    let mut b = GraphBuilder::new(format!("Path tracing {}", selection.tag()))
        .with_selection(selection);

    add(&mut b, catalog, passes::GBUFFER_RASTER, GBUFFER, gbuffer_config())?;
    add(&mut b, catalog, passes::MEGAKERNEL_PATH_TRACER, PATH_TRACER, path_tracer_config())?;
    add(&mut b, catalog, stage.pass_type, stage.instance, stage.config())?;
    add(&mut b, catalog, passes::TONE_MAPPER, TONE_MAPPING, PassConfig::new())?;

    wire_shading_inputs(&mut b, PATH_TRACER)?;
    let chain = wire_filter_chain(&mut b, PATH_TRACER, &stage, order)?;
    b.mark_output(&chain.final_output)?;
    b.mark_output(&format!("{PATH_TRACER}.color"))?;
    b.mark_output(&chain.intermediate)?;

    b.validate()
}

/// The graphs registered with the host at start-up.
pub fn default_graph_set(catalog: &PassCatalog) -> Result<Vec<RenderGraph>, GraphError> {
    Ok(vec![
        build_caustics_graph(
            catalog,
            VariantSelection::new(FilterKind::TemporalFilter, FilterOrder::Post, false),
        )?,
        build_caustics_graph(
            catalog,
            VariantSelection::new(FilterKind::Accumulation, FilterOrder::Pre, false),
        )?,
        build_path_tracing_graph(catalog, FilterKind::Accumulation, FilterOrder::Pre)?,
        build_caustics_graph(
            catalog,
            VariantSelection::new(FilterKind::Accumulation, FilterOrder::Pre, true),
        )?,
    ])
}

// ── Shared wiring ───────────────────────────────────────────────────────────

fn add(
    b: &mut GraphBuilder,
    catalog: &PassCatalog,
    type_name: &str,
    name: &str,
    config: PassConfig,
) -> Result<(), GraphError> {
    b.add_pass(catalog.instantiate(type_name, name, &config)?)
}

fn edge(b: &mut GraphBuilder, src: &str, dst: &str) -> Result<(), GraphError> {
    b.add_edge(src, dst).map(|_| ())
}

fn wire_shading_inputs(b: &mut GraphBuilder, shader: &str) -> Result<(), GraphError> {
    for (out, inp) in SHADING_EDGES {
        edge(b, &format!("{GBUFFER}.{out}"), &format!("{shader}.{inp}"))?;
    }
    Ok(())
}

/// Wire `source.color` through the filter and the tone mapper in `order`,
/// plus the filter's guide inputs.
pub fn wire_filter_chain(
    b: &mut GraphBuilder,
    source: &str,
    stage: &FilterStage,
    order: FilterOrder,
) -> Result<ChainPorts, GraphError> {
    for (out, inp) in stage.source_guides {
        edge(b, &format!("{source}.{out}"), &format!("{}.{inp}", stage.instance))?;
    }
    for (out, inp) in stage.gbuffer_guides {
        edge(b, &format!("{GBUFFER}.{out}"), &format!("{}.{inp}", stage.instance))?;
    }

    let color = format!("{source}.color");
    let tm_src = format!("{TONE_MAPPING}.src");
    let tm_dst = format!("{TONE_MAPPING}.dst");
    let (first_out, final_output) = match order {
        FilterOrder::Pre => {
            edge(b, &color, &stage.input())?;
            edge(b, &stage.output(), &tm_src)?;
            (stage.output(), tm_dst.clone())
        }
        FilterOrder::Post => {
            edge(b, &color, &tm_src)?;
            edge(b, &tm_dst, &stage.input())?;
            (tm_dst.clone(), stage.output())
        }
    };

    Ok(ChainPorts {
        final_output,
        intermediate: first_out,
        filtered: stage.output(),
        tone_mapped: tm_dst,
    })
}

// ── Debug instrumentation ───────────────────────────────────────────────────

fn attach_debug(
    b: &mut GraphBuilder,
    catalog: &PassCatalog,
    stage: &FilterStage,
    chain: &ChainPorts,
) -> Result<(), GraphError> {
    debug!(filter = %stage.kind, "attaching debug instrumentation");

    // Reference pipeline
    add(b, catalog, passes::MEGAKERNEL_PATH_TRACER, "ReferencePathTracer", path_tracer_config())?;
    add(b, catalog, passes::ACCUMULATE_PASS, "ReferenceAccumulation", PassConfig::new())?;
    add(b, catalog, passes::TONE_MAPPER, "ReferenceToneMapping", PassConfig::new())?;

    // Probes and comparison
    for (_, map) in COLOR_MAPS {
        add(b, catalog, passes::COLOR_MAP_PASS, map, PassConfig::new())?;
    }
    add(b, catalog, passes::INVALID_PIXEL_DETECTION, "InvalidPixelDetection", PassConfig::new())?;
    add(b, catalog, passes::PIXEL_INSPECTOR, "PixelInspector", PassConfig::new())?;
    add(b, catalog, passes::PIXEL_INSPECTOR, "ReferencePixelInspector", PassConfig::new())?;
    add(b, catalog, passes::ERROR_MEASURE, "ErrorMeasure", error_measure_config())?;
    add(b, catalog, passes::SPLIT_SCREEN, "SplitScreen", split_screen_config())?;
    add(b, catalog, passes::TONE_MAPPER, "ErrorToneMapping", PassConfig::new())?;

    wire_shading_inputs(b, "ReferencePathTracer")?;
    edge(b, "ReferencePathTracer.color", "ReferenceAccumulation.input")?;
    edge(b, "ReferenceAccumulation.output", "ReferenceToneMapping.src")?;

    edge(b, &chain.filtered, "ErrorMeasure.Source")?;
    edge(b, "ReferenceAccumulation.output", "ErrorMeasure.Reference")?;
    edge(b, &format!("{GBUFFER}.posW"), "ErrorMeasure.WorldPosition")?;
    edge(b, "ErrorMeasure.Output", "ErrorToneMapping.src")?;

    edge(b, &chain.tone_mapped, "SplitScreen.leftInput")?;
    edge(b, "ReferenceToneMapping.dst", "SplitScreen.rightInput")?;

    edge(b, &format!("{CAUSTICS}.color"), "InvalidPixelDetection.src")?;

    edge(b, CAUSTICS, "PixelInspector")?;
    wire_inspector_taps(b, "PixelInspector")?;
    if format_matches(b, &chain.filtered, "PixelInspector.linColor") {
        edge(b, &chain.filtered, "PixelInspector.linColor")?;
    } else {
        debug!(port = %chain.filtered, "linColor probe skipped: format mismatch");
    }
    edge(b, &chain.tone_mapped, "PixelInspector.outColor")?;

    for (out, map) in COLOR_MAPS {
        edge(b, &format!("{CAUSTICS}.{out}"), &format!("{map}.input"))?;
    }

    edge(b, "ReferencePathTracer", "ReferencePixelInspector")?;
    wire_inspector_taps(b, "ReferencePixelInspector")?;
    edge(b, "ReferenceAccumulation.output", "ReferencePixelInspector.linColor")?;
    edge(b, "ReferenceToneMapping.dst", "ReferencePixelInspector.outColor")?;

    b.mark_output("ErrorToneMapping.dst")?;
    b.mark_output("SplitScreen.output")?;
    b.mark_output(&format!("{CAUSTICS}.color"))?;
    b.mark_output(&chain.intermediate)?;
    b.mark_output(&format!("{CAUSTICS}.debug_visualisation"))?;
    b.mark_output(&format!("{CAUSTICS}.paths"))?;
    for (_, map) in COLOR_MAPS {
        b.mark_output(&format!("{map}.output"))?;
    }
    Ok(())
}

fn wire_inspector_taps(b: &mut GraphBuilder, inspector: &str) -> Result<(), GraphError> {
    for (out, inp) in INSPECTOR_TAPS {
        edge(b, &format!("{GBUFFER}.{out}"), &format!("{inspector}.{inp}"))?;
    }
    Ok(())
}

/// True when the declared formats of `src` (output) and `dst` (input) are
/// compatible. Unresolvable references count as a mismatch.
fn format_matches(b: &GraphBuilder, src: &str, dst: &str) -> bool {
    let format_of = |reference: &str, direction: PortDirection| -> Option<PortFormat> {
        let (node, port) = reference.split_once('.')?;
        b.pass(node)?.port(direction, port).map(|p| p.format)
    };
    match (
        format_of(src, PortDirection::Output),
        format_of(dst, PortDirection::Input),
    ) {
        (Some(out), Some(inp)) => out.is_compatible(inp),
        _ => false,
    }
}

// ── Pass configuration ──────────────────────────────────────────────────────

/// Path length 6, minus the light hop and the G-buffer's primary hit.
const MAX_PATH_TRACER_BOUNCES: i64 = 4;

fn gbuffer_config() -> PassConfig {
    PassConfig::new()
        .with("forceCullMode", true)
        .with("cull", "None")
        .with("samplePattern", "Center")
        .with("sampleCount", 16)
}

fn caustics_config() -> PassConfig {
    PassConfig::new()
        .with("maxBounces", MAX_PATH_TRACER_BOUNCES)
        .with("searchRadius", 0.001)
        .with("lightPathCount", 1024 * 1024)
        .with("useCache", true)
        .with("ignoreProjectionVolume", true)
        .with("usePhotonsForAll", false)
        .with("disableTemporalReuse", false)
        .with("separateAABBStorage", true)
        .with("lateBSDFApplication", false)
        .with("cacheAllowRefit", false)
        .with("cacheUseTiling", true)
}

fn path_tracer_config() -> PassConfig {
    PassConfig::new()
        .with("maxBounces", MAX_PATH_TRACER_BOUNCES)
        .with("maxNonSpecularBounces", MAX_PATH_TRACER_BOUNCES)
        .with("useVBuffer", false)
        .with("matchKim19", false)
}

fn error_measure_config() -> PassConfig {
    PassConfig::new().with("selectedOutputId", 0)
}

fn split_screen_config() -> PassConfig {
    PassConfig::new()
        .with("showTextLabels", true)
        .with("leftLabel", "Screen-space caustics")
        .with("rightLabel", "Path tracer")
}
