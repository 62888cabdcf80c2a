// passes.rs — Built-in pass declarations
//
// The twelve pass types the caustics renderer links against, with their
// port lists and configuration schemas. Stands in for the external pass
// loader: a JSON manifest (`PassCatalog::load_manifest`) can replace it.
//
// Preconditions: none.
// Postconditions: returned catalog declares every type in `BUILTIN_TYPES`.
// Failure modes: none in practice; duplicate declarations would surface as
//   `GraphError::DuplicatePassType`.
// Side effects: none.

use crate::catalog::{PassCatalog, PassDecl, PortFormat};
use crate::error::GraphError;

pub const GBUFFER_RASTER: &str = "GBufferRaster";
pub const SCREEN_SPACE_CAUSTICS: &str = "ScreenSpaceCaustics";
pub const MEGAKERNEL_PATH_TRACER: &str = "MegakernelPathTracer";
pub const ACCUMULATE_PASS: &str = "AccumulatePass";
pub const SVGF_PASS: &str = "SVGFPass";
pub const OPTIX_DENOISER: &str = "OptixDenoiser";
pub const TONE_MAPPER: &str = "ToneMapper";
pub const COLOR_MAP_PASS: &str = "ColorMapPass";
pub const INVALID_PIXEL_DETECTION: &str = "InvalidPixelDetectionPass";
pub const PIXEL_INSPECTOR: &str = "PixelInspectorPass";
pub const ERROR_MEASURE: &str = "ErrorMeasurePass";
pub const SPLIT_SCREEN: &str = "SplitScreenPass";

pub const BUILTIN_TYPES: [&str; 12] = [
    GBUFFER_RASTER,
    SCREEN_SPACE_CAUSTICS,
    MEGAKERNEL_PATH_TRACER,
    ACCUMULATE_PASS,
    SVGF_PASS,
    OPTIX_DENOISER,
    TONE_MAPPER,
    COLOR_MAP_PASS,
    INVALID_PIXEL_DETECTION,
    PIXEL_INSPECTOR,
    ERROR_MEASURE,
    SPLIT_SCREEN,
];

/// Shading inputs shared by every pass that consumes the G-buffer
/// (caustics and the megakernel path tracer).
const SHADING_INPUTS: [&str; 10] = [
    "vbuffer",
    "posW",
    "normalW",
    "tangentW",
    "faceNormalW",
    "viewW",
    "mtlDiffOpacity",
    "mtlSpecRough",
    "mtlEmissive",
    "mtlParams",
];

/// Build the catalog of built-in pass types.
pub fn standard_catalog() -> Result<PassCatalog, GraphError> {
    let catalog = PassCatalog::from_declarations(standard_declarations())?;
    tracing::debug!(pass_types = catalog.len(), "built-in catalog declared");
    Ok(catalog)
}

/// The built-in declarations, in `BUILTIN_TYPES` order.
pub fn standard_declarations() -> Vec<PassDecl> {
    vec![
        gbuffer_raster(),
        screen_space_caustics(),
        megakernel_path_tracer(),
        accumulate_pass(),
        svgf_pass(),
        optix_denoiser(),
        tone_mapper(),
        color_map_pass(),
        invalid_pixel_detection(),
        pixel_inspector(),
        error_measure(),
        split_screen(),
    ]
}

fn gbuffer_raster() -> PassDecl {
    let mut decl = PassDecl::new(GBUFFER_RASTER);
    for port in [
        "posW",
        "normW",
        "tangentW",
        "faceNormalW",
        "texC",
        "diffuseOpacity",
        "specRough",
        "emissive",
        "matlExtra",
        "pnFwidth",
        "viewW",
    ] {
        decl = decl.output_as(port, PortFormat::Rgba32Float);
    }
    decl.output_as("vbuffer", PortFormat::Rgba32Float)
        .output_as("mvec", PortFormat::Rgba32Float)
        .output_as("linearZ", PortFormat::Rgba32Float)
        .option("forceCullMode", false)
        .option("cull", "Back")
        .option("samplePattern", "Center")
        .option("sampleCount", 16)
        .option("useAlphaTest", true)
}

fn shading_pass(type_name: &str) -> PassDecl {
    SHADING_INPUTS
        .iter()
        .fold(PassDecl::new(type_name), |decl, port| decl.input(port))
}

fn screen_space_caustics() -> PassDecl {
    shading_pass(SCREEN_SPACE_CAUSTICS)
        .output_as("color", PortFormat::Rgba32Float)
        .output_as("albedo", PortFormat::Rgba32Float)
        .output_as("count", PortFormat::R32Uint)
        .output_as("time", PortFormat::R32Uint)
        .output_as("traversedAABBCount", PortFormat::R32Uint)
        .output_as("searchRadius", PortFormat::R32Float)
        .output_as("debug_visualisation", PortFormat::Rgba32Float)
        .output_as("paths", PortFormat::Rgba32Float)
        .option("maxBounces", 4)
        .option("searchRadius", 0.01)
        .option("maxSearchRadius", 0.1)
        .option("reuseAlpha", 0.9)
        .option("lightPathCount", 65536)
        .option("useCache", false)
        .option("usePhotonsForAll", false)
        .option("ignoreProjectionVolume", false)
        .option("disableTemporalReuse", false)
        .option("separateAABBStorage", false)
        .option("lateBSDFApplication", false)
        .option("cacheAllowRefit", true)
        .option("cacheUseTiling", false)
}

fn megakernel_path_tracer() -> PassDecl {
    shading_pass(MEGAKERNEL_PATH_TRACER)
        .output_as("color", PortFormat::Rgba32Float)
        .output_as("albedo", PortFormat::Rgba32Float)
        .output_as("time", PortFormat::R32Uint)
        .option("maxBounces", 3)
        .option("maxNonSpecularBounces", 3)
        .option("useVBuffer", true)
        .option("matchKim19", false)
}

fn accumulate_pass() -> PassDecl {
    PassDecl::new(ACCUMULATE_PASS)
        .input("input")
        .output_as("output", PortFormat::Rgba32Float)
        .option("enabled", true)
        .option("autoReset", true)
        .option("precision", "Single")
        .option("subFrameCount", 0)
}

fn svgf_pass() -> PassDecl {
    PassDecl::new(SVGF_PASS)
        .input("Albedo")
        .input("Color")
        .input("Emission")
        .input("WorldPosition")
        .input("WorldNormal")
        .input("PositionNormalFwidth")
        .input("LinearZ")
        .input("MotionVec")
        .output_as("Filtered image", PortFormat::Rgba16Float)
        .option("Enabled", true)
        .option("Iterations", 4)
        .option("FeedbackTap", 1)
        .option("VarianceEpsilon", 1.0e-4)
        .option("PhiColor", 10.0)
        .option("PhiNormal", 128.0)
        .option("Alpha", 0.05)
        .option("MomentsAlpha", 0.2)
}

fn optix_denoiser() -> PassDecl {
    PassDecl::new(OPTIX_DENOISER)
        .input("color")
        .input("albedo")
        .input("normal")
        .input("mvec")
        .output_as("output", PortFormat::Rgba32Float)
        .option("enabled", false)
        .option("blend", 0.0)
        .option("denoiseAlpha", false)
}

fn tone_mapper() -> PassDecl {
    PassDecl::new(TONE_MAPPER)
        .input("src")
        .output_as("dst", PortFormat::Rgba32Float)
        .option("exposureCompensation", 0.0)
        .option("autoExposure", false)
        .option("exposureValue", 0.0)
        .option("filmSpeed", 100.0)
        .option("whiteBalance", false)
        .option("whitePoint", 6500.0)
        .option("operator", "Aces")
        .option("clamp", true)
}

fn color_map_pass() -> PassDecl {
    PassDecl::new(COLOR_MAP_PASS)
        .input("input")
        .output_as("output", PortFormat::Rgba32Float)
        .option("colorMap", "Jet")
        .option("channel", 0)
        .option("autoRange", true)
        .option("minValue", 0.0)
        .option("maxValue", 1.0)
}

fn invalid_pixel_detection() -> PassDecl {
    PassDecl::new(INVALID_PIXEL_DETECTION)
        .input("src")
        .output_as("dst", PortFormat::Rgba32Float)
}

/// `albedo`, `count`, `searchRadius` and `time` are tap inputs: they exist
/// so a bare `Caustics -> PixelInspector` edge picks up those outputs by name.
fn pixel_inspector() -> PassDecl {
    let mut decl = PassDecl::new(PIXEL_INSPECTOR);
    for port in [
        "posW",
        "normW",
        "faceNormalW",
        "texC",
        "diffuseOpacity",
        "specRough",
        "emissive",
        "matlExtra",
        "visBuffer",
    ] {
        decl = decl.input(port);
    }
    decl.input_as("linColor", PortFormat::Rgba32Float)
        .input("outColor")
        .input("albedo")
        .input("count")
        .input("searchRadius")
        .input("time")
}

fn error_measure() -> PassDecl {
    PassDecl::new(ERROR_MEASURE)
        .input("Source")
        .input("Reference")
        .input("WorldPosition")
        .output_as("Output", PortFormat::Rgba32Float)
        .option("selectedOutputId", 0)
        .option("ignoreBackground", true)
        .option("computeSquaredDifference", true)
        .option("useLoadedReference", false)
}

fn split_screen() -> PassDecl {
    PassDecl::new(SPLIT_SCREEN)
        .input("leftInput")
        .input("rightInput")
        .output_as("output", PortFormat::Rgba32Float)
        .option("splitLocation", 0.5)
        .option("showTextLabels", false)
        .option("leftLabel", "Left side")
        .option("rightLabel", "Right side")
}
