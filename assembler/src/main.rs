use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rgc::catalog::PassCatalog;
use rgc::diag::Diagnostic;
use rgc::error::GraphError;
use rgc::graph::RenderGraph;
use rgc::host::{publish, Publication};
use rgc::variant::{FilterKind, FilterOrder, VariantSelection};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FilterArg {
    Accumulation,
    Temporal,
    Denoiser,
}

impl From<FilterArg> for FilterKind {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Accumulation => FilterKind::Accumulation,
            FilterArg::Temporal => FilterKind::TemporalFilter,
            FilterArg::Denoiser => FilterKind::DenoiserFilter,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OrderArg {
    Pre,
    Post,
}

impl From<OrderArg> for FilterOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Pre => FilterOrder::Pre,
            OrderArg::Post => FilterOrder::Post,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum GraphArg {
    Caustics,
    PathTracing,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum EmitStage {
    Summary,
    Dot,
    Json,
    Outputs,
    Fingerprint,
}

#[derive(Parser, Debug)]
#[command(
    name = "rgc",
    version,
    about = "Render Graph Constructor — assembles and validates screen-space caustics render graphs"
)]
struct Cli {
    /// Graph family to assemble
    #[arg(long, value_enum, default_value_t = GraphArg::Caustics)]
    graph: GraphArg,

    /// Denoising filter
    #[arg(long, value_enum, default_value_t = FilterArg::Accumulation)]
    filter: FilterArg,

    /// Filter position relative to tone mapping
    #[arg(long, value_enum, default_value_t = OrderArg::Pre)]
    order: OrderArg,

    /// Attach the reference pipeline and debug probes (caustics only)
    #[arg(long)]
    debug: bool,

    /// Build the default start-up graph set instead of a single graph
    #[arg(long, conflicts_with_all = ["graph", "filter", "order", "debug"])]
    preset: bool,

    /// Pass catalog manifest (JSON); defaults to the built-in passes
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Output stage
    #[arg(long, value_enum, default_value_t = EmitStage::Summary)]
    emit: EmitStage,

    /// Log assembly steps to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // ── Load pass catalog ──
    let catalog = match load_catalog(cli.catalog.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("rgc: error: {e:#}");
            std::process::exit(2);
        }
    };

    // ── Assemble ──
    let graphs = match build_graphs(&cli, &catalog) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("rgc: {}", Diagnostic::from(&e));
            std::process::exit(if e.is_input_error() { 2 } else { 1 });
        }
    };

    for graph in &graphs {
        for diag in rgc::validate::lint(graph) {
            eprintln!("rgc: {diag}");
        }
    }

    // No host process here: graphs are emitted, never registered.
    let graphs = match publish(graphs, None) {
        Ok(Publication::BuildOnly(graphs)) => graphs,
        Ok(Publication::Registered { count }) => {
            eprintln!("rgc: {count} graphs registered");
            return;
        }
        Err(e) => {
            eprintln!("rgc: error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = emit(&graphs, cli.emit, cli.preset) {
        eprintln!("rgc: error: {e:#}");
        std::process::exit(2);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<PassCatalog> {
    match path {
        Some(path) => PassCatalog::load_manifest(path)
            .with_context(|| format!("loading pass catalog {}", path.display())),
        None => rgc::passes::standard_catalog().context("declaring built-in passes"),
    }
}

fn build_graphs(cli: &Cli, catalog: &PassCatalog) -> Result<Vec<RenderGraph>, GraphError> {
    if cli.preset {
        return rgc::assemble::default_graph_set(catalog);
    }
    let graph = match cli.graph {
        GraphArg::Caustics => rgc::assemble::build_caustics_graph(
            catalog,
            VariantSelection::new(cli.filter.into(), cli.order.into(), cli.debug),
        )?,
        GraphArg::PathTracing => {
            if cli.debug {
                tracing::warn!("--debug has no effect on the path tracing graph");
            }
            rgc::assemble::build_path_tracing_graph(catalog, cli.filter.into(), cli.order.into())?
        }
    };
    Ok(vec![graph])
}

fn emit(graphs: &[RenderGraph], stage: EmitStage, many: bool) -> anyhow::Result<()> {
    match stage {
        EmitStage::Summary => {
            for graph in graphs {
                print!("{graph}");
            }
        }
        EmitStage::Dot => {
            for graph in graphs {
                print!("{}", rgc::dot::Dot(graph));
            }
        }
        EmitStage::Json => {
            let json = match graphs {
                [single] if !many => single.to_json_pretty(),
                _ => serde_json::to_string_pretty(graphs),
            };
            println!("{}", json.context("serializing graph")?);
        }
        EmitStage::Outputs => {
            for graph in graphs {
                if many {
                    println!("# {}", graph.name());
                }
                for output in graph.outputs() {
                    println!("{output}");
                }
            }
        }
        EmitStage::Fingerprint => {
            for graph in graphs {
                let hex = graph.fingerprint_hex().context("serializing graph")?;
                println!("{hex}  {}", graph.name());
            }
        }
    }
    Ok(())
}
