// host.rs — Hand-off of validated graphs to a renderer host
//
// The host is always passed in explicitly. Having no host is a distinct
// outcome (`Publication::BuildOnly`) that returns the graphs to the caller
// instead of dropping them.

use thiserror::Error;
use tracing::{info, warn};

use crate::graph::RenderGraph;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host rejected graph '{name}': {reason}")]
    Rejected { name: String, reason: String },
}

/// Anything that can take ownership of validated graphs.
pub trait GraphHost {
    fn add_graph(&mut self, graph: RenderGraph) -> Result<(), HostError>;
}

/// Collecting host, useful for tests and for emitting graphs later.
impl GraphHost for Vec<RenderGraph> {
    fn add_graph(&mut self, graph: RenderGraph) -> Result<(), HostError> {
        self.push(graph);
        Ok(())
    }
}

#[derive(Debug)]
pub enum Publication {
    /// Every graph was accepted by the host.
    Registered { count: usize },
    /// No host was supplied; the graphs are handed back unregistered.
    BuildOnly(Vec<RenderGraph>),
}

/// Register `graphs` with `host` in order, stopping at the first rejection.
pub fn publish(
    graphs: Vec<RenderGraph>,
    host: Option<&mut dyn GraphHost>,
) -> Result<Publication, HostError> {
    let Some(host) = host else {
        info!(graphs = graphs.len(), "no host attached; build-only");
        return Ok(Publication::BuildOnly(graphs));
    };
    let count = graphs.len();
    for graph in graphs {
        let name = graph.name().to_string();
        if let Err(e) = host.add_graph(graph) {
            warn!(graph = %name, error = %e, "graph registration failed");
            return Err(e);
        }
        info!(graph = %name, "graph registered");
    }
    Ok(Publication::Registered { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::default_graph_set;
    use crate::passes::standard_catalog;

    struct PickyHost {
        accepted: Vec<String>,
    }

    impl GraphHost for PickyHost {
        fn add_graph(&mut self, graph: RenderGraph) -> Result<(), HostError> {
            if graph.name().contains("[Debug]") {
                return Err(HostError::Rejected {
                    name: graph.name().to_string(),
                    reason: "debug graphs disabled".into(),
                });
            }
            self.accepted.push(graph.name().to_string());
            Ok(())
        }
    }

    #[test]
    fn no_host_is_build_only() {
        let graphs = default_graph_set(&standard_catalog().unwrap()).unwrap();
        match publish(graphs, None).unwrap() {
            Publication::BuildOnly(graphs) => assert_eq!(graphs.len(), 4),
            other => panic!("expected BuildOnly, got {other:?}"),
        }
    }

    #[test]
    fn vec_host_registers_everything() {
        let graphs = default_graph_set(&standard_catalog().unwrap()).unwrap();
        let mut host: Vec<RenderGraph> = Vec::new();
        let result = publish(graphs, Some(&mut host)).unwrap();
        assert!(matches!(result, Publication::Registered { count: 4 }));
        assert_eq!(host.len(), 4);
    }

    #[test]
    fn rejection_surfaces_and_stops() {
        let graphs = default_graph_set(&standard_catalog().unwrap()).unwrap();
        let mut host = PickyHost { accepted: Vec::new() };
        let err = publish(graphs, Some(&mut host)).unwrap_err();
        assert!(err.to_string().contains("debug graphs disabled"));
        assert_eq!(host.accepted.len(), 3);
    }
}
