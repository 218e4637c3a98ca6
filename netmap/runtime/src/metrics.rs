use netmap_core::NetworkGraph;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, gauge::Gauge},
    registry::Registry,
};

#[derive(Clone, Debug)]
pub(crate) struct GraphMetrics {
    builds: Family<BuildLabels, Counter>,
    nodes: Gauge,
    edges: Gauge,
    warnings: Gauge,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct BuildLabels {
    result: &'static str,
}

impl GraphMetrics {
    pub(crate) fn register(reg: &mut Registry) -> Self {
        let builds = Family::default();
        reg.register(
            "builds",
            "Count of network map generations by result",
            builds.clone(),
        );

        let nodes = Gauge::default();
        reg.register(
            "nodes",
            "The number of nodes in the current graph",
            nodes.clone(),
        );

        let edges = Gauge::default();
        reg.register(
            "edges",
            "The number of edges in the current graph",
            edges.clone(),
        );

        let warnings = Gauge::default();
        reg.register(
            "warnings",
            "The number of warning details in the current graph",
            warnings.clone(),
        );

        Self {
            builds,
            nodes,
            edges,
            warnings,
        }
    }

    /// Describes the graph that is now being served.
    pub(crate) fn published(&self, graph: &NetworkGraph) {
        self.nodes.set(graph.nodes.len() as i64);
        self.edges.set(graph.edges.len() as i64);
        self.warnings.set(graph.warning_details.len() as i64);
    }

    pub(crate) fn succeeded(&self) {
        self.builds
            .get_or_create(&BuildLabels { result: "success" })
            .inc();
    }

    pub(crate) fn failed(&self) {
        self.builds
            .get_or_create(&BuildLabels { result: "failure" })
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_client::encoding::text::encode;

    #[test]
    fn records_builds() {
        let mut prom = Registry::default();
        let metrics = GraphMetrics::register(prom.sub_registry_with_prefix("graph"));

        let graph = NetworkGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            warning_details: Vec::new(),
        };
        metrics.published(&graph);
        metrics.succeeded();
        metrics.failed();
        metrics.failed();

        let mut text = String::new();
        encode(&mut text, &prom).unwrap();
        assert!(text.contains(r#"graph_builds_total{result="success"} 1"#), "{text}");
        assert!(text.contains(r#"graph_builds_total{result="failure"} 2"#), "{text}");
        assert!(text.contains("graph_nodes 0"), "{text}");
        assert!(text.contains("graph_edges 0"), "{text}");
        assert!(text.contains("graph_warnings 0"), "{text}");
    }
}
