use crate::{
    evaluate::{evaluate, Evaluate},
    scope::{Inventory, KnownNamespaces},
    warnings::Warnings,
};
use netmap_core::{NamespaceInfo, NetworkGraph, Node, Policy, Workload};
use tracing::{debug, instrument, trace};

/// Builds a [`NetworkGraph`] from a scan's workloads and policies.
///
/// A builder holds no state between builds; each call to [`Builder::build`] produces a fresh graph
/// from its inputs.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    namespaces: Vec<NamespaceInfo>,
}

/// Assigns edge ids in build order.
#[derive(Debug, Default)]
struct EdgeIds(usize);

// === impl Builder ===

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the namespace records used to resolve namespace selectors.
    pub fn with_namespaces(mut self, namespaces: impl IntoIterator<Item = NamespaceInfo>) -> Self {
        self.namespaces.extend(namespaces);
        self
    }

    #[instrument(skip_all, fields(workloads = workloads.len(), policies = policies.len()))]
    pub fn build(&self, workloads: &[Workload], policies: &[Policy]) -> NetworkGraph {
        let mut nodes = Vec::with_capacity(
            workloads.len() + workloads.iter().map(|w| w.ports.len()).sum::<usize>(),
        );
        for workload in workloads {
            nodes.push(Node::workload(workload));
            nodes.extend(workload.ports.iter().map(|p| Node::port(workload, p)));
        }

        let namespaces = KnownNamespaces::new(&self.namespaces, workloads);
        let inventory = Inventory::new(workloads, &namespaces);

        let mut ids = EdgeIds::default();
        let mut edges = Vec::new();
        let mut warnings = Warnings::default();
        for (idx, policy) in policies.iter().enumerate() {
            let evaluator: &dyn Evaluate = match policy {
                Policy::Network(p) => p,
                Policy::Authorization(p) => p,
            };
            let provenance = policy.meta().provenance();
            let evaluation = evaluate(evaluator, &inventory);
            trace!(
                policy = %provenance,
                kind = policy.kind(),
                edges = evaluation.permissions.len(),
                findings = evaluation.findings.len(),
                "Evaluated policy"
            );

            for finding in &evaluation.findings {
                warnings.record(idx, &provenance, finding);
            }
            edges.extend(
                evaluation
                    .permissions
                    .into_iter()
                    .map(|permission| permission.into_edge(ids.next())),
            );
        }

        let warning_details = warnings.apply(&mut nodes);
        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            warnings = warning_details.len(),
            "Built graph"
        );
        NetworkGraph {
            nodes,
            edges,
            warning_details,
        }
    }
}

// === impl EdgeIds ===

impl EdgeIds {
    fn next(&mut self) -> String {
        let id = format!("edge-{}", self.0);
        self.0 += 1;
        id
    }
}
