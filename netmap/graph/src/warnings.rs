use crate::evaluate::Finding;
use ahash::AHashMap as HashMap;
use netmap_core::{Node, NodeDetail, WarningDetail, WarningSet};

/// Accumulates the warnings raised while evaluating policies.
///
/// Each workload node gets the union of the kinds raised against it. A detail record is kept for
/// the first time each policy raises a kind against a workload, in the order first seen.
#[derive(Debug, Default)]
pub(crate) struct Warnings {
    by_workload: HashMap<String, WarningSet>,
    seen: HashMap<(usize, String), WarningSet>,
    details: Vec<WarningDetail>,
}

impl Warnings {
    /// Records a policy's finding. `policy` distinguishes policies that share a provenance label.
    pub(crate) fn record(&mut self, policy: usize, provenance: &str, finding: &Finding<'_>) {
        let workload_id = finding.target.id();
        self.by_workload
            .entry(workload_id.clone())
            .or_default()
            .extend(finding.warnings);

        let seen = self
            .seen
            .entry((policy, workload_id.clone()))
            .or_default();
        for kind in finding.warnings.iter() {
            if seen.insert(kind) {
                self.details.push(WarningDetail {
                    workload_id: workload_id.clone(),
                    workload_name: finding.target.name.clone(),
                    namespace: finding.target.namespace.clone(),
                    policy_name: provenance.to_string(),
                    warning_kind: kind,
                });
            }
        }
    }

    /// Attaches the accumulated warnings to their workload nodes, returning the detail records.
    pub(crate) fn apply(self, nodes: &mut [Node]) -> Vec<WarningDetail> {
        if self.by_workload.is_empty() {
            return self.details;
        }

        for node in nodes {
            if let NodeDetail::Workload { warnings, .. } = &mut node.detail {
                if let Some(set) = self.by_workload.get(&node.id) {
                    warnings.extend(*set);
                }
            }
        }
        self.details
    }
}
