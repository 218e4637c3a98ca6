use crate::{ports::allowed_ports, scope::Inventory};
use ahash::AHashSet as HashSet;
use netmap_core::{
    graph::port_id, Edge, PolicyMeta, Port, PortConstraint, Selector, WarningSet, Workload,
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

/// A policy dialect's view of its own rules.
///
/// Each dialect resolves its sources in its own vocabulary; target selection, port filtering and
/// tuple emission are shared by [`evaluate`].
pub(crate) trait Evaluate {
    fn meta(&self) -> &PolicyMeta;

    /// Selects targets in the policy's namespace. `None` selects all of them.
    fn target_selector(&self) -> Option<&Selector>;

    /// Metadata attached to every edge the policy produces.
    fn edge_metadata(&self) -> BTreeMap<String, String>;

    /// Resolves the policy's rules, in declaration order, against the scan.
    fn rules<'w>(&self, inventory: &Inventory<'w>) -> Vec<Rule<'w>>;
}

/// A rule with its sources resolved.
#[derive(Debug)]
pub(crate) struct Rule<'w> {
    pub description: String,
    pub sources: Vec<&'w Workload>,
    pub ports: Vec<PortConstraint>,
    pub warnings: WarningSet,
}

/// The result of evaluating a single policy.
#[derive(Debug, Default)]
pub(crate) struct Evaluation<'w> {
    pub permissions: Vec<Permission<'w>>,
    pub findings: Vec<Finding<'w>>,
}

/// Permits `source` to reach `target` on `port`.
#[derive(Clone, Debug)]
pub(crate) struct Permission<'w> {
    pub source: &'w Workload,
    pub target: &'w Workload,
    pub port: &'w Port,
    pub rule: Arc<str>,
    pub policy: Arc<str>,
    pub document: Arc<str>,
    pub metadata: Arc<BTreeMap<String, String>>,
}

/// Warnings raised by a rule against one of its targets.
#[derive(Clone, Debug)]
pub(crate) struct Finding<'w> {
    pub target: &'w Workload,
    pub warnings: WarningSet,
}

/// Collects workloads without duplicates, preserving first-seen order.
#[derive(Debug, Default)]
pub(crate) struct Sources<'w> {
    seen: HashSet<(&'w str, &'w str)>,
    workloads: Vec<&'w Workload>,
}

pub(crate) fn evaluate<'w>(policy: &dyn Evaluate, inventory: &Inventory<'w>) -> Evaluation<'w> {
    let meta = policy.meta();
    let provenance: Arc<str> = meta.provenance().into();
    let metadata = Arc::new(policy.edge_metadata());
    let mut document = None::<Arc<str>>;

    let targets = inventory
        .in_namespace(&meta.namespace)
        .iter()
        .copied()
        .filter(|w| {
            policy
                .target_selector()
                .map_or(true, |selector| selector.matches(&w.labels))
        })
        .collect::<Vec<_>>();

    let mut evaluation = Evaluation::default();
    for rule in policy.rules(inventory) {
        let description: Arc<str> = rule.description.into();
        for &target in &targets {
            if !rule.warnings.is_empty() {
                evaluation.findings.push(Finding {
                    target,
                    warnings: rule.warnings,
                });
            }

            let ports = allowed_ports(target, &rule.ports);
            if ports.is_empty() {
                continue;
            }

            for &source in &rule.sources {
                if source.namespace == target.namespace && source.name == target.name {
                    continue;
                }

                let document = document
                    .get_or_insert_with(|| render_document(meta))
                    .clone();
                evaluation
                    .permissions
                    .extend(ports.iter().map(|&port| Permission {
                        source,
                        target,
                        port,
                        rule: description.clone(),
                        policy: provenance.clone(),
                        document: document.clone(),
                        metadata: metadata.clone(),
                    }));
            }
        }
    }

    evaluation
}

/// Renders the policy document as YAML. A document that cannot be rendered is omitted rather
/// than failing the build.
fn render_document(meta: &PolicyMeta) -> Arc<str> {
    let Some(document) = meta.document.as_ref() else {
        return Arc::from("");
    };
    match serde_yaml::to_string(document) {
        Ok(yaml) => yaml.into(),
        Err(error) => {
            debug!(%error, policy = %meta.provenance(), "Failed to render policy document");
            Arc::from("")
        }
    }
}

// === impl Permission ===

impl Permission<'_> {
    pub(crate) fn into_edge(self, id: String) -> Edge {
        let protocol = &self.port.protocol;
        Edge {
            id,
            source: self.source.id(),
            target: port_id(&self.target.id(), self.port.number, protocol),
            label: format!("{protocol}:{}", self.port.number),
            rule: self.rule,
            policy: self.policy,
            policy_yaml: self.document,
            metadata: self.metadata,
        }
    }
}

// === impl Sources ===

impl<'w> Sources<'w> {
    pub(crate) fn insert(&mut self, workload: &'w Workload) {
        if self
            .seen
            .insert((workload.namespace.as_str(), workload.name.as_str()))
        {
            self.workloads.push(workload);
        }
    }

    pub(crate) fn into_vec(self) -> Vec<&'w Workload> {
        self.workloads
    }
}

impl<'w> Extend<&'w Workload> for Sources<'w> {
    fn extend<T: IntoIterator<Item = &'w Workload>>(&mut self, iter: T) {
        for workload in iter {
            self.insert(workload);
        }
    }
}
