use ahash::AHashMap as HashMap;
use netmap_core::{Labels, NamespaceInfo, Selector, Workload};
use std::collections::{BTreeMap, BTreeSet};

/// The namespaces retrieved for a scan, with their labels.
///
/// Namespaces that hold scanned workloads are always known, even without a namespace record; they
/// are treated as unlabeled.
#[derive(Clone, Debug, Default)]
pub struct KnownNamespaces {
    labels: BTreeMap<String, Labels>,
}

/// Indexes a scan's workloads by namespace.
#[derive(Debug)]
pub(crate) struct Inventory<'w> {
    workloads: &'w [Workload],
    by_ns: HashMap<&'w str, Vec<&'w Workload>>,
    namespaces: &'w KnownNamespaces,
}

// === impl KnownNamespaces ===

impl KnownNamespaces {
    pub fn new(namespaces: &[NamespaceInfo], workloads: &[Workload]) -> Self {
        let mut labels = namespaces
            .iter()
            .map(|ns| (ns.name.clone(), ns.labels.clone()))
            .collect::<BTreeMap<_, _>>();
        for workload in workloads {
            labels.entry(workload.namespace.clone()).or_default();
        }
        Self { labels }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.labels.contains_key(namespace)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Determines the namespaces a policy peer may select workloads from.
    ///
    /// - Without a namespace selector, the peer is confined to the policy's own namespace.
    /// - An empty selector selects every known namespace.
    /// - Otherwise, the known namespaces whose labels match the selector are selected.
    pub fn resolve(&self, policy_ns: &str, selector: Option<&Selector>) -> BTreeSet<String> {
        let Some(selector) = selector else {
            return Some(policy_ns.to_string()).into_iter().collect();
        };

        if selector.is_empty() {
            return self.labels.keys().cloned().collect();
        }

        self.labels
            .iter()
            .filter(|(_, labels)| selector.matches(labels))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl FromIterator<NamespaceInfo> for KnownNamespaces {
    fn from_iter<T: IntoIterator<Item = NamespaceInfo>>(iter: T) -> Self {
        Self {
            labels: iter.into_iter().map(|ns| (ns.name, ns.labels)).collect(),
        }
    }
}

// === impl Inventory ===

impl<'w> Inventory<'w> {
    pub(crate) fn new(workloads: &'w [Workload], namespaces: &'w KnownNamespaces) -> Self {
        let mut by_ns = HashMap::<&'w str, Vec<&'w Workload>>::default();
        for workload in workloads {
            by_ns
                .entry(workload.namespace.as_str())
                .or_default()
                .push(workload);
        }
        Self {
            workloads,
            by_ns,
            namespaces,
        }
    }

    /// Every scanned workload, in scan order.
    pub(crate) fn all(&self) -> impl Iterator<Item = &'w Workload> {
        self.workloads.iter()
    }

    /// The workloads in the given namespace, in scan order.
    pub(crate) fn in_namespace(&self, ns: &str) -> &[&'w Workload] {
        self.by_ns.get(ns).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn namespaces(&self) -> &'w KnownNamespaces {
        self.namespaces
    }
}
