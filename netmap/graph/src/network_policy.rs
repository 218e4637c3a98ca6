use crate::{
    evaluate::{Evaluate, Rule, Sources},
    scope::Inventory,
};
use netmap_core::{
    policy::{IngressRule, NetworkPolicy, Peer},
    PolicyMeta, Selector, WarningKind, WarningSet, Workload,
};
use std::{collections::BTreeMap, fmt};

impl Evaluate for NetworkPolicy {
    fn meta(&self) -> &PolicyMeta {
        &self.meta
    }

    fn target_selector(&self) -> Option<&Selector> {
        Some(&self.pod_selector)
    }

    fn edge_metadata(&self) -> BTreeMap<String, String> {
        [("policyType", "NetworkPolicy"), ("ruleType", "ingress")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn rules<'w>(&self, inventory: &Inventory<'w>) -> Vec<Rule<'w>> {
        self.ingress
            .iter()
            .enumerate()
            .map(|(idx, rule)| Rule {
                description: describe(idx, rule),
                sources: sources(&self.meta.namespace, &rule.from, inventory),
                ports: rule.ports.clone(),
                warnings: warnings(rule),
            })
            .collect()
    }
}

/// Resolves the workloads an ingress rule admits. An empty peer list admits every workload.
///
/// Address blocks are not matched against workloads: a peer that names only an `ipBlock`
/// resolves like an empty peer, to every workload in the policy's namespace.
fn sources<'w>(policy_ns: &str, peers: &[Peer], inventory: &Inventory<'w>) -> Vec<&'w Workload> {
    if peers.is_empty() {
        return inventory.all().collect();
    }

    let mut sources = Sources::default();
    for peer in peers {
        let namespaces = inventory
            .namespaces()
            .resolve(policy_ns, peer.namespace_selector.as_ref());
        for ns in &namespaces {
            sources.extend(inventory.in_namespace(ns).iter().copied().filter(|w| {
                peer.pod_selector
                    .as_ref()
                    .map_or(true, |selector| selector.matches(&w.labels))
            }));
        }
    }
    sources.into_vec()
}

fn warnings(rule: &IngressRule) -> WarningSet {
    let mut warnings = WarningSet::default();
    if rule.ports.is_empty() {
        warnings.insert(WarningKind::UnrestrictedPorts);
    }
    if rule.from.is_empty() {
        warnings.insert(WarningKind::UnrestrictedSource);
    }
    warnings
}

fn describe(idx: usize, rule: &IngressRule) -> String {
    let from = if rule.from.is_empty() {
        "all".to_string()
    } else {
        join(rule.from.iter().map(DisplayPeer))
    };
    let ports = if rule.ports.is_empty() {
        "all".to_string()
    } else {
        join(rule.ports.iter())
    };
    format!("NetworkPolicy Rule {}: from: {from}; ports: {ports}", idx + 1)
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

struct DisplayPeer<'p>(&'p Peer);

impl fmt::Display for DisplayPeer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Peer {
            pod_selector,
            namespace_selector,
            ip_block,
        } = self.0;

        let mut parts = Vec::with_capacity(3);
        if let Some(selector) = pod_selector {
            parts.push(describe_selector("pods", selector));
        }
        match namespace_selector {
            Some(selector) => parts.push(describe_selector("namespaces", selector)),
            None if pod_selector.is_some() => parts.push("namespaces: same as policy".to_string()),
            None => {}
        }
        if let Some(block) = ip_block {
            parts.push(format!("cidr: {}", block.cidr));
        }

        if parts.is_empty() {
            return f.write_str("any");
        }
        f.write_str(&parts.join(", "))
    }
}

fn describe_selector(what: &str, selector: &Selector) -> String {
    if selector.is_empty() {
        format!("{what}: all")
    } else {
        format!("{what}: {{{selector}}}")
    }
}
