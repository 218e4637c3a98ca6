use crate::{
    evaluate::{Evaluate, Rule, Sources},
    scope::Inventory,
};
use netmap_core::{
    policy::{AuthorizationPolicy, AuthorizationRule, Operation, Source},
    PolicyMeta, PortConstraint, Selector, WarningSet, Workload,
};
use std::{collections::BTreeMap, num::NonZeroU16};

impl Evaluate for AuthorizationPolicy {
    fn meta(&self) -> &PolicyMeta {
        &self.meta
    }

    fn target_selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }

    fn edge_metadata(&self) -> BTreeMap<String, String> {
        [
            ("policyType".to_string(), "AuthorizationPolicy".to_string()),
            ("action".to_string(), self.action.to_string()),
        ]
        .into_iter()
        .collect()
    }

    fn rules<'w>(&self, inventory: &Inventory<'w>) -> Vec<Rule<'w>> {
        self.rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| Rule {
                description: describe(idx, rule),
                sources: sources(&rule.from, inventory),
                ports: ports(&rule.to),
                warnings: WarningSet::default(),
            })
            .collect()
    }
}

/// Extracts the namespace from a principal like `cluster.local/ns/web/sa/frontend`.
///
/// Principals without a non-empty segment following `ns` name no namespace.
pub(crate) fn principal_namespace(principal: &str) -> Option<&str> {
    let mut segments = principal.split('/');
    segments.find(|s| *s == "ns")?;
    segments.next().filter(|ns| !ns.is_empty())
}

/// Resolves the workloads a rule admits. An empty source list, or a source that constrains
/// nothing, admits every workload.
fn sources<'w>(from: &[Source], inventory: &Inventory<'w>) -> Vec<&'w Workload> {
    if from.is_empty() {
        return inventory.all().collect();
    }

    let mut sources = Sources::default();
    for source in from {
        if source.is_unconstrained() {
            sources.extend(inventory.all());
            continue;
        }

        for principal in &source.principals {
            if let Some(ns) = principal_namespace(principal) {
                sources.extend(inventory.in_namespace(ns).iter().copied());
            }
        }
        for ns in &source.namespaces {
            sources.extend(inventory.in_namespace(ns).iter().copied());
        }
    }
    sources.into_vec()
}

/// Collects the numeric ports named by a rule's operations. Ports that are not numbers are
/// ignored, so a rule whose operations name none grants every port.
fn ports(to: &[Operation]) -> Vec<PortConstraint> {
    let mut ports = Vec::<PortConstraint>::new();
    for port in to.iter().flat_map(|op| &op.ports) {
        let Ok(port) = port.trim().parse::<NonZeroU16>() else {
            continue;
        };
        let constraint = PortConstraint::number(port);
        if !ports.contains(&constraint) {
            ports.push(constraint);
        }
    }
    ports
}

fn describe(idx: usize, rule: &AuthorizationRule) -> String {
    let mut parts = Vec::with_capacity(2);

    if rule.from.is_empty() {
        parts.push("from: all".to_string());
    } else {
        let sources = rule
            .from
            .iter()
            .flat_map(|s| [("principals", &s.principals), ("namespaces", &s.namespaces)])
            .filter(|(_, values)| !values.is_empty())
            .map(|(what, values)| format!("{what}: [{}]", values.join(", ")))
            .collect::<Vec<_>>();
        if !sources.is_empty() {
            parts.push(format!("from: {}", sources.join(", ")));
        }
    }

    if rule.to.is_empty() {
        parts.push("to: all".to_string());
    } else {
        let operations = rule
            .to
            .iter()
            .flat_map(|op| {
                [
                    ("ports", &op.ports),
                    ("methods", &op.methods),
                    ("paths", &op.paths),
                    ("hosts", &op.hosts),
                ]
            })
            .filter(|(_, values)| !values.is_empty())
            .map(|(what, values)| format!("{what}: [{}]", values.join(", ")))
            .collect::<Vec<_>>();
        if !operations.is_empty() {
            parts.push(format!("to: {}", operations.join(", ")));
        }
    }

    format!("AuthzPolicy Rule {}: {}", idx + 1, parts.join("; "))
}
