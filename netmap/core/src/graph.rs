use crate::{
    labels::Labels,
    warning::{WarningKind, WarningSet},
    workload::{Port, Protocol, Workload, WorkloadKind},
};
use serde::Serialize;
use std::{collections::BTreeMap, num::NonZeroU16, sync::Arc};

/// The reachability graph produced from a single scan.
///
/// A graph is never modified once built, so it may be shared freely between readers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub warning_details: Vec<WarningDetail>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub namespace: String,
    #[serde(flatten)]
    pub detail: NodeDetail,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeDetail {
    Workload {
        kind: WorkloadKind,
        metadata: Labels,
        #[serde(skip_serializing_if = "WarningSet::is_empty")]
        warnings: WarningSet,
    },
    Port {
        parent: String,
        port: NonZeroU16,
        protocol: Protocol,
    },
}

/// Permits traffic from a workload node to a port node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Assigned in build order; only meaningful within a single graph.
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub rule: Arc<str>,
    pub policy: Arc<str>,
    #[serde(skip_serializing_if = "is_empty")]
    pub policy_yaml: Arc<str>,
    pub metadata: Arc<BTreeMap<String, String>>,
}

/// Records the policy that caused a warning on a workload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningDetail {
    pub workload_id: String,
    pub workload_name: String,
    pub namespace: String,
    pub policy_name: String,
    pub warning_kind: WarningKind,
}

pub fn workload_id(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

pub fn port_id(workload_id: &str, port: NonZeroU16, protocol: &Protocol) -> String {
    format!("{workload_id}:{protocol}/{port}")
}

fn is_empty(s: &Arc<str>) -> bool {
    s.is_empty()
}

// === impl NetworkGraph ===

impl NetworkGraph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn workloads(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.detail, NodeDetail::Workload { .. }))
    }

    pub fn ports(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.detail, NodeDetail::Port { .. }))
    }
}

// === impl Node ===

impl Node {
    pub fn workload(workload: &Workload) -> Self {
        Self {
            id: workload.id(),
            label: workload.name.clone(),
            namespace: workload.namespace.clone(),
            detail: NodeDetail::Workload {
                kind: workload.kind,
                metadata: workload.labels.clone(),
                warnings: WarningSet::default(),
            },
        }
    }

    pub fn port(workload: &Workload, port: &Port) -> Self {
        let parent = workload.id();
        Self {
            id: port_id(&parent, port.number, &port.protocol),
            label: port
                .name
                .clone()
                .unwrap_or_else(|| port.number.to_string()),
            namespace: workload.namespace.clone(),
            detail: NodeDetail::Port {
                parent,
                port: port.number,
                protocol: port.protocol.clone(),
            },
        }
    }

    /// The warnings attached to a workload node. Port nodes carry none.
    pub fn warnings(&self) -> WarningSet {
        match self.detail {
            NodeDetail::Workload { warnings, .. } => warnings,
            NodeDetail::Port { .. } => WarningSet::default(),
        }
    }
}
