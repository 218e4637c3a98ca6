use super::{PolicyMeta, PortConstraint};
use crate::labels::Selector;

/// Grants ingress to the workloads selected by `pod_selector`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkPolicy {
    pub meta: PolicyMeta,

    /// Selects target workloads in the policy's namespace. Empty selects all of them.
    pub pod_selector: Selector,

    pub ingress: Vec<IngressRule>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngressRule {
    /// Allowed sources. Empty allows every source.
    pub from: Vec<Peer>,

    /// Allowed ports. Empty allows every port.
    pub ports: Vec<PortConstraint>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Peer {
    pub pod_selector: Option<Selector>,

    /// When unset, the peer is scoped to the policy's own namespace.
    pub namespace_selector: Option<Selector>,

    pub ip_block: Option<IpBlock>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IpBlock {
    pub cidr: String,
    pub except: Vec<String>,
}

// === impl NetworkPolicy ===

impl NetworkPolicy {
    pub fn new(meta: PolicyMeta, pod_selector: Selector) -> Self {
        Self {
            meta,
            pod_selector,
            ingress: Vec::new(),
        }
    }

    pub fn with_ingress(mut self, rules: impl IntoIterator<Item = IngressRule>) -> Self {
        self.ingress.extend(rules);
        self
    }
}

// === impl Peer ===

impl Peer {
    pub fn pods(selector: Selector) -> Self {
        Self {
            pod_selector: Some(selector),
            ..Default::default()
        }
    }

    pub fn namespaces(selector: Selector) -> Self {
        Self {
            namespace_selector: Some(selector),
            ..Default::default()
        }
    }

    pub fn with_namespaces(mut self, selector: Selector) -> Self {
        self.namespace_selector = Some(selector);
        self
    }
}
