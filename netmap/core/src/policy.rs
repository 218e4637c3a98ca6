pub mod authorization;
pub mod network;

pub use self::{
    authorization::{Action, AuthorizationPolicy, AuthorizationRule, Operation, Source},
    network::{IngressRule, IpBlock, NetworkPolicy, Peer},
};
use crate::workload::Protocol;
use std::{fmt, num::NonZeroU16};

/// An access-control policy, in one of the supported dialects.
#[derive(Clone, Debug, PartialEq)]
pub enum Policy {
    /// Grants ingress by label selectors.
    Network(NetworkPolicy),

    /// Grants access by identity principals and namespaces.
    Authorization(AuthorizationPolicy),
}

/// Identifies a policy and optionally holds the document it was read from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicyMeta {
    pub namespace: String,
    pub name: String,

    /// The policy resource as fetched, used for edge provenance.
    pub document: Option<serde_json::Value>,
}

/// Constrains the ports to which a rule grants access.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PortConstraint {
    pub port: Option<PortRef>,
    pub protocol: Option<Protocol>,
}

/// References a workload's port by name or number.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PortRef {
    Number(NonZeroU16),
    Name(String),
}

// === impl Policy ===

impl Policy {
    pub fn meta(&self) -> &PolicyMeta {
        match self {
            Self::Network(p) => &p.meta,
            Self::Authorization(p) => &p.meta,
        }
    }

    /// The policy resource kind, e.g. `NetworkPolicy`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "NetworkPolicy",
            Self::Authorization(_) => "AuthorizationPolicy",
        }
    }
}

impl From<NetworkPolicy> for Policy {
    fn from(policy: NetworkPolicy) -> Self {
        Self::Network(policy)
    }
}

impl From<AuthorizationPolicy> for Policy {
    fn from(policy: AuthorizationPolicy) -> Self {
        Self::Authorization(policy)
    }
}

// === impl PolicyMeta ===

impl PolicyMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            document: None,
        }
    }

    pub fn with_document(mut self, document: serde_json::Value) -> Self {
        self.document = Some(document);
        self
    }

    /// The `namespace/name` label attached to every finding derived from this policy.
    pub fn provenance(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

// === impl PortConstraint ===

impl PortConstraint {
    pub fn number(port: NonZeroU16) -> Self {
        Self {
            port: Some(PortRef::Number(port)),
            protocol: None,
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            port: Some(PortRef::Name(name.into())),
            protocol: None,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }
}

/// Formats as `PROTOCOL/port`, with `*` standing in for any port. Kubernetes defaults an
/// unspecified protocol to TCP.
impl fmt::Display for PortConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let protocol = self.protocol.as_ref().map_or("TCP", Protocol::as_str);
        match &self.port {
            None => write!(f, "{protocol}/*"),
            Some(port) => write!(f, "{protocol}/{port}"),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortRef::Number(n) => fmt::Display::fmt(n, f),
            PortRef::Name(n) => fmt::Display::fmt(n, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance() {
        assert_eq!(PolicyMeta::new("ns-0", "allow-web").provenance(), "ns-0/allow-web");
    }

    #[test]
    fn display_port_constraint() {
        let http = NonZeroU16::new(8080).unwrap();
        assert_eq!(PortConstraint::default().to_string(), "TCP/*");
        assert_eq!(PortConstraint::number(http).to_string(), "TCP/8080");
        assert_eq!(
            PortConstraint::name("dns")
                .with_protocol(Protocol::Udp)
                .to_string(),
            "UDP/dns"
        );
    }
}
