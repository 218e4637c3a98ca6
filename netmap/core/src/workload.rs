use crate::labels::Labels;
use serde::Serialize;
use std::{fmt, num::NonZeroU16};

/// A scanned deployable unit, identified by namespace and name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workload {
    pub namespace: String,
    pub name: String,
    pub kind: WorkloadKind,
    pub labels: Labels,
    pub ports: Vec<Port>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    /// A pod that is not managed by a controller.
    Pod,
}

/// A port exposed by one of a workload's containers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Port {
    pub name: Option<String>,
    pub number: NonZeroU16,
    pub protocol: Protocol,
}

/// A transport protocol token, e.g. `TCP`.
///
/// Tokens are compared case-sensitively; anything other than the well-known values is kept
/// verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
    Other(String),
}

/// Records the labels of a namespace included in a scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespaceInfo {
    pub name: String,
    pub labels: Labels,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid port number: {0}")]
pub struct InvalidPort(pub i32);

// === impl Workload ===

impl Workload {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, kind: WorkloadKind) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
            labels: Labels::default(),
            ports: Vec::new(),
        }
    }

    pub fn with_labels(mut self, labels: impl Into<Labels>) -> Self {
        self.labels = labels.into();
        self
    }

    pub fn with_ports(mut self, ports: impl IntoIterator<Item = Port>) -> Self {
        self.ports = ports.into_iter().collect();
        self
    }

    /// The workload's identity key, `namespace/name`.
    pub fn id(&self) -> String {
        crate::graph::workload_id(&self.namespace, &self.name)
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
            Self::Pod => "Pod",
        })
    }
}

// === impl Port ===

impl Port {
    pub fn new(number: NonZeroU16) -> Self {
        Self {
            name: None,
            number,
            protocol: Protocol::Tcp,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }
}

impl TryFrom<i32> for Port {
    type Error = InvalidPort;

    fn try_from(number: i32) -> Result<Self, Self::Error> {
        u16::try_from(number)
            .ok()
            .and_then(NonZeroU16::new)
            .map(Self::new)
            .ok_or(InvalidPort(number))
    }
}

// === impl Protocol ===

impl Protocol {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
            Self::Sctp => "SCTP",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for Protocol {
    fn from(s: &str) -> Self {
        match s {
            "TCP" => Self::Tcp,
            "UDP" => Self::Udp,
            "SCTP" => Self::Sctp,
            s => Self::Other(s.to_string()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Protocol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// === impl NamespaceInfo ===

impl NamespaceInfo {
    pub fn new(name: impl Into<String>, labels: impl Into<Labels>) -> Self {
        Self {
            name: name.into(),
            labels: labels.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_from_i32() {
        assert_eq!(Port::try_from(80).unwrap().number.get(), 80);
        assert_eq!(Port::try_from(80).unwrap().protocol, Protocol::Tcp);
        assert!(Port::try_from(0).is_err(), "0");
        assert!(Port::try_from(-1).is_err(), "-1");
        assert!(Port::try_from(65536).is_err(), "65536");
    }

    #[test]
    fn protocol_tokens_are_case_sensitive() {
        assert_eq!(Protocol::from("TCP"), Protocol::Tcp);
        assert_eq!(Protocol::from("UDP"), Protocol::Udp);
        assert_eq!(Protocol::from("tcp"), Protocol::Other("tcp".to_string()));
        assert_ne!(Protocol::from("tcp"), Protocol::Tcp);
        assert_eq!(Protocol::from("tcp").to_string(), "tcp");
    }

    #[test]
    fn workload_id() {
        let w = Workload::new("ns-0", "web", WorkloadKind::Deployment);
        assert_eq!(w.id(), "ns-0/web");
    }
}
