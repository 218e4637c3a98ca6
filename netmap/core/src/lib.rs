//! Shared data model for the network map.
//!
//! Workloads, namespaces and policies are read from a cluster by the scanner and evaluated into a
//! [`NetworkGraph`] by `netmap-graph`:
//!
//! ```text
//! [ Workload ] -> [ Port ] <- [ Edge ] <- [ Policy rule ] -> [ Workload ]
//! ```
//!
//! Nothing here performs I/O.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod graph;
pub mod labels;
pub mod policy;
mod warning;
mod workload;

pub use self::{
    graph::{Edge, NetworkGraph, Node, NodeDetail, WarningDetail},
    labels::{Labels, Selector},
    policy::{Policy, PolicyMeta, PortConstraint, PortRef},
    warning::{WarningKind, WarningSet},
    workload::{InvalidPort, NamespaceInfo, Port, Protocol, Workload, WorkloadKind},
};
