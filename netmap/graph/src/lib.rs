//! Evaluates access-control policies against scanned workloads.
//!
//! Every policy resolves its target workloads within its own namespace and, rule by rule, the
//! source workloads and ports it admits. Each admitted (source, target, port) becomes an edge in
//! the resulting [`NetworkGraph`](netmap_core::NetworkGraph):
//!
//! ```text
//! [ Policy ] -> [ Rule ] -> [ Source ] x [ Target ] x [ Port ] -> [ Edge ]
//! ```
//!
//! Two policy dialects are supported. Kubernetes `NetworkPolicy` rules select sources with pod and
//! namespace label selectors; Istio `AuthorizationPolicy` rules name sources by identity principal
//! or namespace. Rules that leave ports or sources unconstrained are reported as warnings against
//! the workloads they target.
//!
//! Evaluation is a pure function of its inputs. Missing or empty selectors match everything, so a
//! graph can always be built.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod authorization_policy;
mod builder;
mod evaluate;
mod export;
mod network_policy;
mod ports;
mod scope;
mod warnings;


pub use self::{
    builder::Builder,
    export::{warning_rows, WarningRow, WARNING_COLUMNS},
    ports::port_matches,
    scope::KnownNamespaces,
};
