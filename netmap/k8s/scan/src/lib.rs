//! Reads the network map's inputs from a Kubernetes cluster.
//!
//! For each requested namespace the scanner reads the namespace's labels, the workloads that run
//! pods (Deployments, StatefulSets, DaemonSets and standalone Pods) and the policies that govern
//! ingress to them (Kubernetes NetworkPolicies and Istio AuthorizationPolicies). Resources are
//! converted into `netmap-core` records; nothing here evaluates policy.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod labels;
mod policy;
mod scanner;
mod workload;

pub use self::scanner::{Resources, Scanner};

/// Splits a comma-separated namespace list, dropping blanks and repeats.
pub fn parse_namespaces(list: &str) -> Vec<String> {
    let mut namespaces = Vec::<String>::new();
    for ns in list.split(',').map(str::trim).filter(|ns| !ns.is_empty()) {
        if !namespaces.iter().any(|n| n == ns) {
            namespaces.push(ns.to_string());
        }
    }
    namespaces
}
