use crate::labels;
use anyhow::{Context, Result};
use netmap_core::{
    policy::{
        Action, AuthorizationPolicy, AuthorizationRule, IngressRule, IpBlock, NetworkPolicy,
        Operation, Peer, Source,
    },
    PolicyMeta, PortConstraint, Protocol, Selector,
};
use netmap_k8s_api::{
    self as k8s,
    istio::{self, AuthorizationPolicySpec},
    DynamicObject, IntOrString, NetworkPolicyPeer, NetworkPolicyPort,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU16;
use tracing::debug;

/// Converts the ingress half of a Kubernetes NetworkPolicy.
pub(crate) fn network_policy(ns: &str, policy: &k8s::NetworkPolicy) -> NetworkPolicy {
    let meta = meta(ns, &policy.metadata, policy);
    let spec = policy.spec.clone().unwrap_or_default();
    let pod_selector = labels::selector(&spec.pod_selector);
    let ingress = spec.ingress.into_iter().flatten().map(|rule| IngressRule {
        from: rule.from.iter().flatten().map(peer).collect(),
        ports: rule.ports.iter().flatten().map(port).collect(),
    });
    NetworkPolicy::new(meta, pod_selector).with_ingress(ingress)
}

/// Decodes an Istio AuthorizationPolicy fetched as a dynamic object.
pub(crate) fn authorization_policy(ns: &str, obj: &DynamicObject) -> Result<AuthorizationPolicy> {
    let spec = match obj.data.get("spec") {
        Some(spec) => AuthorizationPolicySpec::deserialize(spec)
            .context("failed to decode AuthorizationPolicy spec")?,
        None => AuthorizationPolicySpec::default(),
    };

    let action = match spec.action.as_deref() {
        None | Some("") => Action::default(),
        Some(action) => action.parse::<Action>()?,
    };

    let mut policy = AuthorizationPolicy::new(meta(ns, &obj.metadata, obj)).with_rules(
        spec.rules.into_iter().map(|rule| AuthorizationRule {
            from: rule.from.into_iter().map(source).collect(),
            to: rule.to.into_iter().map(operation).collect(),
        }),
    );
    policy.action = action;
    if let Some(match_labels) = spec
        .selector
        .and_then(|s| s.match_labels)
        .filter(|m| !m.is_empty())
    {
        policy = policy.with_selector(Selector::from_map(match_labels));
    }
    Ok(policy)
}

fn meta<T: Serialize>(ns: &str, metadata: &k8s::ObjectMeta, resource: &T) -> PolicyMeta {
    let meta = PolicyMeta::new(ns, metadata.name.clone().unwrap_or_default());
    match document(resource) {
        Some(doc) => meta.with_document(doc),
        None => meta,
    }
}

/// Captures a resource as it was fetched, less the server-side apply bookkeeping.
pub(crate) fn document<T: Serialize>(resource: &T) -> Option<serde_json::Value> {
    let mut doc = match serde_json::to_value(resource) {
        Ok(doc) => doc,
        Err(error) => {
            debug!(%error, "Failed to capture policy document");
            return None;
        }
    };
    if let Some(metadata) = doc.get_mut("metadata").and_then(|m| m.as_object_mut()) {
        metadata.remove("managedFields");
    }
    Some(doc)
}

fn peer(peer: &NetworkPolicyPeer) -> Peer {
    Peer {
        pod_selector: peer.pod_selector.as_ref().map(labels::selector),
        namespace_selector: peer.namespace_selector.as_ref().map(labels::selector),
        ip_block: peer.ip_block.as_ref().map(|block| IpBlock {
            cidr: block.cidr.clone(),
            except: block.except.clone().unwrap_or_default(),
        }),
    }
}

fn port(port: &NetworkPolicyPort) -> PortConstraint {
    let mut constraint = match &port.port {
        Some(IntOrString::Int(n)) => match u16::try_from(*n).ok().and_then(NonZeroU16::new) {
            Some(n) => PortConstraint::number(n),
            None => {
                debug!(port = %n, "Ignoring invalid policy port");
                PortConstraint::default()
            }
        },
        Some(IntOrString::String(name)) if !name.is_empty() => PortConstraint::name(name.clone()),
        _ => PortConstraint::default(),
    };
    if let Some(protocol) = port.protocol.as_deref().filter(|p| !p.is_empty()) {
        constraint = constraint.with_protocol(Protocol::from(protocol));
    }
    constraint
}

fn source(from: istio::RuleFrom) -> Source {
    let istio::Source {
        principals,
        namespaces,
    } = from.source.unwrap_or_default();
    Source {
        principals,
        namespaces,
    }
}

fn operation(to: istio::RuleTo) -> Operation {
    let istio::Operation {
        ports,
        methods,
        paths,
        hosts,
    } = to.operation.unwrap_or_default();
    Operation {
        ports,
        methods,
        paths,
        hosts,
    }
}
