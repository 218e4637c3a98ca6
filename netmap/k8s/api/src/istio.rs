//! Istio `security.istio.io` resources.
//!
//! Only the fields that affect which workloads may reach which ports are modeled; everything else
//! in a resource is ignored when decoding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, kube::CustomResource, Deserialize, Serialize)]
#[kube(
    group = "security.istio.io",
    version = "v1",
    kind = "AuthorizationPolicy",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationPolicySpec {
    /// Selects the workloads the policy applies to. Unset applies to the whole namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<WorkloadSelector>,

    /// One of `ALLOW` (the default), `DENY`, `AUDIT` or `CUSTOM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<RuleFrom>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<RuleTo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleFrom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub principals: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleTo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    #[test]
    fn resource_identity() {
        assert_eq!(AuthorizationPolicy::group(&()), "security.istio.io");
        assert_eq!(AuthorizationPolicy::version(&()), "v1");
        assert_eq!(AuthorizationPolicy::plural(&()), "authorizationpolicies");
    }

    #[test]
    fn decodes_spec() {
        let spec = serde_json::from_value::<AuthorizationPolicySpec>(serde_json::json!({
            "selector": { "matchLabels": { "app": "backend" } },
            "action": "ALLOW",
            "rules": [{
                "from": [{ "source": {
                    "principals": ["cluster.local/ns/web/sa/frontend"],
                    "notNamespaces": ["kube-system"],
                } }],
                "to": [{ "operation": { "ports": ["8080"], "methods": ["GET"] } }],
                "when": [{ "key": "request.auth.claims[iss]", "values": ["x"] }],
            }],
        }))
        .unwrap();

        assert_eq!(
            spec.selector.unwrap().match_labels.unwrap()["app"],
            "backend"
        );
        assert_eq!(spec.action.as_deref(), Some("ALLOW"));
        let rule = &spec.rules[0];
        assert_eq!(
            rule.from[0].source.as_ref().unwrap().principals,
            vec!["cluster.local/ns/web/sa/frontend"]
        );
        assert_eq!(
            rule.to[0].operation.as_ref().unwrap().ports,
            vec!["8080"]
        );
    }

    #[test]
    fn empty_spec() {
        let spec = serde_json::from_value::<AuthorizationPolicySpec>(serde_json::json!({}))
            .unwrap();
        assert!(spec.selector.is_none());
        assert!(spec.action.is_none());
        assert!(spec.rules.is_empty());
    }
}
