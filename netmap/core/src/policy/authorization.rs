use super::PolicyMeta;
use crate::labels::Selector;
use std::fmt;

/// Grants access to the selected workloads by caller identity and namespace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthorizationPolicy {
    pub meta: PolicyMeta,

    /// Selects target workloads in the policy's namespace. Unset selects all of them.
    pub selector: Option<Selector>,

    pub action: Action,
    pub rules: Vec<AuthorizationRule>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Action {
    #[default]
    Allow,
    Deny,
    Audit,
    Custom,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationRule {
    /// Allowed callers. Empty allows every caller.
    pub from: Vec<Source>,

    /// Allowed operations. Empty allows every operation.
    pub to: Vec<Operation>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Source {
    /// Identity principals, e.g. `cluster.local/ns/web/sa/frontend`.
    pub principals: Vec<String>,
    pub namespaces: Vec<String>,
}

/// Describes the requests a rule permits. Only `ports` affects reachability; the HTTP
/// attributes are kept for descriptions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Operation {
    pub ports: Vec<String>,
    pub methods: Vec<String>,
    pub paths: Vec<String>,
    pub hosts: Vec<String>,
}

// === impl AuthorizationPolicy ===

impl AuthorizationPolicy {
    pub fn new(meta: PolicyMeta) -> Self {
        Self {
            meta,
            ..Default::default()
        }
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = AuthorizationRule>) -> Self {
        self.rules.extend(rules);
        self
    }
}

// === impl Action ===

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
            Self::Audit => "AUDIT",
            Self::Custom => "CUSTOM",
        }
    }
}

impl std::str::FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALLOW" => Ok(Self::Allow),
            "DENY" => Ok(Self::Deny),
            "AUDIT" => Ok(Self::Audit),
            "CUSTOM" => Ok(Self::Custom),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown authorization action: {0}")]
pub struct UnknownAction(String);

// === impl Source ===

impl Source {
    pub fn principals(principals: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            principals: principals.into_iter().map(Into::into).collect(),
            namespaces: Vec::new(),
        }
    }

    pub fn namespaces(namespaces: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            principals: Vec::new(),
            namespaces: namespaces.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the source constrains neither principals nor namespaces.
    pub fn is_unconstrained(&self) -> bool {
        self.principals.is_empty() && self.namespaces.is_empty()
    }
}

// === impl Operation ===

impl Operation {
    pub fn ports(ports: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ports: ports.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}
