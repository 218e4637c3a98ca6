use netmap_core::{NetworkGraph, WarningDetail, WarningKind};
use serde::Serialize;

/// Column headers for the warnings table, in row order.
pub const WARNING_COLUMNS: [&str; 5] =
    ["Workload", "Namespace", "Policy", "Warning Type", "Description"];

/// One row of the warnings table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WarningRow {
    pub workload: String,
    pub namespace: String,

    /// The policy name, without its namespace.
    pub policy: String,

    pub warning_kind: WarningKind,
    pub description: &'static str,
}

/// Produces one row per warning detail, in graph order.
pub fn warning_rows(graph: &NetworkGraph) -> Vec<WarningRow> {
    graph.warning_details.iter().map(WarningRow::from).collect()
}

// === impl WarningRow ===

impl WarningRow {
    /// The row's cells, in [`WARNING_COLUMNS`] order.
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.workload,
            &self.namespace,
            &self.policy,
            self.warning_kind.as_str(),
            self.description,
        ]
    }
}

impl From<&WarningDetail> for WarningRow {
    fn from(detail: &WarningDetail) -> Self {
        let policy = detail
            .policy_name
            .strip_prefix(detail.namespace.as_str())
            .and_then(|name| name.strip_prefix('/'))
            .filter(|name| !name.is_empty())
            .unwrap_or(&detail.policy_name);
        Self {
            workload: detail.workload_name.clone(),
            namespace: detail.namespace.clone(),
            policy: policy.to_string(),
            warning_kind: detail.warning_kind,
            description: detail.warning_kind.description(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_detail(namespace: &str, policy: &str) -> WarningDetail {
        WarningDetail {
            workload_id: format!("{namespace}/backend"),
            workload_name: "backend".to_string(),
            namespace: namespace.to_string(),
            policy_name: policy.to_string(),
            warning_kind: WarningKind::UnrestrictedPorts,
        }
    }

    #[test]
    fn strips_namespace_from_policy() {
        let row = WarningRow::from(&mk_detail("web", "web/allow-all"));
        assert_eq!(
            row.cells(),
            [
                "backend",
                "web",
                "allow-all",
                "unrestricted-ports",
                "Rule allows all ports (no port restriction)"
            ]
        );
    }

    #[test]
    fn keeps_unprefixed_policy_names() {
        assert_eq!(WarningRow::from(&mk_detail("web", "allow-all")).policy, "allow-all");
        assert_eq!(WarningRow::from(&mk_detail("web", "web/")).policy, "web/");
        assert_eq!(
            WarningRow::from(&mk_detail("web", "webapp/allow")).policy,
            "webapp/allow"
        );
    }

    #[test]
    fn rows_follow_detail_order() {
        let graph = NetworkGraph {
            warning_details: vec![mk_detail("a", "a/one"), mk_detail("b", "b/two")],
            ..Default::default()
        };
        let rows = warning_rows(&graph);
        assert_eq!(
            rows.iter().map(|r| r.policy.as_str()).collect::<Vec<_>>(),
            vec!["one", "two"]
        );
    }
}
