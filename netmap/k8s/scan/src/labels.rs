use netmap_core::{
    labels::{Expression, Operator},
    Selector,
};
use netmap_k8s_api::{LabelSelector, LabelSelectorRequirement};
use tracing::debug;

/// Converts a Kubernetes label selector.
///
/// Requirements with an unknown operator are dropped, so a malformed selector selects more rather
/// than less.
pub(crate) fn selector(selector: &LabelSelector) -> Selector {
    let match_labels = selector.match_labels.clone().filter(|m| !m.is_empty());
    let expressions = selector
        .match_expressions
        .iter()
        .flatten()
        .filter_map(expression)
        .collect::<Vec<_>>();
    Selector::new(match_labels, (!expressions.is_empty()).then_some(expressions))
}

fn expression(req: &LabelSelectorRequirement) -> Option<Expression> {
    let operator = match req.operator.parse::<Operator>() {
        Ok(op) => op,
        Err(error) => {
            debug!(%error, key = %req.key, "Ignoring label selector requirement");
            return None;
        }
    };
    Some(Expression::new(
        req.key.clone(),
        operator,
        req.values.iter().flatten().cloned(),
    ))
}
