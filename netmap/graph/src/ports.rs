use netmap_core::{Port, PortConstraint, PortRef, Workload};

/// Returns true if a workload's port satisfies a rule's port constraint.
///
/// Unset fields in the constraint match anything. A named constraint only matches a port declared
/// with the same name.
pub fn port_matches(port: &Port, constraint: &PortConstraint) -> bool {
    if let Some(protocol) = constraint.protocol.as_ref() {
        if *protocol != port.protocol {
            return false;
        }
    }

    match constraint.port.as_ref() {
        None => true,
        Some(PortRef::Number(n)) => *n == port.number,
        Some(PortRef::Name(name)) => port.name.as_deref() == Some(name.as_str()),
    }
}

/// Selects the target's ports that a rule grants access to. An empty constraint list grants every
/// declared port.
pub(crate) fn allowed_ports<'w>(
    workload: &'w Workload,
    constraints: &[PortConstraint],
) -> Vec<&'w Port> {
    if constraints.is_empty() {
        return workload.ports.iter().collect();
    }

    workload
        .ports
        .iter()
        .filter(|port| constraints.iter().any(|c| port_matches(port, c)))
        .collect()
}
