use netmap_core::{Port, Protocol, Workload, WorkloadKind};
use netmap_k8s_api::{
    Container, ContainerPort, DaemonSet, Deployment, Pod, PodSpec, PodTemplateSpec, StatefulSet,
};
use tracing::debug;

/// A controller that runs pods from a template.
pub(crate) trait PodTemplated {
    const KIND: WorkloadKind;

    fn template(&self) -> Option<&PodTemplateSpec>;
}

/// Describes a controller by its pod template's labels and ports.
pub(crate) fn from_template<T: PodTemplated + netmap_k8s_api::ResourceExt>(
    ns: &str,
    resource: &T,
) -> Workload {
    let template = resource.template();
    let labels = template
        .and_then(|t| t.metadata.as_ref())
        .and_then(|m| m.labels.clone());
    let ports = template
        .and_then(|t| t.spec.as_ref())
        .map(pod_ports)
        .unwrap_or_default();
    Workload::new(ns, resource.name_any(), T::KIND)
        .with_labels(labels)
        .with_ports(ports)
}

/// Describes a pod that no controller owns, or returns `None` for controller-managed pods.
pub(crate) fn standalone_pod(ns: &str, pod: &Pod) -> Option<Workload> {
    if pod
        .metadata
        .owner_references
        .as_ref()
        .is_some_and(|refs| !refs.is_empty())
    {
        return None;
    }

    let name = pod.metadata.name.clone()?;
    let ports = pod.spec.as_ref().map(pod_ports).unwrap_or_default();
    Some(
        Workload::new(ns, name, WorkloadKind::Pod)
            .with_labels(pod.metadata.labels.clone())
            .with_ports(ports),
    )
}

fn pod_ports(spec: &PodSpec) -> Vec<Port> {
    container_ports(&spec.containers)
}

/// Collects the ports declared by containers, in declaration order. Invalid port numbers are
/// skipped.
pub(crate) fn container_ports(containers: &[Container]) -> Vec<Port> {
    containers
        .iter()
        .flat_map(|c| c.ports.iter().flatten())
        .filter_map(port)
        .collect()
}

fn port(cp: &ContainerPort) -> Option<Port> {
    let mut port = match Port::try_from(cp.container_port) {
        Ok(port) => port,
        Err(error) => {
            debug!(%error, name = ?cp.name, "Skipping container port");
            return None;
        }
    };
    if let Some(name) = cp.name.as_ref().filter(|n| !n.is_empty()) {
        port = port.with_name(name.clone());
    }
    if let Some(protocol) = cp.protocol.as_deref().filter(|p| !p.is_empty()) {
        port = port.with_protocol(Protocol::from(protocol));
    }
    Some(port)
}

// === impl PodTemplated ===

impl PodTemplated for Deployment {
    const KIND: WorkloadKind = WorkloadKind::Deployment;

    fn template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|spec| &spec.template)
    }
}

impl PodTemplated for StatefulSet {
    const KIND: WorkloadKind = WorkloadKind::StatefulSet;

    fn template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|spec| &spec.template)
    }
}

impl PodTemplated for DaemonSet {
    const KIND: WorkloadKind = WorkloadKind::DaemonSet;

    fn template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|spec| &spec.template)
    }
}
