#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod istio;

pub use k8s_openapi::{
    api::{
        self,
        apps::v1::{DaemonSet, Deployment, StatefulSet},
        core::v1::{Container, ContainerPort, Namespace, Pod, PodSpec, PodTemplateSpec},
        networking::v1::{
            IPBlock, NetworkPolicy, NetworkPolicyIngressRule, NetworkPolicyPeer,
            NetworkPolicyPort, NetworkPolicySpec,
        },
    },
    apimachinery::pkg::{
        apis::meta::v1::{LabelSelector, LabelSelectorRequirement},
        util::intstr::IntOrString,
    },
    NamespaceResourceScope,
};
pub use kube::{
    api::{Api, ApiResource, DynamicObject, ListParams, ObjectMeta},
    Client, Resource, ResourceExt,
};
