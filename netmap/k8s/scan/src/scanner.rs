use crate::{policy, workload};
use anyhow::{Context, Result};
use netmap_core::{NamespaceInfo, Policy, Workload};
use netmap_k8s_api::{
    istio, Api, ApiResource, Client, DaemonSet, Deployment, DynamicObject, ListParams, Namespace,
    NamespaceResourceScope, NetworkPolicy, Pod, Resource, StatefulSet,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{debug, info, instrument, warn};

/// Reads workloads and policies from a cluster.
#[derive(Clone)]
pub struct Scanner {
    client: Client,
    authorization_policies: ApiResource,
}

/// Everything read from the scanned namespaces, in scan order.
#[derive(Clone, Debug, Default)]
pub struct Resources {
    pub namespaces: Vec<NamespaceInfo>,
    pub workloads: Vec<Workload>,
    pub policies: Vec<Policy>,
}

impl Scanner {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            authorization_policies: ApiResource::erase::<istio::AuthorizationPolicy>(&()),
        }
    }

    /// Scans each namespace in turn. Namespaces that do not exist are skipped; any other API
    /// failure aborts the scan, except that AuthorizationPolicies are optional.
    #[instrument(skip(self))]
    pub async fn scan(&self, namespaces: &[String]) -> Result<Resources> {
        let mut resources = Resources::default();
        for ns in namespaces {
            let Some(info) = self.namespace(ns).await? else {
                warn!(namespace = %ns, "Namespace not found");
                continue;
            };
            resources.namespaces.push(info);
            self.scan_workloads(ns, &mut resources.workloads).await?;
            self.scan_policies(ns, &mut resources.policies).await?;
        }

        info!(
            namespaces = resources.namespaces.len(),
            workloads = resources.workloads.len(),
            policies = resources.policies.len(),
            "Scanned cluster"
        );
        Ok(resources)
    }

    async fn namespace(&self, name: &str) -> Result<Option<NamespaceInfo>> {
        let ns = Api::<Namespace>::all(self.client.clone())
            .get_opt(name)
            .await
            .with_context(|| format!("failed to get namespace {name}"))?;
        Ok(ns.map(|ns| NamespaceInfo {
            name: name.to_string(),
            labels: ns.metadata.labels.into(),
        }))
    }

    async fn scan_workloads(&self, ns: &str, workloads: &mut Vec<Workload>) -> Result<()> {
        for deploy in self.list::<Deployment>(ns).await? {
            workloads.push(workload::from_template(ns, &deploy));
        }
        for set in self.list::<StatefulSet>(ns).await? {
            workloads.push(workload::from_template(ns, &set));
        }
        for set in self.list::<DaemonSet>(ns).await? {
            workloads.push(workload::from_template(ns, &set));
        }
        for pod in self.list::<Pod>(ns).await? {
            if let Some(workload) = workload::standalone_pod(ns, &pod) {
                workloads.push(workload);
            }
        }
        Ok(())
    }

    async fn scan_policies(&self, ns: &str, policies: &mut Vec<Policy>) -> Result<()> {
        for np in self.list::<NetworkPolicy>(ns).await? {
            policies.push(policy::network_policy(ns, &np).into());
        }

        let api = Api::<DynamicObject>::namespaced_with(
            self.client.clone(),
            ns,
            &self.authorization_policies,
        );
        let aps = match api.list(&ListParams::default()).await {
            Ok(list) => list.items,
            Err(error) => {
                warn!(namespace = %ns, %error, "Failed to list AuthorizationPolicies");
                return Ok(());
            }
        };
        for ap in aps {
            match policy::authorization_policy(ns, &ap) {
                Ok(ap) => policies.push(ap.into()),
                Err(error) => {
                    warn!(
                        namespace = %ns,
                        name = ?ap.metadata.name,
                        error = format!("{error:#}"),
                        "Skipping AuthorizationPolicy"
                    );
                }
            }
        }
        Ok(())
    }

    async fn list<K>(&self, ns: &str) -> Result<Vec<K>>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + Debug + DeserializeOwned,
        K::DynamicType: Default,
    {
        let kind = K::kind(&Default::default()).into_owned();
        let list = Api::<K>::namespaced(self.client.clone(), ns)
            .list(&ListParams::default())
            .await
            .with_context(|| format!("failed to list {kind} in namespace {ns}"))?;
        debug!(namespace = %ns, %kind, items = list.items.len(), "Listed");
        Ok(list.items)
    }
}
