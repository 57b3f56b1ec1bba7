//! Live cluster adapter
//!
//! Implements [`ClusterOps`] over a `kube::Client`. The six managed resource
//! kinds share one generic get/delete/patch path; the per-kind dispatch is a
//! single `match` on [`AddonKind`].

use std::fmt::Debug;

use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::{ConfigMap, Service, ServiceAccount};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use kube::api::{Api, DeleteParams, Patch, PatchParams};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cluster_trait::ClusterOps;
use crate::error::ClusterError;
use crate::models::{AddonKind, MetadataPatch, ResourceMeta};

/// Cluster API adapter backed by a live `kube::Client`.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
    endpoint: String,
}

impl Debug for KubeCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeCluster")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl KubeCluster {
    /// Wrap an already-built client.
    ///
    /// `endpoint` is the cluster URL the client talks to; it doubles as the
    /// stable identifier of the job's output record.
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn get_meta_of<K>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ResourceMeta>, ClusterError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        match self.api::<K>(namespace).get(name).await {
            Ok(object) => Ok(Some(ResourceMeta::from(object.meta()))),
            Err(err) => {
                let classified =
                    ClusterError::from_api(err, &format!("{}/{}", namespace, name));
                if classified.is_not_found() {
                    Ok(None)
                } else {
                    Err(classified)
                }
            }
        }
    }

    async fn delete_of<K>(&self, namespace: &str, name: &str) -> Result<bool, ClusterError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        match self
            .api::<K>(namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let classified =
                    ClusterError::from_api(err, &format!("{}/{}", namespace, name));
                if classified.is_not_found() {
                    Ok(false)
                } else {
                    Err(classified)
                }
            }
        }
    }

    async fn patch_meta_of<K>(
        &self,
        namespace: &str,
        name: &str,
        patch: &MetadataPatch,
    ) -> Result<(), ClusterError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        let body = patch.to_merge_patch();
        debug!("Patching {}/{} metadata", namespace, name);
        self.api::<K>(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&body))
            .await
            .map_err(|err| ClusterError::from_api(err, &format!("{}/{}", namespace, name)))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ClusterOps for KubeCluster {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_metadata(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ResourceMeta>, ClusterError> {
        match kind {
            AddonKind::DaemonSet => self.get_meta_of::<DaemonSet>(namespace, name).await,
            AddonKind::Deployment => self.get_meta_of::<Deployment>(namespace, name).await,
            AddonKind::Service => self.get_meta_of::<Service>(namespace, name).await,
            AddonKind::ServiceAccount => {
                self.get_meta_of::<ServiceAccount>(namespace, name).await
            }
            AddonKind::ConfigMap => self.get_meta_of::<ConfigMap>(namespace, name).await,
            AddonKind::PodDisruptionBudget => {
                self.get_meta_of::<PodDisruptionBudget>(namespace, name).await
            }
        }
    }

    async fn delete(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
    ) -> Result<bool, ClusterError> {
        match kind {
            AddonKind::DaemonSet => self.delete_of::<DaemonSet>(namespace, name).await,
            AddonKind::Deployment => self.delete_of::<Deployment>(namespace, name).await,
            AddonKind::Service => self.delete_of::<Service>(namespace, name).await,
            AddonKind::ServiceAccount => self.delete_of::<ServiceAccount>(namespace, name).await,
            AddonKind::ConfigMap => self.delete_of::<ConfigMap>(namespace, name).await,
            AddonKind::PodDisruptionBudget => {
                self.delete_of::<PodDisruptionBudget>(namespace, name).await
            }
        }
    }

    async fn patch_metadata(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
        patch: &MetadataPatch,
    ) -> Result<(), ClusterError> {
        match kind {
            AddonKind::DaemonSet => self.patch_meta_of::<DaemonSet>(namespace, name, patch).await,
            AddonKind::Deployment => {
                self.patch_meta_of::<Deployment>(namespace, name, patch).await
            }
            AddonKind::Service => self.patch_meta_of::<Service>(namespace, name, patch).await,
            AddonKind::ServiceAccount => {
                self.patch_meta_of::<ServiceAccount>(namespace, name, patch).await
            }
            AddonKind::ConfigMap => self.patch_meta_of::<ConfigMap>(namespace, name, patch).await,
            AddonKind::PodDisruptionBudget => {
                self.patch_meta_of::<PodDisruptionBudget>(namespace, name, patch)
                    .await
            }
        }
    }

    async fn service_cluster_ips(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<String>, ClusterError> {
        let api: Api<Service> = self.api(namespace);
        let service = match api.get(name).await {
            Ok(service) => service,
            Err(err) => {
                let classified =
                    ClusterError::from_api(err, &format!("{}/{}", namespace, name));
                if classified.is_not_found() {
                    return Ok(Vec::new());
                }
                return Err(classified);
            }
        };

        let spec = service.spec.unwrap_or_default();
        if let Some(ips) = spec.cluster_ips {
            if !ips.is_empty() {
                return Ok(ips);
            }
        }
        Ok(spec.cluster_ip.into_iter().collect())
    }
}
