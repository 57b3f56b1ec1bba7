//! The cleanup job itself.
//!
//! One invocation walks the fixed add-on set in order: capture the DNS
//! service's addresses, delete what removal asks for, delete or adopt the
//! Amazon-owned CoreDNS objects, then re-observe everything into the output
//! record. Any error aborts the remaining sequence; completed mutations are
//! not rolled back, because each one is idempotent and re-running the job is
//! always safe.

use cluster_client::ClusterOps;
use tracing::{info, warn};

use crate::dns::derive_dns_ips;
use crate::error::JobError;
use crate::markers::{self, Classification};
use crate::mutate;
use crate::report::{DesiredState, JobReport};
use crate::targets::{
    AWS_CNI_DAEMONSET, COREDNS_CONFIG_MAP, COREDNS_DEPLOYMENT, COREDNS_POD_DISRUPTION_BUDGET,
    COREDNS_SERVICE, COREDNS_SERVICE_ACCOUNT, DEFAULT_KUBERNETES_SERVICE, KUBE_PROXY_CONFIG_MAP,
    KUBE_PROXY_DAEMONSET, TargetRef,
};

/// One-shot cleanup of a cluster's default add-ons.
pub struct CleanupJob<'a> {
    cluster: &'a dyn ClusterOps,
}

impl<'a> CleanupJob<'a> {
    /// Create a job against a cluster handle.
    pub fn new(cluster: &'a dyn ClusterOps) -> Self {
        Self { cluster }
    }

    /// Run the job once and report the resulting cluster state.
    pub async fn run(&self, desired: DesiredState) -> Result<JobReport, JobError> {
        let import = desired.effective_import();
        if desired.remove_core_dns && desired.import_coredns_to_helm {
            warn!("CoreDNS removal and import both requested, removing");
        }
        info!(
            "Cleaning {}: remove_aws_cni={} remove_kube_proxy={} remove_core_dns={} import_coredns_to_helm={}",
            self.cluster.endpoint(),
            desired.remove_aws_cni,
            desired.remove_kube_proxy,
            desired.remove_core_dns,
            import,
        );

        // DNS service state and addresses, captured before anything is
        // deleted; the replacement chart has to claim the same address.
        let service = self.classify(COREDNS_SERVICE).await?;
        let mut cluster_ips = self.service_ips(COREDNS_SERVICE).await?;
        if cluster_ips.is_empty() {
            let fallback = self.service_ips(DEFAULT_KUBERNETES_SERVICE).await?;
            cluster_ips = derive_dns_ips(fallback);
            if !cluster_ips.is_empty() {
                info!("Derived cluster DNS address {:?}", cluster_ips);
            }
        }

        if desired.any_requested() {
            if desired.remove_aws_cni {
                self.delete(AWS_CNI_DAEMONSET).await?;
            }

            if desired.remove_kube_proxy {
                self.delete(KUBE_PROXY_DAEMONSET).await?;
                self.delete(KUBE_PROXY_CONFIG_MAP).await?;
            }

            if desired.remove_core_dns || import {
                let deployment = self.classify(COREDNS_DEPLOYMENT).await?;
                let service_account = self.classify(COREDNS_SERVICE_ACCOUNT).await?;
                let config_map = self.classify(COREDNS_CONFIG_MAP).await?;
                let pdb = self.classify(COREDNS_POD_DISRUPTION_BUDGET).await?;

                let stack = [
                    (deployment, COREDNS_DEPLOYMENT),
                    (service, COREDNS_SERVICE),
                    (service_account, COREDNS_SERVICE_ACCOUNT),
                    (config_map, COREDNS_CONFIG_MAP),
                    (pdb, COREDNS_POD_DISRUPTION_BUDGET),
                ];

                // Only the Amazon instances are touched; an object someone
                // else already owns is left exactly as it is.
                if desired.remove_core_dns {
                    for (classification, target) in stack {
                        if classification.amazon_owned {
                            self.delete(target).await?;
                        }
                    }
                } else {
                    for (classification, target) in stack {
                        if classification.amazon_owned {
                            self.adopt(target).await?;
                        }
                    }
                }
            }
        }

        let report = self.observe(desired, import, cluster_ips).await?;
        info!(
            "Cleanup finished: cni_pending={} proxy_pending={} dns_removal_pending={} import_pending={}",
            report.remove_aws_cni_pending,
            report.remove_kube_proxy_pending,
            report.remove_core_dns_pending,
            report.import_coredns_to_helm_pending,
        );
        Ok(report)
    }

    /// Re-read every tracked object and fold the observations into the
    /// output record, including what still remains to be done.
    async fn observe(
        &self,
        desired: DesiredState,
        import: bool,
        cluster_ips: Vec<String>,
    ) -> Result<JobReport, JobError> {
        let cni = self.classify(AWS_CNI_DAEMONSET).await?;
        let proxy_daemonset = self.classify(KUBE_PROXY_DAEMONSET).await?;
        let proxy_config_map = self.classify(KUBE_PROXY_CONFIG_MAP).await?;

        let deployment = self.classify(COREDNS_DEPLOYMENT).await?;
        let service = self.classify(COREDNS_SERVICE).await?;
        let service_account = self.classify(COREDNS_SERVICE_ACCOUNT).await?;
        let config_map = self.classify(COREDNS_CONFIG_MAP).await?;
        let pdb = self.classify(COREDNS_POD_DISRUPTION_BUDGET).await?;

        let amazon_dns_left = [&deployment, &service, &service_account, &config_map, &pdb]
            .iter()
            .any(|classification| classification.amazon_owned);

        let mut report = JobReport {
            id: self.cluster.endpoint().to_string(),
            aws_cni_daemonset_exists: cni.exists,
            kube_proxy_daemonset_exists: proxy_daemonset.exists,
            kube_proxy_config_map_exists: proxy_config_map.exists,
            aws_coredns_deployment_exists: deployment.amazon_owned,
            aws_coredns_service_exists: service.amazon_owned,
            aws_coredns_service_account_exists: service_account.amazon_owned,
            aws_coredns_config_map_exists: config_map.amazon_owned,
            aws_coredns_pod_disruption_budget_exists: pdb.amazon_owned,
            aws_coredns_service_cluster_ips: cluster_ips,
            coredns_deployment: deployment.markers,
            coredns_service: service.markers,
            coredns_service_account: service_account.markers,
            coredns_config_map: config_map.markers,
            coredns_pod_disruption_budget: pdb.markers,
            ..JobReport::default()
        };

        report.remove_aws_cni_pending = desired.remove_aws_cni && cni.exists;
        report.remove_kube_proxy_pending =
            desired.remove_kube_proxy && (proxy_daemonset.exists || proxy_config_map.exists);
        report.remove_core_dns_pending = desired.remove_core_dns && amazon_dns_left;
        report.import_coredns_to_helm_pending = import && !report.coredns_fully_imported();

        Ok(report)
    }

    async fn classify(&self, target: TargetRef) -> Result<Classification, JobError> {
        markers::classify(self.cluster, target)
            .await
            .map_err(|source| JobError::Inspect { target, source })
    }

    async fn service_ips(&self, target: TargetRef) -> Result<Vec<String>, JobError> {
        self.cluster
            .service_cluster_ips(target.namespace, target.name)
            .await
            .map_err(|source| JobError::Inspect { target, source })
    }

    async fn delete(&self, target: TargetRef) -> Result<(), JobError> {
        mutate::delete_if_exists(self.cluster, target)
            .await
            .map(|_| ())
            .map_err(|source| JobError::Delete { target, source })
    }

    async fn adopt(&self, target: TargetRef) -> Result<(), JobError> {
        mutate::adopt_into_helm(self.cluster, target)
            .await
            .map_err(|source| JobError::Import { target, source })
    }
}
