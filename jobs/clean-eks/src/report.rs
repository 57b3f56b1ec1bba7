//! Desired state and the job's output record.

use serde::Serialize;

use crate::markers::OwnershipMarkers;

/// What the caller wants done. Flags are independent; when CoreDNS removal
/// and import are both requested, removal wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DesiredState {
    pub remove_aws_cni: bool,
    pub remove_kube_proxy: bool,
    pub remove_core_dns: bool,
    pub import_coredns_to_helm: bool,
}

impl Default for DesiredState {
    fn default() -> Self {
        DesiredState {
            remove_aws_cni: true,
            remove_kube_proxy: true,
            remove_core_dns: true,
            import_coredns_to_helm: false,
        }
    }
}

impl DesiredState {
    /// Import only applies when removal is not also requested.
    pub fn effective_import(&self) -> bool {
        self.import_coredns_to_helm && !self.remove_core_dns
    }

    /// Any work requested at all.
    pub fn any_requested(&self) -> bool {
        self.remove_aws_cni
            || self.remove_kube_proxy
            || self.remove_core_dns
            || self.import_coredns_to_helm
    }
}

/// Observed cluster state after the job ran, plus what remains to be done.
///
/// The caller persists this record between invocations; a converged cluster
/// reports every `*_pending` flag false. The `aws_coredns_*_exists` fields
/// report existence of the *Amazon* instance: an object that was already
/// adopted or replaced does not count.
#[derive(Clone, Debug, Default, Serialize)]
pub struct JobReport {
    /// Cluster endpoint; stable identifier of the record
    pub id: String,

    pub remove_aws_cni_pending: bool,
    pub remove_kube_proxy_pending: bool,
    pub remove_core_dns_pending: bool,
    pub import_coredns_to_helm_pending: bool,

    pub aws_cni_daemonset_exists: bool,
    pub kube_proxy_daemonset_exists: bool,
    pub kube_proxy_config_map_exists: bool,

    pub aws_coredns_deployment_exists: bool,
    pub aws_coredns_service_exists: bool,
    pub aws_coredns_service_account_exists: bool,
    pub aws_coredns_config_map_exists: bool,
    pub aws_coredns_pod_disruption_budget_exists: bool,

    /// Cluster IPs the DNS service held before any mutation, or the derived
    /// conventional address when the service was already gone
    pub aws_coredns_service_cluster_ips: Vec<String>,

    pub coredns_deployment: OwnershipMarkers,
    pub coredns_service: OwnershipMarkers,
    pub coredns_service_account: OwnershipMarkers,
    pub coredns_config_map: OwnershipMarkers,
    pub coredns_pod_disruption_budget: OwnershipMarkers,
}

impl JobReport {
    /// All twenty ownership facts across the CoreDNS stack hold.
    pub fn coredns_fully_imported(&self) -> bool {
        self.coredns_deployment.fully_adopted()
            && self.coredns_service.fully_adopted()
            && self.coredns_service_account.fully_adopted()
            && self.coredns_config_map.fully_adopted()
            && self.coredns_pod_disruption_budget.fully_adopted()
    }
}
