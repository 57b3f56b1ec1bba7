//! The fixed set of add-on objects the job manages.
//!
//! EKS installs these under well-known names; they are not configurable.

use std::fmt;

use cluster_client::AddonKind;

/// Namespace every managed add-on lives in.
pub const KUBE_SYSTEM: &str = "kube-system";

/// Identity of one managed cluster object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetRef {
    pub kind: AddonKind,
    pub namespace: &'static str,
    pub name: &'static str,
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// The AWS VPC CNI daemonset.
pub const AWS_CNI_DAEMONSET: TargetRef = TargetRef {
    kind: AddonKind::DaemonSet,
    namespace: KUBE_SYSTEM,
    name: "aws-node",
};

/// The kube-proxy daemonset.
pub const KUBE_PROXY_DAEMONSET: TargetRef = TargetRef {
    kind: AddonKind::DaemonSet,
    namespace: KUBE_SYSTEM,
    name: "kube-proxy",
};

/// The kube-proxy configuration.
pub const KUBE_PROXY_CONFIG_MAP: TargetRef = TargetRef {
    kind: AddonKind::ConfigMap,
    namespace: KUBE_SYSTEM,
    name: "kube-proxy",
};

/// The CoreDNS deployment.
pub const COREDNS_DEPLOYMENT: TargetRef = TargetRef {
    kind: AddonKind::Deployment,
    namespace: KUBE_SYSTEM,
    name: "coredns",
};

/// The cluster DNS service; named kube-dns for kubelet compatibility.
pub const COREDNS_SERVICE: TargetRef = TargetRef {
    kind: AddonKind::Service,
    namespace: KUBE_SYSTEM,
    name: "kube-dns",
};

/// The CoreDNS service account.
pub const COREDNS_SERVICE_ACCOUNT: TargetRef = TargetRef {
    kind: AddonKind::ServiceAccount,
    namespace: KUBE_SYSTEM,
    name: "coredns",
};

/// The Corefile configuration.
pub const COREDNS_CONFIG_MAP: TargetRef = TargetRef {
    kind: AddonKind::ConfigMap,
    namespace: KUBE_SYSTEM,
    name: "coredns",
};

/// The CoreDNS pod disruption budget.
pub const COREDNS_POD_DISRUPTION_BUDGET: TargetRef = TargetRef {
    kind: AddonKind::PodDisruptionBudget,
    namespace: KUBE_SYSTEM,
    name: "coredns",
};

/// The API server service, read only to infer cluster DNS addressing.
pub const DEFAULT_KUBERNETES_SERVICE: TargetRef = TargetRef {
    kind: AddonKind::Service,
    namespace: "default",
    name: "kubernetes",
};
