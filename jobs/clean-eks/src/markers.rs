//! Ownership classification.
//!
//! Two ownership models meet on the same objects: EKS marks its managed
//! add-ons with the `eks.amazonaws.com/component` marker, and Helm recognizes
//! objects that carry its release annotations and managed-by label. This
//! module reads an object's metadata once and answers both questions.

use cluster_client::{ClusterError, ClusterOps, ResourceMeta};
use serde::Serialize;
use tracing::debug;

use crate::targets::TargetRef;

pub const HELM_RELEASE_NAME_ANNOTATION: &str = "meta.helm.sh/release-name";
pub const HELM_RELEASE_NAME: &str = "coredns";

pub const HELM_RELEASE_NAMESPACE_ANNOTATION: &str = "meta.helm.sh/release-namespace";
pub const HELM_RELEASE_NAMESPACE: &str = "kube-system";

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY: &str = "Helm";

/// Marker EKS puts on the add-ons it manages. Observed as a label on some
/// objects and an annotation on others, so both maps are checked.
pub const AMAZON_COMPONENT_MARKER: &str = "eks.amazonaws.com/component";

/// The four facts Helm's ownership model cares about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OwnershipMarkers {
    /// Annotation `meta.helm.sh/release-name` is `coredns`
    pub helm_release_name_set: bool,
    /// Annotation `meta.helm.sh/release-namespace` is `kube-system`
    pub helm_release_namespace_set: bool,
    /// Label `app.kubernetes.io/managed-by` is `Helm`
    pub managed_by_set: bool,
    /// The `eks.amazonaws.com/component` marker is gone
    pub amazon_managed_removed: bool,
}

impl OwnershipMarkers {
    /// Markers of an object that does not exist. Vacuously satisfied on
    /// every count: a Helm release created afterwards owns the name cleanly.
    pub fn absent() -> Self {
        OwnershipMarkers {
            helm_release_name_set: true,
            helm_release_namespace_set: true,
            managed_by_set: true,
            amazon_managed_removed: true,
        }
    }

    /// Read the markers off live metadata.
    pub fn of(meta: &ResourceMeta) -> Self {
        OwnershipMarkers {
            helm_release_name_set: meta
                .annotations
                .get(HELM_RELEASE_NAME_ANNOTATION)
                .is_some_and(|value| value == HELM_RELEASE_NAME),
            helm_release_namespace_set: meta
                .annotations
                .get(HELM_RELEASE_NAMESPACE_ANNOTATION)
                .is_some_and(|value| value == HELM_RELEASE_NAMESPACE),
            managed_by_set: meta
                .labels
                .get(MANAGED_BY_LABEL)
                .is_some_and(|value| value == MANAGED_BY),
            amazon_managed_removed: !has_amazon_marker(meta),
        }
    }

    /// All four facts hold.
    pub fn fully_adopted(&self) -> bool {
        self.helm_release_name_set
            && self.helm_release_namespace_set
            && self.managed_by_set
            && self.amazon_managed_removed
    }
}

/// True when the EKS ownership marker is present in either metadata map.
pub fn has_amazon_marker(meta: &ResourceMeta) -> bool {
    meta.labels.contains_key(AMAZON_COMPONENT_MARKER)
        || meta.annotations.contains_key(AMAZON_COMPONENT_MARKER)
}

/// What one classification pass observed about a managed object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub exists: bool,
    /// Exists and still carries the EKS ownership marker. Only such
    /// instances may be deleted or relabeled; anything else belongs to
    /// someone else already.
    pub amazon_owned: bool,
    pub markers: OwnershipMarkers,
}

impl Classification {
    /// Classification of an object that does not exist.
    pub fn missing() -> Self {
        Classification {
            exists: false,
            amazon_owned: false,
            markers: OwnershipMarkers::absent(),
        }
    }
}

/// Classify one managed object from its live metadata. Read-only.
pub async fn classify(
    cluster: &dyn ClusterOps,
    target: TargetRef,
) -> Result<Classification, ClusterError> {
    match cluster
        .get_metadata(target.kind, target.namespace, target.name)
        .await?
    {
        None => {
            debug!("{} does not exist", target);
            Ok(Classification::missing())
        }
        Some(meta) => {
            let classification = Classification {
                exists: true,
                amazon_owned: has_amazon_marker(&meta),
                markers: OwnershipMarkers::of(&meta),
            };
            debug!(
                "{} exists, amazon_owned={}",
                target, classification.amazon_owned
            );
            Ok(classification)
        }
    }
}
