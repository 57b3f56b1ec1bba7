//! Mutation primitives.
//!
//! Every state change the job makes goes through one of two operations:
//! delete-if-exists, or a read-modify-write of an object's metadata with
//! bounded retry on optimistic-concurrency conflicts. Both are idempotent,
//! which is what makes re-running the whole job after a partial failure the
//! only recovery path anyone needs.

use std::time::Duration;

use cluster_client::{ClusterError, ClusterOps, MetadataPatch, ResourceMeta};
use tracing::{debug, info};

use crate::markers::{
    AMAZON_COMPONENT_MARKER, HELM_RELEASE_NAME, HELM_RELEASE_NAME_ANNOTATION,
    HELM_RELEASE_NAMESPACE, HELM_RELEASE_NAMESPACE_ANNOTATION, MANAGED_BY, MANAGED_BY_LABEL,
};
use crate::targets::TargetRef;

/// Attempts per metadata update before a conflict is surfaced.
const UPDATE_CONFLICT_ATTEMPTS: u32 = 5;

/// Pause between conflicting attempts.
const UPDATE_CONFLICT_DELAY: Duration = Duration::from_millis(10);

/// Delete an object if it exists. Already-gone is success, not an error.
pub async fn delete_if_exists(
    cluster: &dyn ClusterOps,
    target: TargetRef,
) -> Result<bool, ClusterError> {
    let deleted = cluster
        .delete(target.kind, target.namespace, target.name)
        .await?;
    if deleted {
        info!("Deleted {}", target);
    } else {
        debug!("{} already absent", target);
    }
    Ok(deleted)
}

/// Read-modify-write an object's metadata.
///
/// `patch_fn` mutates a private copy and reports whether it changed
/// anything; an unchanged copy means no write is issued at all. A conflicted
/// write restarts the cycle from a fresh read, up to
/// [`UPDATE_CONFLICT_ATTEMPTS`] times. An object that does not exist (or
/// disappears mid-cycle) is a vacuous success.
pub async fn update_metadata_with_retry<F>(
    cluster: &dyn ClusterOps,
    target: TargetRef,
    patch_fn: F,
) -> Result<(), ClusterError>
where
    F: Fn(&mut ResourceMeta) -> bool,
{
    let mut attempt = 0;
    loop {
        attempt += 1;

        let Some(current) = cluster
            .get_metadata(target.kind, target.namespace, target.name)
            .await?
        else {
            debug!("{} does not exist, nothing to update", target);
            return Ok(());
        };

        let mut desired = current.clone();
        if !patch_fn(&mut desired) {
            debug!("{} already has the desired metadata", target);
            return Ok(());
        }

        let patch = MetadataPatch::between(&current, &desired);
        match cluster
            .patch_metadata(target.kind, target.namespace, target.name, &patch)
            .await
        {
            Ok(()) => {
                info!("Updated metadata of {}", target);
                return Ok(());
            }
            Err(err) if err.is_conflict() && attempt < UPDATE_CONFLICT_ATTEMPTS => {
                debug!(
                    "Conflict updating {} (attempt {}), retrying from a fresh read",
                    target, attempt
                );
                tokio::time::sleep(UPDATE_CONFLICT_DELAY).await;
            }
            Err(ClusterError::NotFound(_)) => {
                debug!("{} disappeared during update", target);
                return Ok(());
            }
            Err(err) => return Err(err),
        }
    }
}

/// The metadata change that hands an object to Helm: set the release-name
/// and release-namespace annotations, set the managed-by label, and drop the
/// EKS ownership marker from both maps. Reports whether anything changed, so
/// a second pass over an adopted object writes nothing.
pub fn helm_adoption_patch(meta: &mut ResourceMeta) -> bool {
    let mut changed = false;

    if meta.annotations.get(HELM_RELEASE_NAME_ANNOTATION)
        != Some(&HELM_RELEASE_NAME.to_string())
    {
        meta.annotations.insert(
            HELM_RELEASE_NAME_ANNOTATION.to_string(),
            HELM_RELEASE_NAME.to_string(),
        );
        changed = true;
    }

    if meta.annotations.get(HELM_RELEASE_NAMESPACE_ANNOTATION)
        != Some(&HELM_RELEASE_NAMESPACE.to_string())
    {
        meta.annotations.insert(
            HELM_RELEASE_NAMESPACE_ANNOTATION.to_string(),
            HELM_RELEASE_NAMESPACE.to_string(),
        );
        changed = true;
    }

    if meta.labels.get(MANAGED_BY_LABEL) != Some(&MANAGED_BY.to_string()) {
        meta.labels
            .insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY.to_string());
        changed = true;
    }

    if meta.labels.remove(AMAZON_COMPONENT_MARKER).is_some() {
        changed = true;
    }
    if meta.annotations.remove(AMAZON_COMPONENT_MARKER).is_some() {
        changed = true;
    }

    changed
}

/// Hand one object over to Helm's ownership model.
pub async fn adopt_into_helm(
    cluster: &dyn ClusterOps,
    target: TargetRef,
) -> Result<(), ClusterError> {
    update_metadata_with_retry(cluster, target, helm_adoption_patch).await
}
