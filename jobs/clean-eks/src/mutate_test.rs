//! Unit tests for the mutation primitives

#[cfg(test)]
mod tests {
    use cluster_client::{AddonKind, ClusterError, ClusterOps, MockCluster, ResourceMeta};

    use crate::markers::{AMAZON_COMPONENT_MARKER, OwnershipMarkers};
    use crate::mutate::{
        adopt_into_helm, delete_if_exists, helm_adoption_patch, update_metadata_with_retry,
    };
    use crate::targets::{AWS_CNI_DAEMONSET, COREDNS_DEPLOYMENT};

    fn amazon_owned_meta() -> ResourceMeta {
        let mut meta = ResourceMeta::default();
        meta.labels
            .insert(AMAZON_COMPONENT_MARKER.to_string(), "coredns".to_string());
        meta
    }

    #[test]
    fn adoption_patch_sets_all_markers() {
        let mut meta = amazon_owned_meta();
        assert!(helm_adoption_patch(&mut meta));
        assert!(OwnershipMarkers::of(&meta).fully_adopted());
    }

    #[test]
    fn adoption_patch_clears_marker_from_both_maps() {
        let mut meta = amazon_owned_meta();
        meta.annotations
            .insert(AMAZON_COMPONENT_MARKER.to_string(), "coredns".to_string());
        assert!(helm_adoption_patch(&mut meta));
        assert!(!meta.labels.contains_key(AMAZON_COMPONENT_MARKER));
        assert!(!meta.annotations.contains_key(AMAZON_COMPONENT_MARKER));
    }

    #[test]
    fn adoption_patch_is_idempotent() {
        let mut meta = amazon_owned_meta();
        assert!(helm_adoption_patch(&mut meta));
        // A second pass over the already-adopted metadata changes nothing
        assert!(!helm_adoption_patch(&mut meta.clone()));
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let cluster = MockCluster::new("https://example");
        cluster.add_object(AddonKind::DaemonSet, "kube-system", "aws-node", &[], &[]);

        assert!(delete_if_exists(&cluster, AWS_CNI_DAEMONSET)
            .await
            .expect("delete"));
        assert!(!delete_if_exists(&cluster, AWS_CNI_DAEMONSET)
            .await
            .expect("second delete"));
        assert_eq!(cluster.deletes(), 1);
    }

    #[tokio::test]
    async fn adoption_writes_once_and_converges() {
        let cluster = MockCluster::new("https://example");
        cluster.add_object(
            AddonKind::Deployment,
            "kube-system",
            "coredns",
            &[(AMAZON_COMPONENT_MARKER, "coredns")],
            &[],
        );

        adopt_into_helm(&cluster, COREDNS_DEPLOYMENT)
            .await
            .expect("adopt");
        assert_eq!(cluster.writes(), 1);

        let meta = cluster
            .metadata_of(AddonKind::Deployment, "kube-system", "coredns")
            .expect("deployment present");
        assert!(OwnershipMarkers::of(&meta).fully_adopted());

        // Re-adoption of a converged object issues no write at all
        adopt_into_helm(&cluster, COREDNS_DEPLOYMENT)
            .await
            .expect("re-adopt");
        assert_eq!(cluster.writes(), 1);
    }

    #[tokio::test]
    async fn adoption_of_missing_object_is_a_no_op() {
        let cluster = MockCluster::new("https://example");
        adopt_into_helm(&cluster, COREDNS_DEPLOYMENT)
            .await
            .expect("adopting a missing object must not fail");
        assert_eq!(cluster.patch_attempts(), 0);
    }

    #[tokio::test]
    async fn single_conflict_causes_exactly_one_retry() {
        let cluster = MockCluster::new("https://example");
        cluster.add_object(
            AddonKind::Deployment,
            "kube-system",
            "coredns",
            &[(AMAZON_COMPONENT_MARKER, "coredns")],
            &[],
        );
        cluster.inject_update_conflicts(1);

        adopt_into_helm(&cluster, COREDNS_DEPLOYMENT)
            .await
            .expect("adopt with one conflict");

        // First attempt rejected, one full re-read/re-write cycle after it
        assert_eq!(cluster.patch_attempts(), 2);
        assert_eq!(cluster.writes(), 1);
        let meta = cluster
            .metadata_of(AddonKind::Deployment, "kube-system", "coredns")
            .expect("deployment present");
        assert!(OwnershipMarkers::of(&meta).fully_adopted());
    }

    #[tokio::test]
    async fn conflict_retries_are_bounded() {
        let cluster = MockCluster::new("https://example");
        cluster.add_object(
            AddonKind::Deployment,
            "kube-system",
            "coredns",
            &[(AMAZON_COMPONENT_MARKER, "coredns")],
            &[],
        );
        // More injected conflicts than the retry budget
        cluster.inject_update_conflicts(10);

        let err = adopt_into_helm(&cluster, COREDNS_DEPLOYMENT)
            .await
            .expect_err("exhausted retries must surface the conflict");
        assert!(err.is_conflict());
        assert_eq!(cluster.patch_attempts(), 5);
        assert_eq!(cluster.writes(), 0);
    }

    #[tokio::test]
    async fn unchanged_metadata_is_never_written() {
        let cluster = MockCluster::new("https://example");
        cluster.add_object(AddonKind::Deployment, "kube-system", "coredns", &[], &[]);

        update_metadata_with_retry(&cluster, COREDNS_DEPLOYMENT, |_| false)
            .await
            .expect("no-op update");
        assert_eq!(cluster.patch_attempts(), 0);
    }

    #[tokio::test]
    async fn stale_resource_version_is_rejected() {
        let cluster = MockCluster::new("https://example");
        cluster.add_object(AddonKind::Deployment, "kube-system", "coredns", &[], &[]);

        let current = cluster
            .metadata_of(AddonKind::Deployment, "kube-system", "coredns")
            .expect("present");
        let mut desired = current.clone();
        desired.labels.insert("z".to_string(), "w".to_string());
        let mut patch = cluster_client::MetadataPatch::between(&current, &desired);
        patch.resource_version = Some("0".to_string());

        let err = cluster
            .patch_metadata(AddonKind::Deployment, "kube-system", "coredns", &patch)
            .await
            .expect_err("stale version rejected");
        assert!(matches!(err, ClusterError::Conflict(_)));
        assert_eq!(cluster.writes(), 0);
    }
}
