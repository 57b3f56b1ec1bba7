//! Unit tests for ownership classification

#[cfg(test)]
mod tests {
    use cluster_client::{AddonKind, ClusterError, MockCluster, ResourceMeta};

    use crate::markers::{
        AMAZON_COMPONENT_MARKER, Classification, OwnershipMarkers, classify, has_amazon_marker,
    };
    use crate::targets::{COREDNS_DEPLOYMENT, COREDNS_SERVICE};

    fn meta(labels: &[(&str, &str)], annotations: &[(&str, &str)]) -> ResourceMeta {
        ResourceMeta {
            resource_version: Some("1".to_string()),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn fresh_eks_object_has_no_helm_markers() {
        let markers = OwnershipMarkers::of(&meta(
            &[(AMAZON_COMPONENT_MARKER, "coredns")],
            &[],
        ));
        assert!(!markers.helm_release_name_set);
        assert!(!markers.helm_release_namespace_set);
        assert!(!markers.managed_by_set);
        assert!(!markers.amazon_managed_removed);
        assert!(!markers.fully_adopted());
    }

    #[test]
    fn adopted_object_satisfies_all_markers() {
        let markers = OwnershipMarkers::of(&meta(
            &[("app.kubernetes.io/managed-by", "Helm")],
            &[
                ("meta.helm.sh/release-name", "coredns"),
                ("meta.helm.sh/release-namespace", "kube-system"),
            ],
        ));
        assert!(markers.fully_adopted());
    }

    #[test]
    fn wrong_marker_values_do_not_count() {
        let markers = OwnershipMarkers::of(&meta(
            &[("app.kubernetes.io/managed-by", "kustomize")],
            &[
                ("meta.helm.sh/release-name", "other-release"),
                ("meta.helm.sh/release-namespace", "kube-system"),
            ],
        ));
        assert!(!markers.helm_release_name_set);
        assert!(markers.helm_release_namespace_set);
        assert!(!markers.managed_by_set);
        assert!(markers.amazon_managed_removed);
    }

    #[test]
    fn amazon_marker_is_detected_in_either_map() {
        assert!(has_amazon_marker(&meta(
            &[(AMAZON_COMPONENT_MARKER, "coredns")],
            &[],
        )));
        assert!(has_amazon_marker(&meta(
            &[],
            &[(AMAZON_COMPONENT_MARKER, "coredns")],
        )));
        assert!(!has_amazon_marker(&meta(&[("app", "coredns")], &[])));
    }

    #[test]
    fn missing_object_is_vacuously_adopted() {
        let classification = Classification::missing();
        assert!(!classification.exists);
        assert!(!classification.amazon_owned);
        assert!(classification.markers.fully_adopted());
    }

    #[tokio::test]
    async fn classify_missing_object() {
        let cluster = MockCluster::new("https://example");
        let classification = classify(&cluster, COREDNS_DEPLOYMENT)
            .await
            .expect("classify");
        assert_eq!(classification, Classification::missing());
    }

    #[tokio::test]
    async fn classify_amazon_owned_object() {
        let cluster = MockCluster::new("https://example");
        cluster.add_object(
            AddonKind::Deployment,
            "kube-system",
            "coredns",
            &[(AMAZON_COMPONENT_MARKER, "coredns")],
            &[],
        );

        let classification = classify(&cluster, COREDNS_DEPLOYMENT)
            .await
            .expect("classify");
        assert!(classification.exists);
        assert!(classification.amazon_owned);
        assert!(!classification.markers.fully_adopted());
    }

    #[tokio::test]
    async fn classify_surfaces_read_failures() {
        let cluster = MockCluster::new("https://example");
        cluster.add_service("kube-system", "kube-dns", &[], &[], &["172.20.0.10"]);
        cluster.break_reads_of(AddonKind::Service, "kube-system", "kube-dns");

        let err = classify(&cluster, COREDNS_SERVICE)
            .await
            .expect_err("read failure must surface");
        assert!(!matches!(err, ClusterError::NotFound(_)));
    }
}
