//! Integration tests for the cluster client
//!
//! These tests require a reachable cluster.
//! Set CLUSTER_ENDPOINT and CLUSTER_TOKEN environment variables to run.

use cluster_client::{AddonKind, ClusterConfig, ClusterOps};

fn config_from_env() -> ClusterConfig {
    let endpoint = std::env::var("CLUSTER_ENDPOINT")
        .expect("CLUSTER_ENDPOINT environment variable must be set");
    let token = std::env::var("CLUSTER_TOKEN")
        .expect("CLUSTER_TOKEN environment variable must be set");

    ClusterConfig {
        endpoint: Some(endpoint),
        token: Some(token),
        insecure: true,
        ..ClusterConfig::default()
    }
}

#[tokio::test]
#[ignore] // Requires a reachable cluster
async fn test_client_creation() {
    let cluster = config_from_env()
        .connect()
        .await
        .expect("Failed to create client");

    // Test basic API connectivity against an object every cluster has
    let ips = cluster.service_cluster_ips("default", "kubernetes").await;
    assert!(ips.is_ok(), "Failed to read default/kubernetes service");
}

#[tokio::test]
#[ignore]
async fn test_get_metadata_of_missing_object() {
    let cluster = config_from_env()
        .connect()
        .await
        .expect("Failed to create client");

    let meta = cluster
        .get_metadata(AddonKind::ConfigMap, "default", "does-not-exist")
        .await
        .expect("Failed to query config map");
    assert!(meta.is_none());
}

#[tokio::test]
#[ignore]
async fn test_delete_of_missing_object_is_not_an_error() {
    let cluster = config_from_env()
        .connect()
        .await
        .expect("Failed to create client");

    let deleted = cluster
        .delete(AddonKind::ConfigMap, "default", "does-not-exist")
        .await
        .expect("Delete of a missing object must not fail");
    assert!(!deleted);
}
