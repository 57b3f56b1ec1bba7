//! ClusterOps trait for mocking
//!
//! This trait abstracts the cluster API handle so the reconciliation core can
//! run against either a live cluster or an in-memory mock in unit tests.

use crate::error::ClusterError;
use crate::models::{AddonKind, MetadataPatch, ResourceMeta};

/// Trait for the cluster operations the cleanup job performs
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterOps: Send + Sync {
    /// API endpoint this handle is connected to
    fn endpoint(&self) -> &str;

    /// Fetch the metadata of an add-on object; `Ok(None)` when it does not exist
    async fn get_metadata(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ResourceMeta>, ClusterError>;

    /// Delete an add-on object; `Ok(false)` when it was already gone
    async fn delete(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
    ) -> Result<bool, ClusterError>;

    /// Apply a metadata patch.
    ///
    /// Returns [`ClusterError::Conflict`] when the resource version pinned in
    /// the patch no longer matches the live object, and
    /// [`ClusterError::NotFound`] when the object has disappeared.
    async fn patch_metadata(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
        patch: &MetadataPatch,
    ) -> Result<(), ClusterError>;

    /// Cluster IPs of a service; empty when the service does not exist
    async fn service_cluster_ips(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<String>, ClusterError>;
}
