//! Mock cluster for unit testing
//!
//! This module provides an in-memory implementation of [`ClusterOps`] that can
//! be used in unit tests without requiring a running cluster.
//!
//! Beyond the plain store it tracks successful writes and deletes, so tests
//! can assert that a converged run performs no further mutations, and it can
//! inject optimistic-concurrency conflicts to exercise the retry path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cluster_trait::ClusterOps;
use crate::error::ClusterError;
use crate::models::{AddonKind, MetadataPatch, ResourceMeta};

type ObjectKey = (AddonKind, String, String);

/// Mock cluster for testing
#[derive(Clone, Debug, Default)]
pub struct MockCluster {
    endpoint: String,
    objects: Arc<Mutex<HashMap<ObjectKey, ResourceMeta>>>,
    service_ips: Arc<Mutex<HashMap<(String, String), Vec<String>>>>,
    // Keys whose reads fail with a transport-style error
    broken_reads: Arc<Mutex<Vec<ObjectKey>>>,
    // Number of upcoming patches to reject with a conflict; each rejection
    // also bumps the stored resource version, like an external writer would
    pending_conflicts: Arc<Mutex<u32>>,
    patch_attempts: Arc<Mutex<u32>>,
    writes: Arc<Mutex<u32>>,
    deletes: Arc<Mutex<u32>>,
    next_version: Arc<Mutex<u64>>,
}

impl MockCluster {
    /// Create a new mock cluster
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            next_version: Arc::new(Mutex::new(1)),
            ..Self::default()
        }
    }

    fn key(kind: AddonKind, namespace: &str, name: &str) -> ObjectKey {
        (kind, namespace.to_string(), name.to_string())
    }

    fn bump_version(&self) -> String {
        let mut version = self.next_version.lock().expect("version lock");
        let current = *version;
        *version += 1;
        current.to_string()
    }

    /// Add an object to the mock store (for test setup)
    pub fn add_object(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
        labels: &[(&str, &str)],
        annotations: &[(&str, &str)],
    ) {
        let meta = ResourceMeta {
            resource_version: Some(self.bump_version()),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        self.objects
            .lock()
            .expect("object lock")
            .insert(Self::key(kind, namespace, name), meta);
    }

    /// Add a service with cluster IPs to the mock store (for test setup)
    pub fn add_service(
        &self,
        namespace: &str,
        name: &str,
        labels: &[(&str, &str)],
        annotations: &[(&str, &str)],
        cluster_ips: &[&str],
    ) {
        self.add_object(AddonKind::Service, namespace, name, labels, annotations);
        self.service_ips.lock().expect("service ip lock").insert(
            (namespace.to_string(), name.to_string()),
            cluster_ips.iter().map(|ip| (*ip).to_string()).collect(),
        );
    }

    /// Make reads of one object fail with a transport-style error
    pub fn break_reads_of(&self, kind: AddonKind, namespace: &str, name: &str) {
        self.broken_reads
            .lock()
            .expect("broken read lock")
            .push(Self::key(kind, namespace, name));
    }

    /// Reject the next `count` patches with a conflict, bumping the stored
    /// resource version each time as an external modification would
    pub fn inject_update_conflicts(&self, count: u32) {
        *self.pending_conflicts.lock().expect("conflict lock") = count;
    }

    /// True when the object is present in the store
    pub fn contains(&self, kind: AddonKind, namespace: &str, name: &str) -> bool {
        self.objects
            .lock()
            .expect("object lock")
            .contains_key(&Self::key(kind, namespace, name))
    }

    /// Current metadata of an object (for assertions)
    pub fn metadata_of(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
    ) -> Option<ResourceMeta> {
        self.objects
            .lock()
            .expect("object lock")
            .get(&Self::key(kind, namespace, name))
            .cloned()
    }

    /// Number of patches attempted, including rejected ones
    pub fn patch_attempts(&self) -> u32 {
        *self.patch_attempts.lock().expect("attempt lock")
    }

    /// Number of successful metadata writes
    pub fn writes(&self) -> u32 {
        *self.writes.lock().expect("write lock")
    }

    /// Number of objects actually deleted
    pub fn deletes(&self) -> u32 {
        *self.deletes.lock().expect("delete lock")
    }

    fn read_error(&self, key: &ObjectKey) -> Option<ClusterError> {
        let broken = self.broken_reads.lock().expect("broken read lock");
        broken.contains(key).then(|| {
            ClusterError::InvalidConfig(format!(
                "injected read failure for {} {}/{}",
                key.0, key.1, key.2
            ))
        })
    }
}

#[async_trait::async_trait]
impl ClusterOps for MockCluster {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_metadata(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ResourceMeta>, ClusterError> {
        let key = Self::key(kind, namespace, name);
        if let Some(err) = self.read_error(&key) {
            return Err(err);
        }
        Ok(self.objects.lock().expect("object lock").get(&key).cloned())
    }

    async fn delete(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
    ) -> Result<bool, ClusterError> {
        let key = Self::key(kind, namespace, name);
        let removed = self
            .objects
            .lock()
            .expect("object lock")
            .remove(&key)
            .is_some();
        if removed {
            *self.deletes.lock().expect("delete lock") += 1;
        }
        Ok(removed)
    }

    async fn patch_metadata(
        &self,
        kind: AddonKind,
        namespace: &str,
        name: &str,
        patch: &MetadataPatch,
    ) -> Result<(), ClusterError> {
        let key = Self::key(kind, namespace, name);
        *self.patch_attempts.lock().expect("attempt lock") += 1;

        let next_version = self.bump_version();
        let mut objects = self.objects.lock().expect("object lock");
        let Some(meta) = objects.get_mut(&key) else {
            return Err(ClusterError::NotFound(format!(
                "{} {}/{}",
                kind, namespace, name
            )));
        };

        let mut conflicts = self.pending_conflicts.lock().expect("conflict lock");
        if *conflicts > 0 {
            *conflicts -= 1;
            meta.resource_version = Some(next_version);
            return Err(ClusterError::Conflict(format!(
                "{} {}/{}: injected external modification",
                kind, namespace, name
            )));
        }

        if patch.resource_version != meta.resource_version {
            return Err(ClusterError::Conflict(format!(
                "{} {}/{}: resource version mismatch",
                kind, namespace, name
            )));
        }

        patch.apply_to(meta);
        meta.resource_version = Some(next_version);
        *self.writes.lock().expect("write lock") += 1;
        Ok(())
    }

    async fn service_cluster_ips(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<String>, ClusterError> {
        let key = Self::key(AddonKind::Service, namespace, name);
        if let Some(err) = self.read_error(&key) {
            return Err(err);
        }
        if !self.objects.lock().expect("object lock").contains_key(&key) {
            return Ok(Vec::new());
        }
        Ok(self
            .service_ips
            .lock()
            .expect("service ip lock")
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
