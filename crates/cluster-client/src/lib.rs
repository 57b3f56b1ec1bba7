//! Kubernetes API adapter for the clean-eks cleanup job
//!
//! Wraps `kube` behind the small surface the cleanup job needs for the six
//! add-on resource kinds it manages: read metadata, delete, patch metadata
//! with optimistic concurrency, and read service cluster IPs.
//!
//! # Example
//!
//! ```no_run
//! use cluster_client::{AddonKind, ClusterConfig, ClusterOps};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Connect using explicit credentials
//! let config = ClusterConfig {
//!     endpoint: Some("https://example.eks.amazonaws.com".to_string()),
//!     token: Some("bearer-token".to_string()),
//!     ..ClusterConfig::default()
//! };
//! let cluster = config.connect().await?;
//!
//! // Read the metadata of an add-on object
//! let meta = cluster
//!     .get_metadata(AddonKind::DaemonSet, "kube-system", "aws-node")
//!     .await?;
//! println!("aws-node present: {}", meta.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Typed adapter table**: one generic get/delete/patch path dispatched
//!   over [`AddonKind`] instead of per-kind copies
//! - **Optimistic concurrency**: metadata patches carry the observed
//!   resource version and surface conflicts as [`ClusterError::Conflict`]
//! - **Mocking**: `MockCluster` behind the `test-util` feature for unit
//!   tests without a cluster

pub mod client;
pub mod config;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod cluster_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::KubeCluster;
pub use config::ClusterConfig;
pub use error::ClusterError;
pub use models::{AddonKind, MetadataPatch, ResourceMeta};
pub use cluster_trait::ClusterOps;
#[cfg(feature = "test-util")]
pub use mock::MockCluster;
