//! Job-specific error types.
//!
//! Every failure surfaced to the caller names the object and the operation
//! that failed; the job performs no rollback, so that context is what the
//! operator acts on before re-running.

use cluster_client::ClusterError;
use thiserror::Error;

use crate::targets::TargetRef;

/// Errors that can occur while running the cleanup job.
#[derive(Debug, Error)]
pub enum JobError {
    /// Reading an object's state failed
    #[error("failed to inspect {target}: {source}")]
    Inspect {
        target: TargetRef,
        #[source]
        source: ClusterError,
    },

    /// Deleting an object failed
    #[error("failed to delete {target}: {source}")]
    Delete {
        target: TargetRef,
        #[source]
        source: ClusterError,
    },

    /// Handing an object over to Helm failed
    #[error("failed to import {target} into Helm: {source}")]
    Import {
        target: TargetRef,
        #[source]
        source: ClusterError,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The output record could not be rendered
    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    /// Client construction failed
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}
