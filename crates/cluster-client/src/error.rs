//! Cluster client errors

use thiserror::Error;

/// Errors that can occur when talking to the Kubernetes API.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Kubernetes API error (transport, auth, server-side failure)
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Target object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Write rejected because the object changed since it was read
    #[error("conflict: {0}")]
    Conflict(String),

    /// Client configuration could not be resolved
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClusterError {
    /// Classify a raw `kube::Error`, lifting 404 and 409 responses into
    /// their dedicated variants so callers can treat them as control flow.
    pub fn from_api(err: kube::Error, what: &str) -> Self {
        match err {
            kube::Error::Api(ref response) if response.code == 404 => {
                ClusterError::NotFound(what.to_string())
            }
            kube::Error::Api(ref response) if response.code == 409 => {
                ClusterError::Conflict(what.to_string())
            }
            other => ClusterError::Kube(other),
        }
    }

    /// True when this error means the target object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound(_))
    }

    /// True when this error is an optimistic concurrency conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClusterError::Conflict(_))
    }
}
