//! Client configuration and credential resolution
//!
//! Resolves explicit endpoint/token/certificate inputs into a connected
//! [`KubeCluster`]. When no endpoint is given the ambient environment is
//! used instead (in-cluster service account or `KUBECONFIG`).
//!
//! Contradictory inputs are rejected here, before any network call.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde_json::{Value, json};
use tracing::debug;

use crate::client::KubeCluster;
use crate::error::ClusterError;

/// Connection settings for a cluster.
///
/// All fields are optional; an empty configuration falls back to the ambient
/// environment. Certificates are PEM text, not file paths.
#[derive(Clone, Debug, Default)]
pub struct ClusterConfig {
    /// API server URL (`https://host:port`)
    pub endpoint: Option<String>,
    /// Bearer token
    pub token: Option<String>,
    /// Cluster CA certificate (PEM)
    pub ca_certificate: Option<String>,
    /// Client certificate for mTLS (PEM)
    pub client_certificate: Option<String>,
    /// Client key for mTLS (PEM)
    pub client_key: Option<String>,
    /// Skip server certificate verification
    pub insecure: bool,
    /// Per-request timeout in milliseconds; bounds each API call, not the job
    pub request_timeout_ms: Option<u64>,
}

impl ClusterConfig {
    /// Reject contradictory inputs.
    pub fn validate(&self) -> Result<(), ClusterError> {
        if self.client_certificate.is_some() != self.client_key.is_some() {
            return Err(ClusterError::InvalidConfig(
                "client certificate and client key must be provided together".to_string(),
            ));
        }
        if self.insecure && self.ca_certificate.is_some() {
            return Err(ClusterError::InvalidConfig(
                "insecure skips certificate verification, the cluster CA certificate would be ignored"
                    .to_string(),
            ));
        }
        if self.endpoint.is_none()
            && (self.token.is_some()
                || self.ca_certificate.is_some()
                || self.client_certificate.is_some())
        {
            return Err(ClusterError::InvalidConfig(
                "credentials were provided without a cluster endpoint".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a connected cluster handle.
    pub async fn connect(self) -> Result<KubeCluster, ClusterError> {
        self.validate()?;

        let (mut config, endpoint) = match &self.endpoint {
            Some(endpoint) => {
                debug!("Building cluster client for {}", endpoint);
                let kubeconfig = self.to_kubeconfig()?;
                let config =
                    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                        .await
                        .map_err(|err| {
                            ClusterError::InvalidConfig(format!(
                                "failed to resolve cluster credentials: {}",
                                err
                            ))
                        })?;
                (config, endpoint.clone())
            }
            None => {
                debug!("No endpoint configured, inferring cluster configuration");
                let config = Config::infer().await.map_err(|err| {
                    ClusterError::InvalidConfig(format!(
                        "failed to infer cluster configuration: {}",
                        err
                    ))
                })?;
                let endpoint = config.cluster_url.to_string();
                (config, endpoint)
            }
        };

        if let Some(timeout_ms) = self.request_timeout_ms {
            let timeout = Duration::from_millis(timeout_ms);
            config.connect_timeout = Some(timeout);
            config.read_timeout = Some(timeout);
        }

        let client = Client::try_from(config)?;
        Ok(KubeCluster::new(client, endpoint))
    }

    /// Synthesize a single-context kubeconfig from the explicit inputs.
    ///
    /// Going through the kubeconfig representation keeps certificate decoding
    /// and TLS wiring on kube's standard path.
    fn to_kubeconfig(&self) -> Result<Kubeconfig, ClusterError> {
        let mut cluster = serde_json::Map::new();
        if let Some(endpoint) = &self.endpoint {
            cluster.insert("server".to_string(), json!(endpoint));
        }
        if self.insecure {
            cluster.insert("insecure-skip-tls-verify".to_string(), json!(true));
        }
        if let Some(ca) = &self.ca_certificate {
            cluster.insert(
                "certificate-authority-data".to_string(),
                json!(BASE64.encode(ca)),
            );
        }

        let mut user = serde_json::Map::new();
        if let Some(token) = &self.token {
            user.insert("token".to_string(), json!(token));
        }
        if let Some(cert) = &self.client_certificate {
            user.insert(
                "client-certificate-data".to_string(),
                json!(BASE64.encode(cert)),
            );
        }
        if let Some(key) = &self.client_key {
            user.insert("client-key-data".to_string(), json!(BASE64.encode(key)));
        }

        let document = json!({
            "apiVersion": "v1",
            "kind": "Config",
            "clusters": [{ "name": "cluster", "cluster": Value::Object(cluster) }],
            "users": [{ "name": "user", "user": Value::Object(user) }],
            "contexts": [{
                "name": "context",
                "context": { "cluster": "cluster", "user": "user" },
            }],
            "current-context": "context",
        });

        serde_json::from_value(document).map_err(|err| {
            ClusterError::InvalidConfig(format!("failed to assemble kubeconfig: {}", err))
        })
    }
}
