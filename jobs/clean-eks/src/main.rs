//! Clean EKS
//!
//! One-shot cleanup job for fresh EKS clusters:
//! - removes the default AWS VPC CNI daemonset
//! - removes the default kube-proxy daemonset and config map
//! - removes the CoreDNS stack, or relabels it so a Helm chart can adopt it
//!   in place without the cluster ever losing DNS
//!
//! The job is idempotent: re-running it against a converged cluster performs
//! no writes. Observed state is printed as JSON on stdout.

mod dns;
mod error;
mod job;
mod markers;
mod mutate;
mod report;
mod targets;

#[cfg(test)]
mod markers_test;
#[cfg(test)]
mod mutate_test;

use std::env;

use cluster_client::ClusterConfig;
use tracing::info;

use crate::error::JobError;
use crate::job::CleanupJob;
use crate::report::DesiredState;

#[tokio::main]
async fn main() -> Result<(), JobError> {
    tracing_subscriber::fmt::init();

    info!("Starting clean-eks job");

    // Load configuration from environment variables
    let config = ClusterConfig {
        endpoint: env_opt("CLUSTER_ENDPOINT"),
        token: env_opt("CLUSTER_TOKEN"),
        ca_certificate: env_opt("CLUSTER_CA_CERT_PEM"),
        client_certificate: env_opt("CLUSTER_CLIENT_CERT_PEM"),
        client_key: env_opt("CLUSTER_CLIENT_KEY_PEM"),
        insecure: env_flag("CLUSTER_INSECURE", false)?,
        request_timeout_ms: env_u64("REQUEST_TIMEOUT_MS")?,
    };

    let desired = DesiredState {
        remove_aws_cni: env_flag("REMOVE_AWS_CNI", true)?,
        remove_kube_proxy: env_flag("REMOVE_KUBE_PROXY", true)?,
        remove_core_dns: env_flag("REMOVE_CORE_DNS", true)?,
        import_coredns_to_helm: env_flag("IMPORT_COREDNS_TO_HELM", false)?,
    };

    info!("Configuration:");
    info!(
        "  Endpoint: {}",
        config.endpoint.as_deref().unwrap_or("(inferred)")
    );
    info!(
        "  Token: {}",
        if config.token.is_some() { "***" } else { "(none)" }
    );
    info!("  Remove AWS CNI: {}", desired.remove_aws_cni);
    info!("  Remove kube-proxy: {}", desired.remove_kube_proxy);
    info!("  Remove CoreDNS: {}", desired.remove_core_dns);
    info!(
        "  Import CoreDNS to Helm: {}",
        desired.import_coredns_to_helm
    );

    let cluster = config.connect().await?;
    let report = CleanupJob::new(&cluster).run(desired).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn env_flag(name: &str, default: bool) -> Result<bool, JobError> {
    match env_opt(name) {
        None => Ok(default),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(JobError::InvalidConfig(format!(
                "{} must be a boolean, got {:?}",
                name, other
            ))),
        },
    }
}

fn env_u64(name: &str) -> Result<Option<u64>, JobError> {
    env_opt(name)
        .map(|value| {
            value.parse::<u64>().map_err(|_| {
                JobError::InvalidConfig(format!("{} must be an integer, got {:?}", name, value))
            })
        })
        .transpose()
}
