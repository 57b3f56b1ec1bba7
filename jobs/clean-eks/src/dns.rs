//! Cluster DNS address inference.
//!
//! When the kube-dns service is gone (or was never there), the address a
//! replacement DNS chart must claim can still be derived from the API server
//! service in `default`: by convention the cluster DNS sits at the tenth
//! address of the service CIDR, `.10` for IPv4 and `::a` for IPv6.

/// Derive the conventional cluster DNS addresses from the API server
/// service's cluster IPs. Returns the input unchanged when it is empty.
pub fn derive_dns_ips(mut ips: Vec<String>) -> Vec<String> {
    if let Some(first) = ips.first() {
        if first.contains(':') {
            let mut parts: Vec<&str> = first.split(':').collect();
            parts.pop();
            ips = vec![format!("{}:a", parts.join(":"))];
        }
    }

    if let Some(first) = ips.first() {
        if first.contains('.') {
            let mut parts: Vec<&str> = first.split('.').collect();
            parts.pop();
            ips = vec![format!("{}.10", parts.join("."))];
        }
    }

    ips
}
