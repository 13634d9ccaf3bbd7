use std::net::IpAddr;

/// Records a security-relevant outcome under the `audit` target so the
/// subscriber can route these events to an append-only sink, independent of
/// whatever response goes back to the caller.
pub fn record(event: &str, email: &str, origin: Option<IpAddr>) {
    match origin {
        Some(ip) => tracing::info!(target: "audit", event, email = %email, origin = %ip),
        None => tracing::info!(target: "audit", event, email = %email, origin = "unknown"),
    }
}
