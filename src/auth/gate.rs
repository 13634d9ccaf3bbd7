use std::net::IpAddr;

/// Pre-mutation hook for throttling policies. Checked before any store
/// write on register/login so an external limiter can reject a caller
/// without leaving partial state behind.
pub trait RateGate: Send + Sync {
    fn allow(&self, origin: Option<IpAddr>, action: &str) -> bool;
}

/// Default gate: no throttling.
pub struct AllowAll;

impl RateGate for AllowAll {
    fn allow(&self, _origin: Option<IpAddr>, _action: &str) -> bool {
        true
    }
}
