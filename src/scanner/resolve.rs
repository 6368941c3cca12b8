//! Target name resolution.

use crate::error::ProbeError;
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::TokioAsyncResolver;

/// Resolves target strings to a single address.
///
/// IP literals are returned as-is without touching the network. Names go
/// through the system resolver configuration, falling back to the library
/// defaults when it cannot be read.
#[derive(Clone)]
pub struct HostResolver {
    inner: TokioAsyncResolver,
}

impl HostResolver {
    pub fn new() -> Self {
        let inner = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "system resolver config unavailable, using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { inner }
    }

    /// Resolve `host` to its first address.
    ///
    /// A name that does not resolve is reported as [`ProbeError::UnknownHost`];
    /// a resolver timeout as [`ProbeError::TimedOut`].
    pub async fn resolve(&self, host: &str) -> Result<IpAddr, ProbeError> {
        if let Some(ip) = parse_ip_literal(host) {
            return Ok(ip);
        }

        let response = self.inner.lookup_ip(host).await.map_err(|e| match e.kind() {
            ResolveErrorKind::Timeout => ProbeError::TimedOut,
            _ => ProbeError::UnknownHost(host.to_string()),
        })?;

        response
            .iter()
            .next()
            .ok_or_else(|| ProbeError::UnknownHost(host.to_string()))
    }
}

impl Default for HostResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse plain or bracketed (`[::1]`) IP literals.
fn parse_ip_literal(host: &str) -> Option<IpAddr> {
    let trimmed = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_parse_ip_literal() {
        assert_eq!(
            parse_ip_literal("10.0.0.5"),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))
        );
        assert_eq!(parse_ip_literal("[::1]"), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(parse_ip_literal("example.com"), None);
    }

    #[tokio::test]
    async fn test_resolve_literal_skips_lookup() {
        let resolver = HostResolver::new();
        let ip = resolver.resolve("127.0.0.1").await.unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
}
