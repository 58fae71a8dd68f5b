use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use std::net::IpAddr;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to resolve {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: hickory_resolver::error::ResolveError,
    },
    #[error("{host} has no {family} addresses")]
    NoAddresses { host: String, family: AddressFamily },
    #[error("address choice {choice} is out of range 1-{count}")]
    InvalidChoice { choice: usize, count: usize },
    #[error("failed to read address choice: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Which resolved addresses to keep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressFamily {
    #[default]
    Any,
    V4,
    V6,
}

impl AddressFamily {
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            AddressFamily::Any => true,
            AddressFamily::V4 => ip.is_ipv4(),
            AddressFamily::V6 => ip.is_ipv6(),
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::Any => write!(f, "IP"),
            AddressFamily::V4 => write!(f, "IPv4"),
            AddressFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// Parse a literal address, accepting the bracketed `[::1]` form
pub fn parse_literal(host: &str) -> Option<IpAddr> {
    let trimmed = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    trimmed.parse().ok()
}

/// Forward and reverse DNS for the scan target
pub struct DnsLookup {
    resolver: TokioAsyncResolver,
}

impl DnsLookup {
    /// Use the system resolver configuration, falling back to the defaults
    pub fn new() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            warn!(error = %e, "system resolver config unavailable, using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }

    /// Resolve `host` to candidate addresses of the requested family.
    ///
    /// Literal addresses skip DNS. Duplicates are dropped, resolver order is kept.
    pub async fn resolve(
        &self,
        host: &str,
        family: AddressFamily,
    ) -> Result<Vec<IpAddr>, ResolveError> {
        let candidates = match parse_literal(host) {
            Some(ip) => vec![ip],
            None => {
                let lookup = self
                    .resolver
                    .lookup_ip(host)
                    .await
                    .map_err(|source| ResolveError::Lookup {
                        host: host.to_string(),
                        source,
                    })?;
                lookup.iter().collect()
            }
        };

        let addresses = filter_candidates(candidates, family);
        if addresses.is_empty() {
            return Err(ResolveError::NoAddresses {
                host: host.to_string(),
                family,
            });
        }

        debug!(host, count = addresses.len(), "resolved target");
        Ok(addresses)
    }

    /// Reverse DNS for an address, trailing dot removed
    pub async fn reverse_lookup(&self, ip: IpAddr) -> Option<String> {
        match self.resolver.reverse_lookup(ip).await {
            Ok(lookup) => lookup
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_string()),
            Err(e) => {
                debug!(%ip, error = %e, "reverse lookup failed");
                None
            }
        }
    }
}

impl Default for DnsLookup {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep addresses of `family`, dropping duplicates but preserving order
pub fn filter_candidates(candidates: Vec<IpAddr>, family: AddressFamily) -> Vec<IpAddr> {
    let mut addresses: Vec<IpAddr> = Vec::with_capacity(candidates.len());
    for ip in candidates {
        if family.matches(&ip) && !addresses.contains(&ip) {
            addresses.push(ip);
        }
    }
    addresses
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_parse_literal() {
        assert_eq!(
            parse_literal("127.0.0.1"),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
        assert_eq!(parse_literal("::1"), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(parse_literal("[::1]"), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(parse_literal("example.com"), None);
    }

    #[test]
    fn test_filter_candidates_by_family() {
        let v4 = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);
        let candidates = vec![v6, v4, v4];

        assert_eq!(filter_candidates(candidates.clone(), AddressFamily::Any), vec![v6, v4]);
        assert_eq!(filter_candidates(candidates.clone(), AddressFamily::V4), vec![v4]);
        assert_eq!(filter_candidates(candidates, AddressFamily::V6), vec![v6]);
    }

    #[tokio::test]
    async fn test_resolve_literal_skips_dns() {
        let dns = DnsLookup::new();
        let addresses = dns.resolve("127.0.0.1", AddressFamily::Any).await.unwrap();
        assert_eq!(addresses, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
    }

    #[tokio::test]
    async fn test_resolve_literal_wrong_family() {
        let dns = DnsLookup::new();
        let result = dns.resolve("127.0.0.1", AddressFamily::V6).await;
        assert!(matches!(result, Err(ResolveError::NoAddresses { .. })));
    }
}
