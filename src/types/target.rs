//! Target specification types with CIDR and hostname support.
//!
//! Provides flexible target parsing supporting:
//! - Single IP addresses (IPv4 and IPv6)
//! - CIDR notation (192.168.1.0/24)
//! - Hostnames (example.com)
//! - Scope files with one target per line

use ipnetwork::IpNetwork;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;

/// Error type for target parsing and scope loading.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
    #[error("CIDR range too large: {0} addresses (max: {1})")]
    CidrTooLarge(u128, u128),
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<TargetError>,
    },
    #[error("unable to open scope file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read targets: {0}")]
    Read(#[from] io::Error),
}

/// A target specification that may stand for several hosts.
///
/// Supports:
/// - Single IP: "192.168.1.1"
/// - CIDR: "192.168.1.0/24"
/// - Hostname: "example.com"
/// - IPv6: "::1", "2001:db8::/120"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// A single IP address.
    Single(IpAddr),
    /// A CIDR network range.
    Cidr(IpNetwork),
    /// A hostname, resolved when probed.
    Hostname(String),
}

impl TargetSpec {
    /// Maximum number of hosts allowed in a CIDR range.
    pub const MAX_CIDR_HOSTS: u128 = 65536; // /16 for IPv4

    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        if s.contains('/') {
            let network: IpNetwork = s
                .parse()
                .map_err(|_| TargetError::InvalidCidr(s.to_string()))?;

            let host_count = network_size(&network);
            if host_count > Self::MAX_CIDR_HOSTS {
                return Err(TargetError::CidrTooLarge(host_count, Self::MAX_CIDR_HOSTS));
            }

            return Ok(Self::Cidr(network));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Expand into individual host strings.
    ///
    /// IPv4 networks shorter than /31 skip their network and broadcast
    /// addresses.
    pub fn expand(&self) -> Vec<String> {
        match self {
            Self::Single(ip) => vec![ip.to_string()],
            Self::Hostname(hostname) => vec![hostname.clone()],
            Self::Cidr(network) => network
                .iter()
                .filter(|ip| match (network, ip) {
                    (IpNetwork::V4(net), IpAddr::V4(addr)) if net.prefix() < 31 => {
                        *addr != net.network() && *addr != net.broadcast()
                    }
                    _ => true,
                })
                .map(|ip| ip.to_string())
                .collect(),
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Cidr(network) => write!(f, "{}", network),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// Read one target per line and expand them into hosts.
///
/// Blank lines, `#` comments and wildcard entries (anything containing `*`)
/// are skipped.
pub fn read_targets<R: BufRead>(reader: R) -> Result<Vec<String>, TargetError> {
    let mut hosts = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let entry = line.trim();
        if entry.is_empty() || entry.starts_with('#') || entry.contains('*') {
            continue;
        }

        let spec = TargetSpec::parse(entry).map_err(|e| TargetError::Line {
            line: index + 1,
            source: Box::new(e),
        })?;
        hosts.extend(spec.expand());
    }

    Ok(hosts)
}

/// Load targets from a scope file, or from stdin when `source` is `-`.
pub fn load_targets(source: &str) -> Result<Vec<String>, TargetError> {
    if source == "-" {
        return read_targets(io::stdin().lock());
    }

    let file = File::open(Path::new(source)).map_err(|e| TargetError::Open {
        path: source.to_string(),
        source: e,
    })?;
    read_targets(BufReader::new(file))
}

fn network_size(network: &IpNetwork) -> u128 {
    match network {
        IpNetwork::V4(net) => u128::from(net.size()),
        IpNetwork::V6(net) => {
            let prefix = u32::from(net.prefix());
            if prefix == 0 {
                u128::MAX
            } else {
                1u128 << (128 - prefix)
            }
        }
    }
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Each label: 1-63 characters, alphanumeric at both ends, hyphens inside.
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
            && label.chars().last().is_some_and(|c| c.is_ascii_alphanumeric())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_parse_ipv4() {
        let spec = TargetSpec::parse("192.168.1.1").unwrap();
        assert!(matches!(spec, TargetSpec::Single(IpAddr::V4(_))));
    }

    #[test]
    fn test_parse_ipv6() {
        let spec = TargetSpec::parse("::1").unwrap();
        assert!(matches!(spec, TargetSpec::Single(IpAddr::V6(_))));
    }

    #[test]
    fn test_parse_cidr_v4() {
        let spec = TargetSpec::parse("192.168.1.0/24").unwrap();
        if let TargetSpec::Cidr(network) = spec {
            assert_eq!(network.prefix(), 24);
        } else {
            panic!("Expected CIDR");
        }
    }

    #[test]
    fn test_parse_hostname() {
        let spec = TargetSpec::parse("example.com").unwrap();
        assert!(matches!(spec, TargetSpec::Hostname(_)));
        assert!(TargetSpec::parse("bad host!").is_err());
    }

    #[test]
    fn test_cidr_too_large() {
        let result = TargetSpec::parse("10.0.0.0/8");
        assert!(matches!(result, Err(TargetError::CidrTooLarge(_, _))));
        assert!(matches!(
            TargetSpec::parse("10.0.0.0/33"),
            Err(TargetError::InvalidCidr(_))
        ));
    }

    #[test]
    fn test_expand_skips_network_and_broadcast() {
        let hosts = TargetSpec::parse("10.0.0.0/30").unwrap().expand();
        assert_eq!(hosts, vec!["10.0.0.1", "10.0.0.2"]);

        let hosts = TargetSpec::parse("10.0.0.0/24").unwrap().expand();
        assert_eq!(hosts.len(), 254);
        assert_eq!(hosts.first().unwrap(), "10.0.0.1");
        assert_eq!(hosts.last().unwrap(), "10.0.0.254");
    }

    #[test]
    fn test_expand_point_to_point_keeps_both() {
        let hosts = TargetSpec::parse("10.0.0.0/31").unwrap().expand();
        assert_eq!(hosts, vec!["10.0.0.0", "10.0.0.1"]);

        let hosts = TargetSpec::parse("10.0.0.7/32").unwrap().expand();
        assert_eq!(hosts, vec!["10.0.0.7"]);
    }

    #[test]
    fn test_read_targets_filters_lines() {
        let input = "# scope\n10.0.0.1\n\n*.example.com\nexample.com\n192.168.0.0/30\n";
        let hosts = read_targets(Cursor::new(input)).unwrap();
        assert_eq!(
            hosts,
            vec!["10.0.0.1", "example.com", "192.168.0.1", "192.168.0.2"]
        );
    }

    #[test]
    fn test_read_targets_reports_line() {
        let err = read_targets(Cursor::new("10.0.0.1\n10.0.0.0/99\n")).unwrap_err();
        assert!(matches!(err, TargetError::Line { line: 2, .. }));
        assert!(err.to_string().starts_with("line 2"));
    }

    #[test]
    fn test_load_targets_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10.1.1.1").unwrap();
        writeln!(file, "10.1.1.2").unwrap();

        let hosts = load_targets(file.path().to_str().unwrap()).unwrap();
        assert_eq!(hosts, vec!["10.1.1.1", "10.1.1.2"]);
    }

    #[test]
    fn test_load_targets_missing_file() {
        let err = load_targets("/nonexistent/copper/scope.txt").unwrap_err();
        assert!(matches!(err, TargetError::Open { .. }));
    }

    #[test]
    fn test_valid_hostname() {
        assert!(is_valid_hostname("example.com"));
        assert!(is_valid_hostname("sub.example.com"));
        assert!(is_valid_hostname("my-server"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-invalid.com"));
    }
}
