//! Port popularity rankings.
//!
//! A [`PortRanking`] supplies, per transport protocol, the list of ports
//! ordered from most to least likely to be open. Tables are loaded lazily on
//! first use and never change afterwards, so a single ranking can be shared
//! between workers behind an `Arc` without locking.

mod builtin;
pub mod registry;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

/// Default location of the nmap services registry.
pub const DEFAULT_REGISTRY_PATH: &str = "/usr/share/nmap/nmap-services";

/// Transport protocol a ranking applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            _ => Err(format!("unknown protocol: {}", s)),
        }
    }
}

/// A port together with its service name and popularity weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPort {
    pub port: u16,
    pub service: String,
    pub weight: f64,
}

impl RankedPort {
    pub fn new(port: u16, service: impl Into<String>, weight: f64) -> Self {
        Self {
            port,
            service: service.into(),
            weight,
        }
    }
}

/// An immutable ranked table with a port index for service lookups.
#[derive(Debug)]
struct RankedTable {
    ports: Vec<RankedPort>,
    index: HashMap<u16, usize>,
}

impl RankedTable {
    fn new(ports: Vec<RankedPort>) -> Self {
        let mut index = HashMap::with_capacity(ports.len());
        for (i, entry) in ports.iter().enumerate() {
            // First (highest ranked) entry wins if a registry lists a port twice.
            index.entry(entry.port).or_insert(i);
        }
        Self { ports, index }
    }
}

/// Lazily initialised, per-protocol port rankings.
///
/// The registry file is read at most once per protocol. When it is missing,
/// unreadable, or has no records for a protocol, the built-in list for that
/// protocol is used instead; this never fails.
#[derive(Debug)]
pub struct PortRanking {
    registry: Option<PathBuf>,
    tcp: OnceLock<RankedTable>,
    udp: OnceLock<RankedTable>,
}

impl PortRanking {
    /// Rankings backed by the registry at `path`.
    pub fn from_registry(path: impl Into<PathBuf>) -> Self {
        Self {
            registry: Some(path.into()),
            tcp: OnceLock::new(),
            udp: OnceLock::new(),
        }
    }

    /// Rankings that only use the built-in lists.
    pub fn builtin() -> Self {
        Self {
            registry: None,
            tcp: OnceLock::new(),
            udp: OnceLock::new(),
        }
    }

    /// Rankings with an explicit table for `protocol`.
    ///
    /// Entries are ordered by descending weight (stable). The other protocol
    /// uses its built-in list.
    pub fn from_entries(protocol: Protocol, mut entries: Vec<RankedPort>) -> Self {
        entries.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        let ranking = Self::builtin();
        let table = RankedTable::new(entries);
        match protocol {
            Protocol::Tcp => ranking.tcp.get_or_init(|| table),
            Protocol::Udp => ranking.udp.get_or_init(|| table),
        };
        ranking
    }

    /// All known ports for `protocol`, most popular first.
    pub fn ranked(&self, protocol: Protocol) -> &[RankedPort] {
        &self.table(protocol).ports
    }

    /// The `count` most popular ports for `protocol`.
    pub fn top_ports(&self, protocol: Protocol, count: usize) -> &[RankedPort] {
        let ports = self.ranked(protocol);
        &ports[..count.min(ports.len())]
    }

    /// Service name registered for `port`, if the ranking knows it.
    pub fn service_name(&self, protocol: Protocol, port: u16) -> Option<&str> {
        let table = self.table(protocol);
        table
            .index
            .get(&port)
            .map(|&i| table.ports[i].service.as_str())
    }

    fn table(&self, protocol: Protocol) -> &RankedTable {
        let slot = match protocol {
            Protocol::Tcp => &self.tcp,
            Protocol::Udp => &self.udp,
        };
        slot.get_or_init(|| RankedTable::new(self.load(protocol)))
    }

    fn load(&self, protocol: Protocol) -> Vec<RankedPort> {
        let Some(path) = &self.registry else {
            return builtin_for(protocol);
        };

        let reason = match registry::load(path, protocol) {
            Ok(ports) if !ports.is_empty() => {
                tracing::debug!(
                    path = %path.display(),
                    %protocol,
                    count = ports.len(),
                    "loaded port registry"
                );
                return ports;
            }
            Ok(_) => "no usable records".to_string(),
            Err(e) => e.to_string(),
        };

        let fallback = builtin_for(protocol);
        tracing::warn!(
            path = %path.display(),
            %protocol,
            reason = %reason,
            builtin_ports = fallback.len(),
            "port registry unavailable, top-port counts above the built-in list are capped"
        );
        fallback
    }
}

fn builtin_for(protocol: Protocol) -> Vec<RankedPort> {
    match protocol {
        Protocol::Tcp => builtin::tcp(),
        Protocol::Udp => builtin::udp(),
    }
}

impl Default for PortRanking {
    fn default() -> Self {
        Self::from_registry(DEFAULT_REGISTRY_PATH)
    }
}
