//! Application settings and paths.
//!
//! Settings live in `settings.json` under the XDG configuration directory
//! unless a file is given explicitly. Every field is optional in the file;
//! anything left out takes the built-in default.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{DiscoveryConfig, ScanConfig};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/copper)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve the per-user directories.
    pub fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "copper", "copper").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Defaults for the `discover` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// ICMP timeout in milliseconds, 0 disables ICMP.
    pub icmp_timeout_ms: u64,
    /// TCP timeout in milliseconds, 0 disables the TCP fallback.
    pub tcp_timeout_ms: u64,
    /// Number of top-ranked TCP ports to try.
    pub tcp_ports: usize,
    /// Worker count, 0 for one per host.
    pub workers: usize,
    /// Passes over silent hosts.
    pub attempts: u32,
    /// Use raw ICMP sockets.
    pub privileged: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        let config = DiscoveryConfig::default();
        Self {
            icmp_timeout_ms: config.icmp_timeout.as_millis() as u64,
            tcp_timeout_ms: config.tcp_timeout.as_millis() as u64,
            tcp_ports: config.ports_to_try,
            workers: config.workers,
            attempts: config.attempts,
            privileged: config.privileged_icmp,
        }
    }
}

impl DiscoverySettings {
    /// Engine configuration for these settings.
    pub fn to_config(&self) -> DiscoveryConfig {
        DiscoveryConfig::default()
            .with_icmp_timeout(Duration::from_millis(self.icmp_timeout_ms))
            .with_tcp_timeout(Duration::from_millis(self.tcp_timeout_ms))
            .with_ports_to_try(self.tcp_ports)
            .with_workers(self.workers)
            .with_attempts(self.attempts)
            .with_privileged_icmp(self.privileged)
    }
}

/// Defaults for the `scan` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// TCP timeout in milliseconds.
    pub tcp_timeout_ms: u64,
    /// Number of top-ranked TCP ports to scan.
    pub top_ports: usize,
    /// Worker count, 0 for one per host.
    pub workers: usize,
    /// Probes started per second per host.
    pub rate: usize,
    /// Optional cap on outstanding probes per host.
    pub max_in_flight: Option<usize>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        let config = ScanConfig::default();
        Self {
            tcp_timeout_ms: config.tcp_timeout.as_millis() as u64,
            top_ports: config.top_ports,
            workers: config.workers,
            rate: config.rate_per_second,
            max_in_flight: config.max_in_flight,
        }
    }
}

impl ScanSettings {
    /// Engine configuration for these settings.
    pub fn to_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_tcp_timeout(Duration::from_millis(self.tcp_timeout_ms))
            .with_top_ports(self.top_ports)
            .with_workers(self.workers)
            .with_rate(self.rate)
            .with_max_in_flight(self.max_in_flight)
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Scope file read when `--file` is not given.
    pub scope_file: String,
    /// Port popularity registry, `None` for the system default.
    pub services_file: Option<PathBuf>,
    pub discovery: DiscoverySettings,
    pub scan: ScanSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            scope_file: "scope.txt".to_string(),
            services_file: None,
            discovery: DiscoverySettings::default(),
            scan: ScanSettings::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if there is none.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::new()?.settings_file();

        if !file.exists() {
            tracing::debug!(path = %file.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }
}
