//! Error types for copper.
//!
//! Uses `thiserror` for ergonomic error definitions. Probe failures are data:
//! they are classified into a [`ProbeState`](crate::scanner::ProbeState) and
//! never abort a run on their own.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::TargetError;

/// Why a single connection attempt did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ProbeError {
    #[error("connection refused")]
    Refused,

    #[error("no route to host")]
    NoRoute,

    #[error("network is unreachable")]
    NetworkUnreachable,

    #[error("unknown host: {0}")]
    UnknownHost(String),

    #[error("i/o timeout")]
    TimedOut,

    #[error("operation canceled")]
    Canceled,

    #[error("{0}")]
    Other(String),
}

impl ProbeError {
    /// Map a socket error onto a probe failure using its kind and OS code.
    pub fn from_io(err: &io::Error) -> Self {
        #[cfg(unix)]
        match err.raw_os_error() {
            Some(libc::ECONNREFUSED) => return Self::Refused,
            Some(libc::EHOSTUNREACH) => return Self::NoRoute,
            Some(libc::ENETUNREACH) | Some(libc::ENETDOWN) => return Self::NetworkUnreachable,
            Some(libc::ETIMEDOUT) => return Self::TimedOut,
            Some(libc::ECANCELED) => return Self::Canceled,
            _ => {}
        }

        match err.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::HostUnreachable => Self::NoRoute,
            io::ErrorKind::NetworkUnreachable | io::ErrorKind::NetworkDown => {
                Self::NetworkUnreachable
            }
            io::ErrorKind::TimedOut => Self::TimedOut,
            _ => Self::Other(err.to_string()),
        }
    }
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        Self::from_io(&err)
    }
}

/// A probe failure that could not be classified, tied to its port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortFailure {
    pub port: u16,
    pub cause: ProbeError,
}

/// Aggregate error attached to a single host's scan result.
///
/// `down` is set once the host proved unreachable; `failures` accumulates
/// indeterminate probe errors and never stops the scan by itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostScanError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down: Option<ProbeError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PortFailure>,
}

impl HostScanError {
    /// Whether the scan was cut short because the host went away.
    pub fn is_host_down(&self) -> bool {
        self.down.is_some()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.down.is_none() && self.failures.is_empty()
    }
}

impl fmt::Display for HostScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(self.failures.len() + 1);
        if let Some(cause) = &self.down {
            parts.push(format!("host is down: {}", cause));
        }
        for failure in &self.failures {
            parts.push(format!("port {}: {}", failure.port, failure.cause));
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for HostScanError {}

/// Configuration and settings errors, reported before any worker starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors surfaced by the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_kinds() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(ProbeError::from_io(&refused), ProbeError::Refused);

        let timed_out = io::Error::from(io::ErrorKind::TimedOut);
        assert_eq!(ProbeError::from_io(&timed_out), ProbeError::TimedOut);

        let other = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(ProbeError::from_io(&other), ProbeError::Other("boom".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_io_os_codes() {
        let no_route = io::Error::from_raw_os_error(libc::EHOSTUNREACH);
        assert_eq!(ProbeError::from_io(&no_route), ProbeError::NoRoute);

        let net = io::Error::from_raw_os_error(libc::ENETUNREACH);
        assert_eq!(ProbeError::from_io(&net), ProbeError::NetworkUnreachable);
    }

    #[test]
    fn test_host_scan_error_display() {
        let err = HostScanError {
            down: Some(ProbeError::NoRoute),
            failures: vec![PortFailure {
                port: 8080,
                cause: ProbeError::Other("reset".to_string()),
            }],
        };
        assert!(err.is_host_down());
        assert_eq!(err.to_string(), "host is down: no route to host; port 8080: reset");
        assert!(HostScanError::default().is_empty());
    }
}
