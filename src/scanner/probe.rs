//! Single-port probing and outcome classification.
//!
//! Both the discovery and the scan engine go through [`Prober::probe`], so a
//! port means the same thing to both of them.

use crate::error::ProbeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Classification of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeState {
    /// The connection was accepted.
    Open,
    /// The host actively refused the connection.
    Closed,
    /// The network path to the host failed (no route, unknown host).
    HostUnreachable,
    /// No answer within the deadline.
    Timeout,
    /// Any other transport error.
    Unknown,
}

impl ProbeState {
    /// `Open` and `Closed` both prove the host answered.
    pub fn is_definitive(self) -> bool {
        matches!(self, Self::Open | Self::Closed)
    }
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::HostUnreachable => write!(f, "unreachable"),
            Self::Timeout => write!(f, "timeout"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Map a connection result onto a [`ProbeState`].
///
/// Precedence: refused, then unreachable, then deadline/cancel, then other.
pub fn classify(result: &Result<(), ProbeError>) -> ProbeState {
    match result {
        Ok(()) => ProbeState::Open,
        Err(ProbeError::Refused) => ProbeState::Closed,
        Err(ProbeError::NoRoute | ProbeError::NetworkUnreachable | ProbeError::UnknownHost(_)) => {
            ProbeState::HostUnreachable
        }
        Err(ProbeError::TimedOut | ProbeError::Canceled) => ProbeState::Timeout,
        Err(ProbeError::Other(_)) => ProbeState::Unknown,
    }
}

/// Result of probing one port on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortProbeOutcome {
    pub port: u16,
    pub state: ProbeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<ProbeError>,
}

impl PortProbeOutcome {
    /// Build an outcome from a raw connection result.
    pub fn from_result(port: u16, result: Result<(), ProbeError>) -> Self {
        let state = classify(&result);
        Self {
            port,
            state,
            service: None,
            cause: result.err(),
        }
    }

    /// Attach a service name.
    pub fn with_service(mut self, service: Option<String>) -> Self {
        self.service = service;
        self
    }
}

/// Transport used to open a TCP connection to `host:port`.
///
/// Implementations close the connection as soon as it is established; no
/// data is exchanged. Deadlines are enforced by the caller.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, host: &str, port: u16) -> Result<(), ProbeError>;
}

/// Bounded-time port prober shared by both engines.
#[derive(Clone)]
pub struct Prober {
    connector: Arc<dyn Connector>,
    timeout: Duration,
}

impl Prober {
    pub fn new(connector: Arc<dyn Connector>, timeout: Duration) -> Self {
        Self { connector, timeout }
    }

    /// Probe `host:port` once.
    ///
    /// The deadline covers the entire attempt including name resolution, so a
    /// slow resolver cannot push a probe past its budget.
    pub async fn probe(&self, host: &str, port: u16) -> PortProbeOutcome {
        let result = match timeout(self.timeout, self.connector.connect(host, port)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::TimedOut),
        };

        let outcome = PortProbeOutcome::from_result(port, result);
        tracing::trace!(host, port, state = %outcome.state, "probe finished");
        outcome
    }
}
