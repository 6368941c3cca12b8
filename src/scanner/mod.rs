//! Scanner module - host discovery and top-ports scanning.
//!
//! Both engines share the same building blocks: a [`Prober`] that turns a
//! TCP connect attempt into a [`ProbeState`], a worker [`pool`] that fans
//! hosts out over a fixed number of tasks, and the ranked port list from
//! [`crate::ranking`].

pub mod discovery;
pub mod icmp;
pub mod pool;
pub mod portscan;
pub mod probe;
pub mod rate_limiter;
pub mod resolve;
pub mod tcp;

pub use discovery::{
    DiscoveryConfig, DiscoveryEvent, DiscoveryMethod, HostDiscovery, HostDiscoveryResult,
};
pub use icmp::{IcmpPinger, Pinger};
pub use portscan::{HostScanResult, PortScanner, ScanConfig, ScanStream};
pub use probe::{classify, Connector, PortProbeOutcome, ProbeState, Prober};
pub use rate_limiter::LaunchGate;
pub use resolve::HostResolver;
pub use tcp::TcpConnector;
