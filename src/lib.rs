//! # copper - Fast Host Discovery and Top-Ports Scanning
//!
//! copper answers two questions about a list of network targets: which hosts
//! are alive, and which of their most popular TCP ports are open or closed.
//!
//! ## Features
//!
//! - **Host Discovery**: ICMP echo first, then popular TCP ports until one
//!   gives a definitive answer, with optional retry passes for silent hosts
//! - **Top-Ports Scanning**: ports ranked by real-world popularity, started at
//!   a fixed per-second rate per host
//! - **Early Abort**: a host that proves unreachable is cancelled at once
//! - **Flexible Targeting**: IPs, hostnames, and CIDR ranges from scope files
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use copper::ranking::PortRanking;
//! use copper::scanner::{PortScanner, ScanConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ranking = Arc::new(PortRanking::default());
//!     let scanner = PortScanner::new(ScanConfig::default().with_top_ports(100), ranking).unwrap();
//!
//!     let mut results = scanner.scan(vec!["192.168.1.1".to_string()]);
//!     while let Some(host) = results.recv().await {
//!         for port in host.open_ports() {
//!             println!("{} {}/{}", host.host, port.port, port.state);
//!         }
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`ranking`] - Port popularity ranking from an nmap-services registry
//! - [`scanner`] - Probing, host discovery and the port scan engine
//! - [`types`] - Target parsing and scope files
//! - [`config`] - Persistent settings
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod ranking;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ConfigError, HostScanError, ProbeError};
pub use ranking::{PortRanking, Protocol, RankedPort};
pub use scanner::{
    DiscoveryConfig, HostDiscovery, HostDiscoveryResult, HostScanResult, PortProbeOutcome,
    PortScanner, ProbeState, ScanConfig,
};
pub use types::TargetSpec;
