//! Configuration management for copper.
//!
//! Provides XDG-compliant settings storage with per-command defaults.

mod settings;

pub use settings::{AppSettings, DiscoverySettings, Paths, ScanSettings};
