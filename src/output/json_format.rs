//! JSON output formatting.
//!
//! Discovery results are written as one pretty-printed array. Scan results
//! arrive one host at a time and are written as JSON lines.

use crate::scanner::{HostDiscoveryResult, HostScanResult};
use std::io::{self, Write};

/// Write discovery results as a JSON array.
pub fn write_discovery<W: Write>(out: &mut W, results: &[HostDiscoveryResult]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)
}

/// Write one host's scan result as a single JSON line.
pub fn write_scan<W: Write>(out: &mut W, result: &HostScanResult) -> io::Result<()> {
    serde_json::to_writer(&mut *out, result)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HostScanError, ProbeError};
    use crate::scanner::{DiscoveryMethod, PortProbeOutcome};
    use serde_json::Value;

    #[test]
    fn test_discovery_array() {
        let results = vec![HostDiscoveryResult {
            host: "10.0.0.1".into(),
            method: Some(DiscoveryMethod::TcpPorts),
            active: true,
        }];
        let mut buf = Vec::new();
        write_discovery(&mut buf, &results).unwrap();

        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["host"], "10.0.0.1");
        assert_eq!(value[0]["method"], "TCP Ports");
        assert_eq!(value[0]["active"], true);
    }

    #[test]
    fn test_scan_line() {
        let result = HostScanResult {
            host: "10.0.0.9".into(),
            ports: vec![PortProbeOutcome::from_result(443, Ok(())).with_service(Some("https".into()))],
            error: Some(HostScanError {
                down: Some(ProbeError::NoRoute),
                failures: Vec::new(),
            }),
        };
        let mut buf = Vec::new();
        write_scan(&mut buf, &result).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["ports"][0]["port"], 443);
        assert_eq!(value["ports"][0]["state"], "open");
        assert_eq!(value["ports"][0]["service"], "https");
        assert_eq!(value["error"]["down"]["kind"], "no_route");
    }
}
