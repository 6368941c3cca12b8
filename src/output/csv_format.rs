//! CSV output formatting.

use crate::scanner::{HostDiscoveryResult, HostScanResult};
use std::io::{self, Write};

/// Write discovery results with a header row.
pub fn write_discovery<W: Write>(out: W, results: &[HostDiscoveryResult]) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["host", "active", "method"])?;
    for result in results {
        let method = result.method.map_or(String::new(), |m| m.to_string());
        wtr.write_record([
            result.host.as_str(),
            if result.active { "true" } else { "false" },
            method.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Header row for scan output.
pub const SCAN_HEADER: [&str; 5] = ["host", "port", "state", "service", "error"];

/// Write one row per recorded port; hosts with nothing recorded get a single
/// row carrying only the error, if there is one.
pub fn write_scan<W: Write>(wtr: &mut csv::Writer<W>, result: &HostScanResult) -> io::Result<()> {
    let error = result
        .error
        .as_ref()
        .map_or(String::new(), |e| e.to_string());

    if result.ports.is_empty() {
        if !error.is_empty() {
            wtr.write_record([result.host.as_str(), "", "", "", error.as_str()])?;
        }
        return Ok(());
    }

    for outcome in &result.ports {
        let port = outcome.port.to_string();
        let state = outcome.state.to_string();
        wtr.write_record([
            result.host.as_str(),
            port.as_str(),
            state.as_str(),
            outcome.service.as_deref().unwrap_or(""),
            error.as_str(),
        ])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HostScanError, ProbeError};
    use crate::scanner::{DiscoveryMethod, PortProbeOutcome};

    #[test]
    fn test_discovery_rows() {
        let results = vec![
            HostDiscoveryResult {
                host: "10.0.0.1".into(),
                method: Some(DiscoveryMethod::Icmp),
                active: true,
            },
            HostDiscoveryResult {
                host: "10.0.0.2".into(),
                method: None,
                active: false,
            },
        ];
        let mut buf = Vec::new();
        write_discovery(&mut buf, &results).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "host,active,method\n10.0.0.1,true,ICMP\n10.0.0.2,false,\n"
        );
    }

    #[test]
    fn test_scan_rows() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(SCAN_HEADER).unwrap();

        let open = HostScanResult {
            host: "10.0.0.1".into(),
            ports: vec![
                PortProbeOutcome::from_result(22, Ok(())).with_service(Some("ssh".into())),
                PortProbeOutcome::from_result(23, Err(ProbeError::Refused)),
            ],
            error: None,
        };
        let down = HostScanResult {
            host: "10.0.0.2".into(),
            ports: Vec::new(),
            error: Some(HostScanError {
                down: Some(ProbeError::NoRoute),
                failures: Vec::new(),
            }),
        };
        write_scan(&mut wtr, &open).unwrap();
        write_scan(&mut wtr, &down).unwrap();

        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "host,port,state,service,error\n\
             10.0.0.1,22,open,ssh,\n\
             10.0.0.1,23,closed,,\n\
             10.0.0.2,,,,host is down: no route to host\n"
        );
    }
}
