//! Plain text output formatting.
//!
//! Produces human-readable output with colors where the terminal allows.

use crate::scanner::{
    DiscoveryEvent, HostDiscoveryResult, HostScanResult, PortProbeOutcome, ProbeState,
};
use console::{style, Style};
use std::io::{self, Write};
use std::time::Duration;

/// Write alive hosts, one per line.
pub fn write_discovery<W: Write>(out: &mut W, results: &[HostDiscoveryResult]) -> io::Result<()> {
    for result in results.iter().filter(|r| r.active) {
        writeln!(out, "{}", result.host)?;
    }
    Ok(())
}

/// Write the live line for a discovery event.
pub fn write_discovery_event<W: Write>(out: &mut W, event: &DiscoveryEvent) -> io::Result<()> {
    match event {
        DiscoveryEvent::ExtraAttempt { hosts, .. } => {
            writeln!(out, "Performing additional attempt on {} hosts.", hosts)
        }
        DiscoveryEvent::Alive(result) => match result.method {
            Some(method) => writeln!(out, "{}\t{}", result.host, method),
            None => writeln!(out, "{}", result.host),
        },
    }
}

/// Write the closing discovery summary line.
pub fn write_discovery_summary<W: Write>(
    out: &mut W,
    checked: usize,
    active: usize,
    took: Duration,
) -> io::Result<()> {
    writeln!(
        out,
        "Checked {} hosts, {} are active. Took {:.2?}",
        checked, active, took
    )
}

/// Write one host's scan result and, if any, its warning line.
pub fn write_scan<W: Write>(out: &mut W, result: &HostScanResult) -> io::Result<()> {
    let ports: Vec<String> = result.ports.iter().map(format_port).collect();
    writeln!(
        out,
        "{} {} - Ports: [{}]",
        style("[+]").green().bold(),
        style(&result.host).bold(),
        ports.join(", ")
    )?;

    if let Some(error) = &result.error {
        writeln!(out, "{} {}", style("[!] Warning:").yellow().bold(), error)?;
    }
    Ok(())
}

fn format_port(outcome: &PortProbeOutcome) -> String {
    let state_style = match outcome.state {
        ProbeState::Open => Style::new().green(),
        _ => Style::new().red(),
    };
    let state = state_style.apply_to(outcome.state.to_string());
    match &outcome.service {
        Some(service) => format!("{}/{} ({})", outcome.port, state, service),
        None => format!("{}/{}", outcome.port, state),
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HostScanError, ProbeError};
    use crate::scanner::DiscoveryMethod;

    fn render(result: &HostScanResult) -> String {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        write_scan(&mut buf, result).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_discovery_lists_active_hosts() {
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
        assert_eq!(String::from_utf8(buf).unwrap(), "10.0.0.1\n");
    }

    #[test]
    fn test_discovery_events() {
        let mut buf = Vec::new();
        let alive = DiscoveryEvent::Alive(HostDiscoveryResult {
            host: "10.0.0.3".into(),
            method: Some(DiscoveryMethod::TcpPorts),
            active: true,
        });
        write_discovery_event(&mut buf, &alive).unwrap();
        write_discovery_event(&mut buf, &DiscoveryEvent::ExtraAttempt { attempt: 2, hosts: 7 })
            .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "10.0.0.3\tTCP Ports\nPerforming additional attempt on 7 hosts.\n"
        );
    }

    #[test]
    fn test_discovery_summary() {
        let mut buf = Vec::new();
        write_discovery_summary(&mut buf, 254, 12, Duration::from_millis(1500)).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Checked 254 hosts, 12 are active. Took 1.50s\n"
        );
    }

    #[test]
    fn test_scan_line_with_warning() {
        let result = HostScanResult {
            host: "10.0.0.1".into(),
            ports: vec![
                PortProbeOutcome::from_result(22, Ok(())).with_service(Some("ssh".into())),
                PortProbeOutcome::from_result(81, Err(ProbeError::Refused)),
            ],
            error: Some(HostScanError {
                down: None,
                failures: vec![crate::error::PortFailure {
                    port: 8080,
                    cause: ProbeError::Other("reset".into()),
                }],
            }),
        };

        let text = render(&result);
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "[+] 10.0.0.1 - Ports: [22/open (ssh), 81/closed]"
        );
        assert_eq!(lines.next().unwrap(), "[!] Warning: port 8080: reset");
        assert!(lines.next().is_none());
    }
}
