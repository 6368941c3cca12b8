//! Discover subcommand implementation.
//!
//! Handles `copper discover` (and bare `copper`) for finding active hosts.

use crate::cli::{is_root, OutputFormat, RunContext};
use crate::config::DiscoverySettings;
use crate::error::CliResult;
use crate::output;
use crate::scanner::HostDiscovery;
use crate::types::load_targets;
use clap::Args;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

/// Discover active hosts.
#[derive(Args, Debug, Default)]
pub struct DiscoverCommand {
    /// ICMP timeout in milliseconds, 0 to skip ICMP [default: 500]
    #[arg(short = 'i', long, value_name = "MS")]
    pub icmp_timeout: Option<u64>,

    /// TCP timeout in milliseconds, 0 to skip TCP [default: 500]
    #[arg(short = 't', long, value_name = "MS")]
    pub tcp_timeout: Option<u64>,

    /// Number of TCP ports to check [default: 100]
    #[arg(short = 'T', long, value_name = "N")]
    pub tcp_ports: Option<usize>,

    /// Worker count, defaults to the number of hosts
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Number of attempts per host [default: 1]
    #[arg(short = 'a', long)]
    pub attempts: Option<u32>,

    /// File with scope to check, `-` for stdin [default: scope.txt]
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<String>,

    /// Use raw ICMP sockets (requires root or CAP_NET_RAW)
    #[arg(long)]
    pub privileged: bool,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl DiscoverCommand {
    /// Execute the discover command.
    pub async fn execute(&self, ctx: &RunContext) -> CliResult<()> {
        let start = Instant::now();

        let source = self.file.as_deref().unwrap_or(&ctx.settings.scope_file);
        let hosts = load_targets(source)?;

        let settings = self.merge(&ctx.settings.discovery);
        if settings.privileged && !is_root() {
            output::print_warning(
                "--privileged needs root or CAP_NET_RAW; ICMP probes may report no reply.",
            );
        }

        // Live per-host lines only make sense for plain output.
        let live = ctx.verbose && self.output == OutputFormat::Plain;
        let config = settings
            .to_config()
            .with_progress(self.progress && !ctx.quiet);

        let mut engine = HostDiscovery::new(config, Arc::clone(&ctx.ranking))?;
        if live {
            engine = engine.with_reporter(|event| {
                if let Err(e) = output::write_discovery_event(&mut io::stdout().lock(), event) {
                    tracing::warn!(error = %e, "failed to write discovery line");
                }
            });
        }
        let checked = hosts.len();
        let results = engine.run(hosts).await;
        let active = results.iter().filter(|r| r.active).count();

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if !live {
            output::write_discovery(&mut out, &results, self.output)?;
        }
        if !ctx.quiet {
            if self.output == OutputFormat::Plain {
                output::write_discovery_summary(&mut out, checked, active, start.elapsed())?;
            } else {
                output::write_discovery_summary(&mut io::stderr(), checked, active, start.elapsed())?;
            }
        }
        out.flush()?;

        Ok(())
    }

    /// Apply command-line overrides on top of stored settings.
    fn merge(&self, base: &DiscoverySettings) -> DiscoverySettings {
        DiscoverySettings {
            icmp_timeout_ms: self.icmp_timeout.unwrap_or(base.icmp_timeout_ms),
            tcp_timeout_ms: self.tcp_timeout.unwrap_or(base.tcp_timeout_ms),
            tcp_ports: self.tcp_ports.unwrap_or(base.tcp_ports),
            workers: self.workers.unwrap_or(base.workers),
            attempts: self.attempts.unwrap_or(base.attempts),
            privileged: self.privileged || base.privileged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let base = DiscoverySettings {
            attempts: 2,
            workers: 16,
            ..DiscoverySettings::default()
        };
        let cmd = DiscoverCommand {
            icmp_timeout: Some(0),
            attempts: Some(4),
            ..DiscoverCommand::default()
        };

        let merged = cmd.merge(&base);
        assert_eq!(merged.icmp_timeout_ms, 0);
        assert_eq!(merged.attempts, 4);
        assert_eq!(merged.workers, 16);
        assert_eq!(merged.tcp_ports, 100);
        assert!(!merged.privileged);
    }
}
