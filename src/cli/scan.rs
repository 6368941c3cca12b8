//! Scan subcommand implementation.
//!
//! Handles `copper scan` for top-ports TCP scanning.

use crate::cli::{OutputFormat, RunContext};
use crate::config::ScanSettings;
use crate::error::CliResult;
use crate::output::ScanWriter;
use crate::scanner::PortScanner;
use crate::types::load_targets;
use clap::Args;
use std::io;
use std::sync::Arc;

/// Scan for open TCP ports.
#[derive(Args, Debug, Default)]
pub struct ScanCommand {
    /// TCP timeout in milliseconds [default: 500]
    #[arg(short = 'T', long, value_name = "MS")]
    pub tcp_timeout: Option<u64>,

    /// Number of TCP ports to check [default: 1000]
    #[arg(short = 't', long, value_name = "N")]
    pub top: Option<usize>,

    /// Worker count, defaults to the number of hosts
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Ports to check per second on each host [default: 100]
    #[arg(short = 'r', long)]
    pub rate: Option<usize>,

    /// Maximum outstanding probes per host
    #[arg(long, value_name = "N")]
    pub max_in_flight: Option<usize>,

    /// File with scope to check, `-` for stdin [default: scope.txt]
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<String>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, ctx: &RunContext) -> CliResult<()> {
        let source = self.file.as_deref().unwrap_or(&ctx.settings.scope_file);
        let hosts = load_targets(source)?;

        let config = self.merge(&ctx.settings.scan).to_config();
        let scanner = PortScanner::new(config, Arc::clone(&ctx.ranking))?;

        let mut writer = ScanWriter::new(io::stdout(), self.output)?;
        let mut results = scanner.scan(hosts);
        while let Some(result) = results.recv().await {
            writer.write(&result)?;
        }

        Ok(())
    }

    /// Apply command-line overrides on top of stored settings.
    fn merge(&self, base: &ScanSettings) -> ScanSettings {
        ScanSettings {
            tcp_timeout_ms: self.tcp_timeout.unwrap_or(base.tcp_timeout_ms),
            top_ports: self.top.unwrap_or(base.top_ports),
            workers: self.workers.unwrap_or(base.workers),
            rate: self.rate.unwrap_or(base.rate),
            max_in_flight: self.max_in_flight.or(base.max_in_flight),
        }
    }
}
