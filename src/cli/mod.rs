//! CLI subcommand definitions and handlers.
//!
//! - `copper [discover]` - Find which hosts in scope are alive (default)
//! - `copper scan` - Scan the most popular TCP ports of every host in scope

mod discover;
mod scan;

pub use discover::DiscoverCommand;
pub use scan::ScanCommand;

use crate::config::AppSettings;
use crate::error::{CliResult, ConfigError};
use crate::ranking::{PortRanking, DEFAULT_REGISTRY_PATH};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// copper - fast host discovery and top-ports scanning.
///
/// Without a subcommand, copper discovers active hosts using ICMP echo and
/// then by checking popular TCP ports until one answers. A host is marked
/// active by the first method that succeeds and is not touched again.
#[derive(Parser, Debug)]
#[command(name = "copper")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A fast host discovery tool", long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Discovery options used when no subcommand is given
    #[command(flatten)]
    pub discover: DiscoverCommand,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// nmap-services style port popularity registry
    #[arg(long, global = true, value_name = "PATH")]
    pub services_file: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover active hosts (the default)
    #[command(alias = "d")]
    Discover(DiscoverCommand),

    /// Scan for open TCP ports
    #[command(alias = "s")]
    Scan(ScanCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Settings and shared state for one invocation.
pub struct RunContext {
    pub settings: AppSettings,
    pub ranking: Arc<PortRanking>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Cli {
    /// Run the selected command.
    pub async fn run(self) -> CliResult<()> {
        let settings = self.load_settings()?;
        let registry = self
            .services_file
            .clone()
            .or_else(|| settings.services_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REGISTRY_PATH));

        let ctx = RunContext {
            ranking: Arc::new(PortRanking::from_registry(registry)),
            settings,
            verbose: self.verbose,
            quiet: self.quiet,
        };

        match self.command {
            Some(Commands::Scan(cmd)) => cmd.execute(&ctx).await,
            Some(Commands::Discover(cmd)) => cmd.execute(&ctx).await,
            None => self.discover.execute(&ctx).await,
        }
    }

    fn load_settings(&self) -> CliResult<AppSettings> {
        if let Some(path) = &self.config {
            return Ok(AppSettings::load_from(path)?);
        }

        match AppSettings::load() {
            Err(ConfigError::DirectoryNotFound) => {
                tracing::warn!("no configuration directory, using default settings");
                Ok(AppSettings::default())
            }
            other => Ok(other?),
        }
    }
}

/// Check if running with root privileges.
pub(crate) fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
