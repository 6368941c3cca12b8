use anyhow::Result;
use clap::Parser;
use copper::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so results on stdout stay machine-readable.
    let filter = if cli.verbose { "copper=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.run().await {
        copper::output::print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
