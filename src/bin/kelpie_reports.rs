//! kelpie-reports CLI
//!
//! Generates the tables and plots of the Kelpie paper from precomputed
//! experiment results, one report at a time or as a batch.

use clap::Parser;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // stdout is reserved for report output
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Generate(args) => cli::generate_command(&cli, args).await?,
        Commands::Batch(args) => cli::batch_command(&cli, args).await?,
        Commands::ListReports => cli::list_reports().await?,
        Commands::PrintDefaultConfig => cli::print_default_config().await?,
        Commands::InitConfig(args) => cli::init_config(args).await?,
        Commands::ValidateConfig => cli::validate_config(&cli).await?,
    }

    Ok(())
}
