//! CLI Argument Structures
//!
//! Command-line definitions for the kelpie-reports binary. Report flags are
//! kept as raw strings here and validated by the library before any file
//! is read.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use kelpie_reports::TableFormat;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tables and plots for the Kelpie paper from precomputed experiment results
#[derive(Parser)]
#[command(name = "kelpie-reports")]
#[command(version = VERSION)]
#[command(about = "Kelpie Reports - tables and figures from explanation experiments")]
#[command(long_about = "
Generate the tables and plots of the Kelpie paper from precomputed
experiment result files. Reports are displayed unless --save is given.

Common Usage:

  # Display the end-to-end table for necessary explanations
  kelpie-reports generate end-to-end --mode necessary

  # Save the explanation length histogram for ComplEx
  kelpie-reports generate explanation-lengths --mode necessary --model ComplEx --save

  # Produce every report of the paper
  kelpie-reports batch --save

  # Show the available report kinds
  kelpie-reports list-reports
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to .kelpie-reports.yml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root directory holding the experiment results
    #[arg(long, global = true, env = "KELPIE_RESULTS_DIR", value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Root directory saved reports are written under
    #[arg(long, global = true, env = "KELPIE_OUTPUT_DIR", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Table format: markdown, latex or csv
    #[arg(long, global = true, value_name = "FORMAT")]
    pub format: Option<TableFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a single report
    Generate(GenerateArgs),

    /// Run a sequence of report jobs
    Batch(BatchArgs),

    /// List the report kinds and the flags they require
    #[command(name = "list-reports")]
    ListReports,

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Initialize a configuration file with defaults
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),

    /// Validate the configuration file given with --config
    #[command(name = "validate-config")]
    ValidateConfig,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Report kind (see list-reports)
    #[arg(value_name = "KIND")]
    pub kind: String,

    /// Explanation mode: necessary or sufficient
    #[arg(long)]
    pub mode: Option<String>,

    /// Embedding model: ComplEx, ConvE or TransE
    #[arg(long)]
    pub model: Option<String>,

    /// Save the report instead of displaying it (True/False, bare flag means True)
    #[arg(
        long,
        num_args = 0..=1,
        default_value = "False",
        default_missing_value = "True",
        value_name = "BOOL"
    )]
    pub save: String,
}

#[derive(Args)]
pub struct BatchArgs {
    /// YAML plan file (defaults to the full paper sequence)
    #[arg(long, value_name = "FILE")]
    pub plan: Option<PathBuf>,

    /// Run jobs on a thread pool instead of stopping at the first failure
    #[arg(long)]
    pub parallel: bool,

    /// Save every report regardless of the plan
    #[arg(long)]
    pub save: bool,

    /// Print the plan as YAML and exit
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct InitConfigArgs {
    /// Output configuration file name
    #[arg(short, long, default_value = ".kelpie-reports.yml")]
    pub output: PathBuf,

    /// Overwrite existing configuration file
    #[arg(short, long)]
    pub force: bool,
}
