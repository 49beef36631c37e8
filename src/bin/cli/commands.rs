//! Command Execution
//!
//! Entry points for each subcommand. Report output goes to stdout; progress
//! and diagnostics go through tracing on stderr.

use std::io::{self, Write};

use anyhow::Context;
use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};
use tracing::info;

use crate::cli::args::{BatchArgs, Cli, GenerateArgs, InitConfigArgs};
use crate::cli::config_layer::{build_layered_config, config_file_in, load_configuration};
use kelpie_reports::api::batch::BatchSummary;
use kelpie_reports::{
    BatchPlan, BatchRunner, ReportConfig, ReportGenerator, ReportKind, ReportOutcome,
    ReportsConfig,
};

/// Generate a single report.
pub async fn generate_command(cli: &Cli, args: &GenerateArgs) -> anyhow::Result<()> {
    // Flags are checked before the configuration or any result file is read.
    let config = ReportConfig::from_flags(
        &args.kind,
        args.mode.as_deref(),
        args.model.as_deref(),
        Some(&args.save),
    )?;

    let settings = build_layered_config(cli)?;
    let generator = ReportGenerator::new(settings)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match generator.generate(&config, &mut out)? {
        ReportOutcome::Saved(path) => {
            writeln!(out, "{} {}", "Saved".bright_green().bold(), path.display())?;
        }
        ReportOutcome::Displayed => {}
    }
    out.flush()?;
    Ok(())
}

/// Run a batch plan.
pub async fn batch_command(cli: &Cli, args: &BatchArgs) -> anyhow::Result<()> {
    let plan = match &args.plan {
        Some(path) => BatchPlan::from_yaml_file(path)
            .with_context(|| format!("Failed to load batch plan {}", path.display()))?,
        None => BatchPlan::paper(),
    };

    if args.dry_run {
        print!("{}", serde_yaml::to_string(&plan)?);
        return Ok(());
    }

    let settings = build_layered_config(cli)?;
    let generator = ReportGenerator::new(settings)?;
    let runner = BatchRunner::new(&generator).with_force_save(args.save);

    info!(
        "Running {} report jobs ({})",
        plan.len(),
        if args.parallel { "parallel" } else { "sequential" }
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = if args.parallel {
        runner.run_parallel(&plan, &mut out)?
    } else {
        runner.run_sequential(&plan, &mut out)
    };
    out.flush()?;
    drop(out);

    print_batch_summary(&summary);

    match summary.first_failure() {
        Some(failure) => Err(anyhow::anyhow!(
            "job {} ({}) failed: {}",
            failure.index + 1,
            failure.label,
            failure.error
        )),
        None => Ok(()),
    }
}

fn print_batch_summary(summary: &BatchSummary) {
    #[derive(Tabled)]
    struct JobRow {
        #[tabled(rename = "#")]
        index: usize,
        job: String,
        status: String,
    }

    let mut rows: Vec<JobRow> = summary
        .completed
        .iter()
        .map(|job| JobRow {
            index: job.index + 1,
            job: job.label.clone(),
            status: match &job.outcome {
                ReportOutcome::Saved(path) => format!("saved {}", path.display()),
                ReportOutcome::Displayed => "displayed".to_string(),
            },
        })
        .chain(summary.failed.iter().map(|job| JobRow {
            index: job.index + 1,
            job: job.label.clone(),
            status: format!("failed: {}", job.error.category()),
        }))
        .collect();
    rows.sort_by_key(|row| row.index);

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    eprintln!("{table}");

    if summary.skipped > 0 {
        eprintln!(
            "{} {} job(s) not run after the first failure",
            "Skipped".yellow().bold(),
            summary.skipped
        );
    }
}

/// List report kinds and the flags each requires.
pub async fn list_reports() -> anyhow::Result<()> {
    println!("{}", "Available Reports".bright_blue().bold());
    println!();

    #[derive(Tabled)]
    struct ReportRow {
        kind: String,
        output: String,
        flags: String,
        description: String,
    }

    let rows: Vec<ReportRow> = ReportKind::ALL
        .into_iter()
        .map(|kind| {
            let mut flags = Vec::new();
            if kind.requires_mode() {
                flags.push("--mode");
            }
            if kind.requires_model() {
                flags.push("--model");
            }
            ReportRow {
                kind: kind.slug().to_string(),
                output: format!("{:?}", kind.shape()).to_lowercase(),
                flags: if flags.is_empty() {
                    "-".to_string()
                } else {
                    flags.join(" ")
                },
                description: kind.description().to_string(),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");

    println!();
    println!(
        "{}",
        "Tip: add --save to write a report under the output directory".dimmed()
    );
    Ok(())
}

/// Print default configuration in YAML format
///
/// Output is plain text so it can be redirected straight into a config file.
pub async fn print_default_config() -> anyhow::Result<()> {
    println!("# Default kelpie-reports configuration");
    println!("# Usage: kelpie-reports --config your-config.yml generate ...");
    println!();

    let yaml_output = serde_yaml::to_string(&ReportsConfig::default())?;
    println!("{yaml_output}");
    Ok(())
}

/// Initialize a configuration file with defaults
pub async fn init_config(args: &InitConfigArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "Configuration file already exists: {} (use --force to overwrite)",
            args.output.display()
        );
    }

    let yaml_content = serde_yaml::to_string(&ReportsConfig::default())?;
    tokio::fs::write(&args.output, yaml_content)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "{} {}",
        "Configuration saved to:".bright_green().bold(),
        args.output.display().to_string().cyan()
    );
    Ok(())
}

/// Validate the configuration file named by `--config` (or the implicit one).
pub async fn validate_config(cli: &Cli) -> anyhow::Result<()> {
    let Some(path) = config_file_in(cli.config.as_deref(), std::path::Path::new(".")) else {
        anyhow::bail!("No configuration file given; pass --config FILE");
    };

    let config = load_configuration(Some(&path))?;
    config
        .validate()
        .with_context(|| format!("{} is not a valid configuration", path.display()))?;

    println!(
        "{} {}",
        "Configuration file is valid:".bright_green().bold(),
        path.display()
    );

    #[derive(Tabled)]
    struct SettingRow {
        setting: String,
        value: String,
    }

    let rows = vec![
        SettingRow {
            setting: "paths.results_dir".to_string(),
            value: config.paths.results_dir.display().to_string(),
        },
        SettingRow {
            setting: "paths.output_dir".to_string(),
            value: config.paths.output_dir.display().to_string(),
        },
        SettingRow {
            setting: "tables.format".to_string(),
            value: format!("{:?}", config.tables.format).to_lowercase(),
        },
        SettingRow {
            setting: "tables.precision".to_string(),
            value: config.tables.precision.to_string(),
        },
        SettingRow {
            setting: "plots".to_string(),
            value: format!("{}x{}", config.plots.width, config.plots.height),
        },
    ];

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");
    Ok(())
}
