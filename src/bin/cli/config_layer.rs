//! Configuration Layer Management
//!
//! Layers report settings: defaults, then an explicit `--config` file or an
//! implicit `.kelpie-reports.yml` / `.kelpie-reports.yaml` (falling back to
//! the user config directory), then environment variables and CLI flags
//! (clap resolves those two together).

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::cli::args::Cli;
use kelpie_reports::ReportsConfig;

/// File names looked up in the working directory when `--config` is absent.
pub const IMPLICIT_CONFIG_FILES: [&str; 2] = [".kelpie-reports.yml", ".kelpie-reports.yaml"];

/// Merge higher-priority values into an existing configuration.
pub trait ConfigMerge<T> {
    /// Merge another configuration into this one, with the other taking priority
    fn merge_with(&mut self, other: T);
}

/// Overrides taken from the command line and environment.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub results_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<kelpie_reports::TableFormat>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            results_dir: cli.results_dir.clone(),
            output_dir: cli.output_dir.clone(),
            format: cli.format,
        }
    }
}

impl ConfigMerge<CliOverrides> for ReportsConfig {
    fn merge_with(&mut self, other: CliOverrides) {
        if let Some(results_dir) = other.results_dir {
            self.paths.results_dir = results_dir;
        }
        if let Some(output_dir) = other.output_dir {
            self.paths.output_dir = output_dir;
        }
        if let Some(format) = other.format {
            self.tables.format = format;
        }
    }
}

/// Configuration file in effect: the explicit one, or the first implicit
/// file present in `dir`.
pub fn config_file_in(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => IMPLICIT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists()),
    }
}

/// Per-user configuration file, e.g. `~/.config/kelpie-reports/config.yml`.
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("kelpie-reports").join("config.yml"))
        .filter(|p| p.is_file())
}

/// Load a configuration file, or the defaults when there is none.
pub fn load_configuration(config_path: Option<&Path>) -> anyhow::Result<ReportsConfig> {
    match config_path {
        Some(path) => {
            let config = ReportsConfig::from_yaml_file(path).with_context(|| {
                format!("Failed to load configuration from {}", path.display())
            })?;
            debug!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(ReportsConfig::default()),
    }
}

/// Build the effective configuration for a command.
pub fn build_layered_config(cli: &Cli) -> anyhow::Result<ReportsConfig> {
    let config_path =
        config_file_in(cli.config.as_deref(), Path::new(".")).or_else(user_config_file);
    let mut config = load_configuration(config_path.as_deref())?;
    config.merge_with(CliOverrides::from(cli));

    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}
