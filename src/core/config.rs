//! Configuration types for kelpie-reports.
//!
//! Two layers live here: the flag-level vocabulary of a single report job
//! ([`Mode`], [`Model`], the save flag) and the file-level [`ReportsConfig`]
//! that fixes where result files are read from, where reports are written
//! and how tables and plots are rendered.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{ReportError, Result};

/// Category of explanation an experiment evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Removing the explanation changes the prediction.
    Necessary,
    /// The explanation alone is enough to support the prediction.
    Sufficient,
}

impl Mode {
    /// All modes, in the order reports are produced.
    pub const ALL: [Mode; 2] = [Mode::Necessary, Mode::Sufficient];

    /// Lowercase identifier used on the command line and in file paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Necessary => "necessary",
            Mode::Sufficient => "sufficient",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "necessary" => Ok(Mode::Necessary),
            "sufficient" => Ok(Mode::Sufficient),
            _ => Err(ReportError::invalid_config_field(
                format!("unrecognized mode '{value}' (expected necessary or sufficient)"),
                "mode",
            )),
        }
    }
}

/// Knowledge-graph embedding model under study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Model {
    /// ComplEx (complex-valued bilinear model)
    ComplEx,
    /// ConvE (convolutional model)
    ConvE,
    /// TransE (translational model)
    TransE,
}

impl Model {
    /// All models, in the order reports are produced.
    pub const ALL: [Model; 3] = [Model::ComplEx, Model::ConvE, Model::TransE];

    /// Canonical model name, as used in result files and output paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Model::ComplEx => "ComplEx",
            Model::ConvE => "ConvE",
            Model::TransE => "TransE",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self> {
        Model::ALL
            .into_iter()
            .find(|model| model.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                ReportError::invalid_config_field(
                    format!("unrecognized model '{value}' (expected ComplEx, ConvE or TransE)"),
                    "model",
                )
            })
    }
}

/// Parse the value of a `--save` style boolean flag.
pub fn parse_save_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ReportError::invalid_config_field(
            format!("unrecognized save flag '{value}' (expected True or False)"),
            "save",
        )),
    }
}

/// Output format for tabular reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// GitHub-flavoured markdown table
    #[default]
    Markdown,
    /// LaTeX `tabular` environment for the paper
    Latex,
    /// Plain CSV
    Csv,
}

impl TableFormat {
    /// File extension used when the table is saved.
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Markdown => "md",
            TableFormat::Latex => "tex",
            TableFormat::Csv => "csv",
        }
    }
}

impl FromStr for TableFormat {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(TableFormat::Markdown),
            "latex" | "tex" => Ok(TableFormat::Latex),
            "csv" => Ok(TableFormat::Csv),
            _ => Err(ReportError::invalid_config_field(
                format!("unrecognized table format '{value}'"),
                "tables.format",
            )),
        }
    }
}

/// Main configuration for report generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Table rendering settings
    #[serde(default)]
    pub tables: TablesConfig,

    /// Plot rendering settings
    #[serde(default)]
    pub plots: PlotsConfig,
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory holding precomputed experiment results
    pub results_dir: PathBuf,

    /// Root directory saved reports are written under
    pub output_dir: PathBuf,

    /// Optional directory with `.hbs` templates overriding the built-in ones
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            output_dir: PathBuf::from("reports"),
            templates_dir: None,
        }
    }
}

/// Table rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablesConfig {
    /// Output format for saved and displayed tables
    #[serde(default)]
    pub format: TableFormat,

    /// Decimal places for metric cells
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_precision() -> usize {
    3
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            format: TableFormat::default(),
            precision: default_precision(),
        }
    }
}

/// Plot rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotsConfig {
    /// Figure width in pixels
    pub width: u32,

    /// Figure height in pixels
    pub height: u32,
}

impl Default for PlotsConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 640,
        }
    }
}

impl ReportsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ReportError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            ReportError::io(format!("Failed to write config file: {}", path.display()), e)
        })
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.paths.results_dir.as_os_str().is_empty() {
            return Err(ReportError::invalid_config_field(
                "results directory must not be empty",
                "paths.results_dir",
            ));
        }
        if self.paths.output_dir.as_os_str().is_empty() {
            return Err(ReportError::invalid_config_field(
                "output directory must not be empty",
                "paths.output_dir",
            ));
        }
        if self.tables.precision > 10 {
            return Err(ReportError::invalid_config_field(
                format!("precision must be at most 10, got {}", self.tables.precision),
                "tables.precision",
            ));
        }
        if self.plots.width == 0 || self.plots.height == 0 {
            return Err(ReportError::invalid_config_field(
                format!(
                    "plot dimensions must be positive, got {}x{}",
                    self.plots.width, self.plots.height
                ),
                "plots",
            ));
        }
        Ok(())
    }
}
