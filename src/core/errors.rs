//! Error types for the kelpie-reports library.
//!
//! Every report job fails with one of three domain errors: the expected
//! result file is missing ([`ReportError::DataNotFound`]), it is present but
//! malformed ([`ReportError::Schema`]), or a flag value was not recognized
//! ([`ReportError::InvalidConfig`]). The remaining variants carry ambient
//! failures from the filesystem, the plotting backend and the template engine.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Error type for all report operations.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The expected result file does not exist or cannot be opened.
    #[error("Result data not found: {message}")]
    DataNotFound {
        /// Human-readable error message
        message: String,
        /// Paths that were tried, in lookup order
        candidates: Vec<PathBuf>,
    },

    /// The result file exists but a record does not match the report schema.
    #[error("Schema error in {}: {message}", file.display())]
    Schema {
        /// File holding the malformed record
        file: PathBuf,
        /// Error description
        message: String,
        /// Zero-based record index (if the problem is row-specific)
        row: Option<usize>,
        /// Field that is missing or malformed
        field: Option<String>,
    },

    /// A configuration value or command-line flag is not recognized.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error description
        message: String,
        /// Flag or configuration key that caused the error
        field: Option<String>,
    },

    /// I/O related errors while writing reports or reading configuration.
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Plot drawing or template rendering failed.
    #[error("Render error: {message}")]
    Render {
        /// Error description
        message: String,
        /// Renderer that failed (e.g. "svg", "latex")
        renderer: Option<String>,
    },

    /// Serialization/deserialization errors outside of result records.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ReportError {
    /// Create a data-not-found error listing every path that was tried.
    pub fn data_not_found(message: impl Into<String>, candidates: Vec<PathBuf>) -> Self {
        Self::DataNotFound {
            message: message.into(),
            candidates,
        }
    }

    /// Create a schema error for a whole file.
    pub fn schema(file: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Schema {
            file: file.as_ref().to_path_buf(),
            message: message.into(),
            row: None,
            field: None,
        }
    }

    /// Create a schema error pointing at a specific record field.
    pub fn schema_field(
        file: impl AsRef<Path>,
        row: usize,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Schema {
            file: file.as_ref().to_path_buf(),
            message: message.into(),
            row: Some(row),
            field: Some(field.into()),
        }
    }

    /// Create a new configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn invalid_config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new render error
    pub fn render(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
            renderer: Some(renderer.into()),
        }
    }

    /// Short machine-friendly name of the error category.
    pub fn category(&self) -> &'static str {
        match self {
            Self::DataNotFound { .. } => "DataNotFoundError",
            Self::Schema { .. } => "SchemaError",
            Self::InvalidConfig { .. } => "InvalidConfigError",
            Self::Io { .. } => "IoError",
            Self::Render { .. } => "RenderError",
            Self::Serialization { .. } => "SerializationError",
        }
    }
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for ReportError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<handlebars::TemplateError> for ReportError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::render("latex", format!("template error: {err}"))
    }
}

impl From<handlebars::RenderError> for ReportError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::render("latex", err.to_string())
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        Self::Serialization {
            message: format!("CSV serialization failed: {err}"),
            data_type: Some("CSV".to_string()),
            source: Some(Box::new(err)),
        }
    }
}
