//! Report kinds and their aggregations.
//!
//! Each submodule turns the records of one result file into [`ReportData`]:
//! either a table or a plot description, plus the summary statistics the
//! report is built around. Rendering and persistence live in
//! [`crate::io::reports`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::config::{parse_save_flag, Mode, Model};
use crate::core::errors::{ReportError, Result};
use crate::core::records::{RecordSet, ResultRecord, RESULT_EXTENSIONS};

pub mod end_to_end;
pub mod explanation_lengths;
pub mod extraction_times;
pub mod prefilter_comparison;
pub mod xsi_threshold;

/// The report types produced for the paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// ΔH@1 / ΔMRR of every method, per model and dataset
    EndToEnd,
    /// Distribution of extracted explanation lengths for one model
    ExplanationLengths,
    /// Mean extraction time per model and dataset
    ExtractionTimes,
    /// Effectiveness of the candidate prefilters
    PrefilterComparison,
    /// Effect of the xsi threshold on necessary explanations
    XsiThreshold,
}

/// Whether a report renders as a table or a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// Textual table
    Table,
    /// SVG figure
    Plot,
}

impl ReportKind {
    /// All kinds, tables first, then plots, then comparison plots.
    pub const ALL: [ReportKind; 5] = [
        ReportKind::EndToEnd,
        ReportKind::ExplanationLengths,
        ReportKind::ExtractionTimes,
        ReportKind::PrefilterComparison,
        ReportKind::XsiThreshold,
    ];

    /// Identifier used on the command line and as directory name.
    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::EndToEnd => "end-to-end",
            ReportKind::ExplanationLengths => "explanation-lengths",
            ReportKind::ExtractionTimes => "extraction-times",
            ReportKind::PrefilterComparison => "prefilter-comparison",
            ReportKind::XsiThreshold => "xsi-threshold",
        }
    }

    /// One-line description for listings.
    pub fn description(self) -> &'static str {
        match self {
            ReportKind::EndToEnd => "End-to-end effectiveness table (ΔH@1, ΔMRR per method)",
            ReportKind::ExplanationLengths => "Histogram of explanation lengths for one model",
            ReportKind::ExtractionTimes => "Mean explanation extraction time per model and dataset",
            ReportKind::PrefilterComparison => "Effectiveness and cost of each prefilter",
            ReportKind::XsiThreshold => "ΔH@1 as a function of the xsi threshold",
        }
    }

    /// Table or plot.
    pub fn shape(self) -> OutputShape {
        match self {
            ReportKind::EndToEnd => OutputShape::Table,
            _ => OutputShape::Plot,
        }
    }

    /// Whether `--mode` must be given.
    pub fn requires_mode(self) -> bool {
        !matches!(self, ReportKind::XsiThreshold)
    }

    /// Whether `--model` must be given.
    pub fn requires_model(self) -> bool {
        matches!(self, ReportKind::ExplanationLengths)
    }

    /// Fields every record of this kind must carry.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            ReportKind::EndToEnd => end_to_end::REQUIRED_FIELDS,
            ReportKind::ExplanationLengths => explanation_lengths::REQUIRED_FIELDS,
            ReportKind::ExtractionTimes => extraction_times::REQUIRED_FIELDS,
            ReportKind::PrefilterComparison => prefilter_comparison::REQUIRED_FIELDS,
            ReportKind::XsiThreshold => xsi_threshold::REQUIRED_FIELDS,
        }
    }

    /// Aggregate loaded records into the data this report renders.
    pub fn aggregate(self, records: &RecordSet, config: &ReportConfig) -> Result<ReportData> {
        records.require_fields(self.required_fields())?;
        match self {
            ReportKind::EndToEnd => end_to_end::aggregate(records, config),
            ReportKind::ExplanationLengths => explanation_lengths::aggregate(records, config),
            ReportKind::ExtractionTimes => extraction_times::aggregate(records, config),
            ReportKind::PrefilterComparison => prefilter_comparison::aggregate(records, config),
            ReportKind::XsiThreshold => xsi_threshold::aggregate(records, config),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == normalized)
            .ok_or_else(|| {
                ReportError::invalid_config_field(
                    format!("unrecognized report kind '{value}'"),
                    "kind",
                )
            })
    }
}

/// Validated configuration of one report job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportConfig {
    /// Report to produce
    pub kind: ReportKind,
    /// Explanation mode the results belong to
    pub mode: Mode,
    /// Embedding model, for model-specific reports
    pub model: Option<Model>,
    /// Persist the report instead of displaying it
    pub save: bool,
}

impl ReportConfig {
    /// Build a job configuration from typed values, checking kind requirements.
    pub fn new(
        kind: ReportKind,
        mode: Option<Mode>,
        model: Option<Model>,
        save: bool,
    ) -> Result<Self> {
        let mode = match (kind, mode) {
            (ReportKind::XsiThreshold, Some(Mode::Sufficient)) => {
                return Err(ReportError::invalid_config_field(
                    "the xsi threshold only applies to necessary explanations",
                    "mode",
                ))
            }
            (ReportKind::XsiThreshold, _) => Mode::Necessary,
            (_, Some(mode)) => mode,
            (_, None) => {
                return Err(ReportError::invalid_config_field(
                    format!("report '{kind}' requires --mode"),
                    "mode",
                ))
            }
        };

        if kind.requires_model() && model.is_none() {
            return Err(ReportError::invalid_config_field(
                format!("report '{kind}' requires --model"),
                "model",
            ));
        }

        Ok(Self {
            kind,
            mode,
            model,
            save,
        })
    }

    /// Build a job configuration from raw command-line style flag values.
    ///
    /// Every value is validated here, before any file is touched.
    pub fn from_flags(
        kind: &str,
        mode: Option<&str>,
        model: Option<&str>,
        save: Option<&str>,
    ) -> Result<Self> {
        let kind = kind.parse::<ReportKind>()?;
        let mode = mode.map(str::parse::<Mode>).transpose()?;
        let model = model.map(str::parse::<Model>).transpose()?;
        let save = save.map(parse_save_flag).transpose()?.unwrap_or(false);
        Self::new(kind, mode, model, save)
    }

    /// Model that selects the input file, if the kind is model-specific.
    fn path_model(&self) -> Option<Model> {
        self.model.filter(|_| self.kind.requires_model())
    }

    /// Input file candidates, in lookup order.
    pub fn input_candidates(&self, results_dir: &Path) -> Vec<PathBuf> {
        let kind_dir = results_dir.join(self.kind.slug());
        let stem = match self.path_model() {
            Some(model) => kind_dir.join(self.mode.as_str()).join(model.as_str()),
            None => kind_dir.join(self.mode.as_str()),
        };
        RESULT_EXTENSIONS
            .iter()
            .map(|ext| stem.with_extension(ext))
            .collect()
    }

    /// File name stem of the saved report.
    pub fn output_stem(&self) -> String {
        match self.model {
            Some(model) => format!("{}_{}", self.mode, model),
            None => self.mode.to_string(),
        }
    }

    /// Whether a record's `model` value passes the optional model filter.
    ///
    /// Model-agnostic reports given `--model` only keep that model's rows.
    pub fn accepts_model(&self, model: &str) -> bool {
        match self.model {
            Some(selected) if !self.kind.requires_model() => {
                selected.as_str().eq_ignore_ascii_case(model)
            }
            _ => true,
        }
    }

    /// Human-readable job label used in logs and batch summaries.
    pub fn label(&self) -> String {
        match self.model {
            Some(model) => format!("{} [{} / {}]", self.kind, self.mode, model),
            None => format!("{} [{}]", self.kind, self.mode),
        }
    }
}

/// Ordered summary statistics of a report.
pub type Summary = IndexMap<String, f64>;

/// Data of a tabular report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    /// Table caption
    pub title: String,
    /// Column headers
    pub headers: Vec<String>,
    /// Rows of cells; numeric cells are `Some`, absent cells `None`
    pub rows: Vec<TableRow>,
}

/// One row of a tabular report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// Leading label cells (model, dataset, ...)
    pub labels: Vec<String>,
    /// Metric cells following the labels
    pub values: Vec<Option<f64>>,
}

/// Chart flavour of a plot report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    /// Grouped bars over categorical x values
    GroupedBars,
    /// Lines over numeric x values
    Lines,
}

/// One plotted series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Legend label
    pub label: String,
    /// `(x, y)` points; for bar charts `x` is the category index
    pub points: Vec<(f64, f64)>,
}

/// Data of a plot report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotData {
    /// Figure caption
    pub title: String,
    /// Chart flavour
    pub chart: ChartKind,
    /// X axis description
    pub x_label: String,
    /// Y axis description
    pub y_label: String,
    /// Category names for bar charts, indexed by `x`
    pub categories: Vec<String>,
    /// Plotted series
    pub series: Vec<Series>,
}

/// Body of a report before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportBody {
    /// Tabular report
    Table(TableData),
    /// Plot report
    Plot(PlotData),
}

/// Aggregated report data: what gets rendered plus its summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    /// Table or plot contents
    pub body: ReportBody,
    /// Summary statistics computed from the records
    pub summary: Summary,
}

/// Records that pass the job's model filter, in file order.
///
/// A filter that removes every record means the data for that model is absent.
pub(crate) fn selected_records<'a>(
    records: &'a RecordSet,
    config: &ReportConfig,
) -> Result<Vec<&'a ResultRecord>> {
    let mut selected = Vec::with_capacity(records.len());
    for record in records.records() {
        let keep = match record.get("model") {
            Some(_) => config.accepts_model(&records.text(record, "model")?),
            None => true,
        };
        if keep {
            selected.push(record);
        }
    }

    if selected.is_empty() {
        let model = config.model.map(|m| m.to_string()).unwrap_or_default();
        return Err(ReportError::data_not_found(
            format!(
                "{} holds no records for model {model}",
                records.path().display()
            ),
            vec![records.path().to_path_buf()],
        ));
    }
    Ok(selected)
}

/// Human-readable caption shared by the aggregations.
pub(crate) fn caption(config: &ReportConfig, subject: &str) -> String {
    match config.model {
        Some(model) => format!("{subject} ({} explanations, {model})", config.mode),
        None => format!("{subject} ({} explanations)", config.mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_slugs_and_snake_case() {
        assert_eq!(
            "explanation-lengths".parse::<ReportKind>().unwrap(),
            ReportKind::ExplanationLengths
        );
        assert_eq!(
            "xsi_threshold".parse::<ReportKind>().unwrap(),
            ReportKind::XsiThreshold
        );
        assert!("heatmap".parse::<ReportKind>().is_err());
    }

    #[test]
    fn unrecognized_mode_fails_before_io() {
        let err = ReportConfig::from_flags("end-to-end", Some("both"), None, None).unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig { .. }));
    }

    #[test]
    fn model_specific_kind_requires_model() {
        let err = ReportConfig::from_flags("explanation-lengths", Some("necessary"), None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::InvalidConfig { field: Some(ref f), .. } if f == "model"
        ));
    }

    #[test]
    fn mode_dependent_kind_requires_mode() {
        let err = ReportConfig::from_flags("extraction-times", None, None, None).unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig { .. }));
    }

    #[test]
    fn xsi_threshold_defaults_to_necessary_and_rejects_sufficient() {
        let config = ReportConfig::from_flags("xsi-threshold", None, None, Some("True")).unwrap();
        assert_eq!(config.mode, Mode::Necessary);
        assert!(config.save);

        let err =
            ReportConfig::from_flags("xsi-threshold", Some("sufficient"), None, None).unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig { .. }));
    }

    #[test]
    fn input_candidates_follow_result_layout() {
        let config = ReportConfig::from_flags(
            "explanation-lengths",
            Some("necessary"),
            Some("ComplEx"),
            None,
        )
        .unwrap();
        let candidates = config.input_candidates(Path::new("results"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("results/explanation-lengths/necessary/ComplEx.csv"),
                PathBuf::from("results/explanation-lengths/necessary/ComplEx.json"),
            ]
        );
        assert_eq!(config.output_stem(), "necessary_ComplEx");
    }

    #[test]
    fn model_filters_rows_of_model_agnostic_kinds() {
        let config =
            ReportConfig::from_flags("end-to-end", Some("sufficient"), Some("TransE"), None)
                .unwrap();
        assert_eq!(
            config.input_candidates(Path::new("r"))[0],
            PathBuf::from("r/end-to-end/sufficient.csv")
        );
        assert_eq!(config.output_stem(), "sufficient_TransE");
        assert!(config.accepts_model("transe"));
        assert!(!config.accepts_model("ComplEx"));
    }
}
