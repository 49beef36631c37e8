//! Report generation: load, aggregate, render, then save or display.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use handlebars::Handlebars;
use tabled::builder::Builder;
use tabled::settings::Style as TableStyle;
use tabled::{Table, Tabled};
use tracing::{debug, info};

use crate::core::config::ReportsConfig;
use crate::core::errors::{ReportError, Result};
use crate::core::records::RecordSet;
use crate::reports::{
    ChartKind, OutputShape, PlotData, ReportBody, ReportConfig, ReportData, Summary,
};

use super::plots::render_svg;
use super::tables::{format_cell, render_table};
use super::templates::{build_registry, detect_templates_dir, load_templates_from_dir};

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;

/// A rendered report, ready to be written or displayed.
#[derive(Debug, Clone)]
pub struct Report {
    /// Job that produced the report
    pub config: ReportConfig,
    /// Aggregated data and summary statistics
    pub data: ReportData,
    /// Rendered artifact (table text or SVG document)
    pub rendered: String,
    /// Deterministic location of the saved artifact
    pub output_path: PathBuf,
}

impl Report {
    /// Summary statistics computed from the records.
    pub fn summary(&self) -> &Summary {
        &self.data.summary
    }
}

/// What a generation run did with its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Written to disk at the given path
    Saved(PathBuf),
    /// Written to the display stream only
    Displayed,
}

/// Turns report jobs into rendered reports.
#[derive(Debug)]
pub struct ReportGenerator {
    handlebars: Handlebars<'static>,
    settings: ReportsConfig,
}

impl ReportGenerator {
    /// Build a generator for the given settings.
    ///
    /// Templates come from `paths.templates_dir` when set, otherwise from
    /// `KELPIE_TEMPLATE_ROOT` or a `templates/` directory in the working
    /// directory, on top of the built-in ones.
    pub fn new(settings: ReportsConfig) -> Result<Self> {
        settings.validate()?;

        let mut handlebars = build_registry()?;
        let templates_dir = settings
            .paths
            .templates_dir
            .clone()
            .or_else(detect_templates_dir);
        if let Some(dir) = templates_dir {
            load_templates_from_dir(&mut handlebars, &dir)?;
            debug!("Loaded report templates from {}", dir.display());
        }

        Ok(Self {
            handlebars,
            settings,
        })
    }

    /// Settings this generator renders with.
    pub fn settings(&self) -> &ReportsConfig {
        &self.settings
    }

    /// Locate the result file of a job: CSV first, then JSON.
    pub fn resolve_input(&self, config: &ReportConfig) -> Result<PathBuf> {
        let candidates = config.input_candidates(&self.settings.paths.results_dir);
        for candidate in &candidates {
            debug!("Looking for results at {}", candidate.display());
            if candidate.is_file() {
                return Ok(candidate.clone());
            }
        }

        let model = config
            .model
            .filter(|_| config.kind.requires_model())
            .map(|m| format!("/{m}"))
            .unwrap_or_default();
        Err(ReportError::data_not_found(
            format!(
                "no result file for {} ({}{model}); tried {}",
                config.kind,
                config.mode,
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            candidates,
        ))
    }

    /// Deterministic path the report of a job is saved to.
    pub fn output_path(&self, config: &ReportConfig) -> PathBuf {
        let extension = match config.kind.shape() {
            OutputShape::Table => self.settings.tables.format.extension(),
            OutputShape::Plot => "svg",
        };
        self.settings
            .paths
            .output_dir
            .join(config.kind.slug())
            .join(format!("{}.{extension}", config.output_stem()))
    }

    /// Load, aggregate and render a job without touching the output directory.
    pub fn build(&self, config: &ReportConfig) -> Result<Report> {
        let input = self.resolve_input(config)?;
        let records = RecordSet::load(&input)?;
        let data = config.kind.aggregate(&records, config)?;
        let rendered = self.render(&data)?;

        Ok(Report {
            config: *config,
            data,
            rendered,
            output_path: self.output_path(config),
        })
    }

    /// Render aggregated data into its artifact text.
    pub fn render(&self, data: &ReportData) -> Result<String> {
        match &data.body {
            ReportBody::Table(table) => render_table(
                &self.handlebars,
                table,
                self.settings.tables.format,
                self.settings.tables.precision,
            ),
            ReportBody::Plot(plot) => render_svg(plot, &self.settings.plots),
        }
    }

    /// Run a job end to end: save the report when `save` is set, otherwise
    /// display it on `display`.
    ///
    /// Rendering finishes before anything is written, so a failing job
    /// leaves the output directory untouched.
    pub fn generate(&self, config: &ReportConfig, display: &mut dyn Write) -> Result<ReportOutcome> {
        let report = self.build(config)?;

        if config.save {
            let path = save_report(&report)?;
            info!("Saved {} to {}", config.label(), path.display());
            Ok(ReportOutcome::Saved(path))
        } else {
            display_report(&report, self.settings.tables.precision, display)?;
            debug!("Displayed {}", config.label());
            Ok(ReportOutcome::Displayed)
        }
    }
}

fn save_report(report: &Report) -> Result<PathBuf> {
    let path = &report.output_path;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ReportError::io(
                format!("Failed to create report directory {}", parent.display()),
                e,
            )
        })?;
    }
    fs::write(path, &report.rendered).map_err(|e| {
        ReportError::io(format!("Failed to write report {}", path.display()), e)
    })?;
    Ok(path.clone())
}

/// Row used when printing summary statistics.
#[derive(Tabled)]
struct SummaryRow {
    statistic: String,
    value: String,
}

/// Write a report to the display stream.
///
/// Tables print as rendered; plots print their series as a table since
/// the SVG itself is only useful once saved.
pub fn display_report(report: &Report, precision: usize, out: &mut dyn Write) -> Result<()> {
    match &report.data.body {
        ReportBody::Table(_) => writeln!(out, "{}", report.rendered)?,
        ReportBody::Plot(plot) => {
            writeln!(out, "{}", plot.title)?;
            writeln!(out)?;
            writeln!(out, "{}", series_table(plot, precision))?;
        }
    }

    if !report.data.summary.is_empty() {
        let rows = report
            .data
            .summary
            .iter()
            .map(|(statistic, value)| SummaryRow {
                statistic: statistic.clone(),
                value: format_cell(Some(*value), precision),
            })
            .collect::<Vec<_>>();
        let mut table = Table::new(rows);
        table.with(TableStyle::rounded());
        writeln!(out)?;
        writeln!(out, "{table}")?;
    }
    Ok(())
}

fn series_table(plot: &PlotData, precision: usize) -> Table {
    let columns: Vec<f64> = match plot.chart {
        ChartKind::GroupedBars => (0..plot.categories.len()).map(|i| i as f64).collect(),
        ChartKind::Lines => {
            let mut xs: Vec<f64> = plot
                .series
                .iter()
                .flat_map(|s| s.points.iter().map(|(x, _)| *x))
                .collect();
            xs.sort_by(f64::total_cmp);
            xs.dedup();
            xs
        }
    };

    let mut builder = Builder::default();
    let mut header = vec![plot.x_label.clone()];
    header.extend(columns.iter().map(|x| match plot.chart {
        ChartKind::GroupedBars => plot.categories[*x as usize].clone(),
        ChartKind::Lines => x.to_string(),
    }));
    builder.push_record(header);

    for series in &plot.series {
        let mut row = vec![series.label.clone()];
        row.extend(columns.iter().map(|x| {
            let value = series
                .points
                .iter()
                .find(|(px, _)| px == x)
                .map(|(_, y)| *y);
            format_cell(value, precision)
        }));
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(TableStyle::rounded());
    table
}

