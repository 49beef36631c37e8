//! Explanation extraction time per model and dataset.

use indexmap::{IndexMap, IndexSet};

use crate::core::errors::{ReportError, Result};
use crate::core::records::RecordSet;
use crate::core::statistics::{group_values, mean};

use super::{caption, selected_records, ChartKind, PlotData, ReportBody, ReportConfig, ReportData, Series, Summary};

/// Fields every extraction-time record must carry.
pub const REQUIRED_FIELDS: &[&str] = &["model", "dataset", "seconds"];

/// Average extraction seconds per (dataset, model).
pub fn aggregate(records: &RecordSet, config: &ReportConfig) -> Result<ReportData> {
    let mut datasets = IndexSet::new();
    let mut samples = Vec::new();

    for record in selected_records(records, config)? {
        let model = records.text(record, "model")?;
        let dataset = records.text(record, "dataset")?;
        let seconds = records.number(record, "seconds")?;
        if seconds < 0.0 {
            return Err(ReportError::schema_field(
                records.path(),
                record.index(),
                "seconds",
                format!("record {} has a negative extraction time", record.index()),
            ));
        }
        datasets.insert(dataset.clone());
        samples.push(((model, dataset), seconds));
    }

    let all_seconds: Vec<f64> = samples.iter().map(|(_, s)| *s).collect();
    let per_model = group_values(samples.iter().map(|((model, _), s)| (model.clone(), *s)));
    let per_cell = group_values(samples);

    let mut by_model: IndexMap<&str, Vec<(f64, f64)>> = IndexMap::new();
    for ((model, dataset), seconds) in &per_cell {
        // every dataset was inserted above, so the index is present
        let x = datasets.get_index_of(dataset).unwrap_or_default() as f64;
        by_model
            .entry(model.as_str())
            .or_default()
            .push((x, mean(seconds)));
    }

    let series = by_model
        .into_iter()
        .map(|(model, mut points)| {
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            Series {
                label: model.to_string(),
                points,
            }
        })
        .collect();

    let mut summary = Summary::new();
    summary.insert("mean_seconds".to_string(), mean(&all_seconds));
    for (model, seconds) in &per_model {
        summary.insert(format!("mean_seconds.{model}"), mean(seconds));
    }

    Ok(ReportData {
        body: ReportBody::Plot(PlotData {
            title: caption(config, "Explanation extraction time"),
            chart: ChartKind::GroupedBars,
            x_label: "Dataset".to_string(),
            y_label: "Mean extraction time (s)".to_string(),
            categories: datasets.into_iter().collect(),
            series,
        }),
        summary,
    })
}
