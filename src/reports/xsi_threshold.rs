//! Sensitivity of necessary explanations to the xsi threshold.

use indexmap::IndexMap;

use crate::core::errors::Result;
use crate::core::records::RecordSet;
use crate::core::statistics::{group_values, mean};

use super::{caption, selected_records, ChartKind, PlotData, ReportBody, ReportConfig, ReportData, Series, Summary};

/// Fields every xsi-threshold record must carry.
pub const REQUIRED_FIELDS: &[&str] = &["model", "dataset", "threshold", "delta_h1", "seconds"];

/// One ΔH@1 line per model/dataset over the threshold sweep.
pub fn aggregate(records: &RecordSet, config: &ReportConfig) -> Result<ReportData> {
    let mut effect = Vec::new();
    let mut cost = Vec::new();

    for record in selected_records(records, config)? {
        let line = format!(
            "{} / {}",
            records.text(record, "model")?,
            records.text(record, "dataset")?
        );
        let threshold = normalize_zero(records.number(record, "threshold")?);
        let delta_h1 = records.number(record, "delta_h1")?;
        let seconds = records.number(record, "seconds")?;

        effect.push(((line, threshold.to_bits()), delta_h1));
        cost.push((threshold.to_bits(), seconds));
    }

    let mut lines: IndexMap<String, Vec<(f64, f64)>> = IndexMap::new();
    for ((line, threshold), values) in &group_values(effect) {
        lines
            .entry(line.clone())
            .or_default()
            .push((f64::from_bits(*threshold), mean(values)));
    }

    let mut summary = Summary::new();
    let series = lines
        .into_iter()
        .map(|(label, mut points)| {
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            if let Some(best) = strongest_effect(&points) {
                summary.insert(format!("best_threshold.{label}"), best);
            }
            Series { label, points }
        })
        .collect();

    let mut per_threshold: Vec<(u64, Vec<f64>)> = group_values(cost).into_iter().collect();
    per_threshold.sort_by(|a, b| f64::from_bits(a.0).total_cmp(&f64::from_bits(b.0)));
    for (threshold, seconds) in &per_threshold {
        summary.insert(
            format!("seconds@{}", f64::from_bits(*threshold)),
            mean(seconds),
        );
    }

    Ok(ReportData {
        body: ReportBody::Plot(PlotData {
            title: caption(config, "xsi threshold sensitivity"),
            chart: ChartKind::Lines,
            x_label: "xsi threshold".to_string(),
            y_label: "ΔH@1".to_string(),
            categories: Vec::new(),
            series,
        }),
        summary,
    })
}

/// Fold `-0.0` into `0.0` so both group as one threshold.
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Threshold with the largest |ΔH@1|; ties go to the lower threshold.
fn strongest_effect(points: &[(f64, f64)]) -> Option<f64> {
    points
        .iter()
        .fold(None, |best: Option<(f64, f64)>, &(threshold, effect)| match best {
            Some((_, best_effect)) if best_effect.abs() >= effect.abs() => best,
            _ => Some((threshold, effect)),
        })
        .map(|(threshold, _)| threshold)
}
