//! Prefilter comparison: effectiveness and cost of each candidate prefilter.

use indexmap::{IndexMap, IndexSet};

use crate::core::errors::Result;
use crate::core::records::RecordSet;
use crate::core::statistics::{group_values, mean};

use super::{caption, selected_records, ChartKind, PlotData, ReportBody, ReportConfig, ReportData, Series, Summary};

/// Fields every prefilter-comparison record must carry.
pub const REQUIRED_FIELDS: &[&str] = &["model", "dataset", "prefilter", "delta_h1", "seconds"];

/// Mean ΔH@1 per (model/dataset, prefilter), plus per-prefilter cost.
pub fn aggregate(records: &RecordSet, config: &ReportConfig) -> Result<ReportData> {
    let mut groups = IndexSet::new();
    let mut effect = Vec::new();
    let mut cost = Vec::new();

    for record in selected_records(records, config)? {
        let group = format!(
            "{} / {}",
            records.text(record, "model")?,
            records.text(record, "dataset")?
        );
        let prefilter = records.text(record, "prefilter")?;
        let delta_h1 = records.number(record, "delta_h1")?;
        let seconds = records.number(record, "seconds")?;

        groups.insert(group.clone());
        effect.push(((prefilter.clone(), group), delta_h1));
        cost.push((prefilter, seconds));
    }

    let per_cell = group_values(effect);
    let per_prefilter_effect =
        group_values(per_cell.iter().flat_map(|((prefilter, _), values)| {
            values.iter().map(move |v| (prefilter.clone(), *v))
        }));
    let per_prefilter_cost = group_values(cost);

    let mut by_prefilter: IndexMap<String, Vec<(f64, f64)>> = IndexMap::new();
    for ((prefilter, group), values) in &per_cell {
        let x = groups.get_index_of(group).unwrap_or_default() as f64;
        by_prefilter
            .entry(prefilter.clone())
            .or_default()
            .push((x, mean(values)));
    }

    let series = by_prefilter
        .into_iter()
        .map(|(label, mut points)| {
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            Series { label, points }
        })
        .collect();

    let mut summary = Summary::new();
    for (prefilter, values) in &per_prefilter_effect {
        summary.insert(format!("delta_h1.{prefilter}"), mean(values));
    }
    for (prefilter, seconds) in &per_prefilter_cost {
        summary.insert(format!("seconds.{prefilter}"), mean(seconds));
    }

    Ok(ReportData {
        body: ReportBody::Plot(PlotData {
            title: caption(config, "Prefilter comparison"),
            chart: ChartKind::GroupedBars,
            x_label: "Model / dataset".to_string(),
            y_label: "ΔH@1".to_string(),
            categories: groups.into_iter().collect(),
            series,
        }),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Mode;
    use crate::core::records::ResultRecord;
    use crate::reports::ReportKind;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn rows() -> RecordSet {
        let data = [
            ("ComplEx", "FB15k", "topology", -0.5, 100.0),
            ("ComplEx", "FB15k", "type", -0.4, 60.0),
            ("ComplEx", "FB15k", "none", -0.55, 400.0),
            ("TransE", "FB15k", "topology", -0.3, 80.0),
        ];
        let records = data
            .iter()
            .enumerate()
            .map(|(i, (model, dataset, prefilter, h1, seconds))| {
                let value = json!({
                    "model": model, "dataset": dataset, "prefilter": prefilter,
                    "delta_h1": h1, "seconds": seconds,
                });
                ResultRecord::new(i, value.as_object().unwrap().clone().into_iter().collect())
            })
            .collect();
        RecordSet::new("prefilter-comparison/necessary.json", records)
    }

    #[test]
    fn groups_bars_by_model_and_dataset() {
        let config =
            ReportConfig::new(ReportKind::PrefilterComparison, Some(Mode::Necessary), None, false)
                .unwrap();
        let data = aggregate(&rows(), &config).unwrap();

        let ReportBody::Plot(plot) = data.body else {
            panic!("expected a plot");
        };
        assert_eq!(plot.categories, vec!["ComplEx / FB15k", "TransE / FB15k"]);
        let labels: Vec<_> = plot.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["topology", "type", "none"]);
        assert_eq!(plot.series[0].points, vec![(0.0, -0.5), (1.0, -0.3)]);

        assert_relative_eq!(data.summary["delta_h1.topology"], -0.4);
        assert_relative_eq!(data.summary["seconds.topology"], 90.0);
        assert_relative_eq!(data.summary["seconds.none"], 400.0);
    }
}
