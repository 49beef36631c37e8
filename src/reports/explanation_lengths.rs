//! Explanation length distribution for one model.

use tracing::debug;

use crate::core::errors::{ReportError, Result};
use crate::core::records::RecordSet;
use crate::core::statistics::{group_values, mean, SampleStats};

use super::{caption, selected_records, ChartKind, PlotData, ReportBody, ReportConfig, ReportData, Series, Summary};

/// Fields every explanation-length record must carry.
pub const REQUIRED_FIELDS: &[&str] = &["dataset", "length"];

/// Longest explanation the histogram accepts, in facts.
pub const MAX_EXPLANATION_LENGTH: f64 = 1024.0;

/// Count explanation lengths per dataset and summarize the length sample.
pub fn aggregate(records: &RecordSet, config: &ReportConfig) -> Result<ReportData> {
    let mut pairs = Vec::new();
    for record in selected_records(records, config)? {
        let dataset = records.text(record, "dataset")?;
        let length = records.number(record, "length")?;
        if length < 1.0 || length.fract() != 0.0 {
            return Err(ReportError::schema_field(
                records.path(),
                record.index(),
                "length",
                format!(
                    "record {} has length {length}; lengths are positive integers",
                    record.index()
                ),
            ));
        }
        if length > MAX_EXPLANATION_LENGTH {
            return Err(ReportError::schema_field(
                records.path(),
                record.index(),
                "length",
                format!(
                    "record {} has length {length}; at most {MAX_EXPLANATION_LENGTH} facts are supported",
                    record.index()
                ),
            ));
        }
        pairs.push((dataset, length));
    }

    let all_lengths: Vec<f64> = pairs.iter().map(|(_, length)| *length).collect();
    let stats = SampleStats::from_values(&all_lengths)
        .ok_or_else(|| ReportError::schema(records.path(), "no explanation lengths"))?;

    // lengths are validated integers in 1..=MAX_EXPLANATION_LENGTH
    let longest = stats.max as usize;
    let categories: Vec<String> = (1..=longest).map(|len| len.to_string()).collect();

    let by_dataset = group_values(pairs);
    let series = by_dataset
        .iter()
        .map(|(dataset, lengths)| {
            let mut counts = vec![0usize; longest];
            for length in lengths {
                counts[*length as usize - 1] += 1;
            }
            Series {
                label: dataset.clone(),
                points: counts
                    .into_iter()
                    .enumerate()
                    .map(|(i, count)| (i as f64, count as f64))
                    .collect(),
            }
        })
        .collect();

    let mut summary = Summary::new();
    summary.insert("count".to_string(), stats.count as f64);
    summary.insert("mean_length".to_string(), stats.mean);
    summary.insert("median_length".to_string(), stats.median);
    summary.insert("std_dev_length".to_string(), stats.std_dev);
    summary.insert("max_length".to_string(), stats.max);
    for (dataset, lengths) in &by_dataset {
        summary.insert(format!("mean_length.{dataset}"), mean(lengths));
    }

    debug!(
        "Explanation lengths: {} samples over {} datasets",
        stats.count,
        by_dataset.len()
    );

    Ok(ReportData {
        body: ReportBody::Plot(PlotData {
            title: caption(config, "Explanation length distribution"),
            chart: ChartKind::GroupedBars,
            x_label: "Explanation length (facts)".to_string(),
            y_label: "Explanations".to_string(),
            categories,
            series,
        }),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Mode, Model};
    use crate::core::records::ResultRecord;
    use crate::reports::ReportKind;
    use approx::assert_relative_eq;
    use serde_json::Value;

    fn lengths(values: &[(&str, &str)]) -> RecordSet {
        let records = values
            .iter()
            .enumerate()
            .map(|(i, (dataset, length))| {
                ResultRecord::new(
                    i,
                    [
                        ("dataset".to_string(), Value::String(dataset.to_string())),
                        ("length".to_string(), Value::String(length.to_string())),
                    ]
                    .into_iter()
                    .collect(),
                )
            })
            .collect();
        RecordSet::new("explanation-lengths/necessary/ComplEx.csv", records)
    }

    fn config() -> ReportConfig {
        ReportConfig::new(
            ReportKind::ExplanationLengths,
            Some(Mode::Necessary),
            Some(Model::ComplEx),
            false,
        )
        .unwrap()
    }

    #[test]
    fn ten_sample_mean_is_two_point_one() {
        let sample: Vec<(&str, &str)> = ["1", "2", "2", "3", "1", "4", "2", "3", "1", "2"]
            .into_iter()
            .map(|len| ("FB15k", len))
            .collect();
        let data = aggregate(&lengths(&sample), &config()).unwrap();

        assert_relative_eq!(data.summary["mean_length"], 2.1);
        assert_relative_eq!(data.summary["count"], 10.0);
        assert_relative_eq!(data.summary["max_length"], 4.0);
    }

    #[test]
    fn histogram_counts_lengths_per_dataset() {
        let data = aggregate(
            &lengths(&[("FB15k", "1"), ("WN18", "3"), ("FB15k", "1"), ("FB15k", "2")]),
            &config(),
        )
        .unwrap();

        let ReportBody::Plot(plot) = data.body else {
            panic!("expected a plot");
        };
        assert_eq!(plot.categories, vec!["1", "2", "3"]);
        assert_eq!(plot.series[0].label, "FB15k");
        assert_eq!(plot.series[0].points, vec![(0.0, 2.0), (1.0, 1.0), (2.0, 0.0)]);
        assert_eq!(plot.series[1].points[2], (2.0, 1.0));
        assert_relative_eq!(data.summary["mean_length.WN18"], 3.0);
    }

    fn assert_length_rejected(length: &str) {
        let err = aggregate(&lengths(&[("FB15k", "2"), ("FB15k", length)]), &config()).unwrap_err();
        match err {
            ReportError::Schema { row, field, .. } => {
                assert_eq!(row, Some(1), "length {length}");
                assert_eq!(field.as_deref(), Some("length"), "length {length}");
            }
            other => panic!("Expected Schema for length {length}, got {other:?}"),
        }
    }

    #[test]
    fn fractional_length_is_schema_error() {
        assert_length_rejected("1.5");
    }

    #[test]
    fn zero_and_negative_lengths_are_schema_errors() {
        assert_length_rejected("0");
        assert_length_rejected("-3");
    }

    #[test]
    fn huge_lengths_are_schema_errors() {
        assert_length_rejected("1e10");
        assert_length_rejected("1e19");
        assert_length_rejected("1025");
    }

    #[test]
    fn longest_supported_length_builds_histogram() {
        let data = aggregate(&lengths(&[("FB15k", "1024")]), &config()).unwrap();
        let ReportBody::Plot(plot) = data.body else {
            panic!("expected a plot");
        };
        assert_eq!(plot.categories.len(), 1024);
        assert_eq!(plot.series[0].points[1023], (1023.0, 1.0));
    }
}
