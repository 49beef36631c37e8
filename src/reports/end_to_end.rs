//! End-to-end effectiveness table.
//!
//! One row per (model, dataset), one ΔH@1/ΔMRR column pair per method.
//! Repeated measurements of the same cell are averaged.

use indexmap::IndexMap;
use tracing::debug;

use crate::core::errors::Result;
use crate::core::records::RecordSet;
use crate::core::statistics::mean;

use super::{caption, selected_records, ReportBody, ReportConfig, ReportData, Summary, TableData, TableRow};

/// Fields every end-to-end record must carry.
pub const REQUIRED_FIELDS: &[&str] = &["model", "dataset", "method", "delta_h1", "delta_mrr"];

#[derive(Default)]
struct Cell {
    delta_h1: Vec<f64>,
    delta_mrr: Vec<f64>,
}

/// Pivot end-to-end records into the paper table.
pub fn aggregate(records: &RecordSet, config: &ReportConfig) -> Result<ReportData> {
    let mut methods: IndexMap<String, Cell> = IndexMap::new();
    let mut cells: IndexMap<(String, String), IndexMap<String, Cell>> = IndexMap::new();

    for record in selected_records(records, config)? {
        let model = records.text(record, "model")?;
        let dataset = records.text(record, "dataset")?;
        let method = records.text(record, "method")?;
        let delta_h1 = records.number(record, "delta_h1")?;
        let delta_mrr = records.number(record, "delta_mrr")?;

        let totals = methods.entry(method.clone()).or_default();
        totals.delta_h1.push(delta_h1);
        totals.delta_mrr.push(delta_mrr);

        let cell = cells
            .entry((model, dataset))
            .or_default()
            .entry(method)
            .or_default();
        cell.delta_h1.push(delta_h1);
        cell.delta_mrr.push(delta_mrr);
    }

    let mut headers = vec!["Model".to_string(), "Dataset".to_string()];
    for method in methods.keys() {
        headers.push(format!("{method} ΔH@1"));
        headers.push(format!("{method} ΔMRR"));
    }

    let rows = cells
        .iter()
        .map(|((model, dataset), by_method)| TableRow {
            labels: vec![model.clone(), dataset.clone()],
            values: methods
                .keys()
                .flat_map(|method| match by_method.get(method) {
                    Some(cell) => [Some(mean(&cell.delta_h1)), Some(mean(&cell.delta_mrr))],
                    None => [None, None],
                })
                .collect(),
        })
        .collect::<Vec<_>>();

    let mut summary = Summary::new();
    for (method, totals) in &methods {
        summary.insert(format!("{method}.delta_h1"), mean(&totals.delta_h1));
        summary.insert(format!("{method}.delta_mrr"), mean(&totals.delta_mrr));
    }

    debug!(
        "End-to-end table: {} rows x {} methods",
        rows.len(),
        methods.len()
    );

    Ok(ReportData {
        body: ReportBody::Table(TableData {
            title: caption(config, "End-to-end explanation effectiveness"),
            headers,
            rows,
        }),
        summary,
    })
}
