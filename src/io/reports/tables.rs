//! Table rendering: markdown, LaTeX and CSV.

use handlebars::Handlebars;
use serde_json::json;
use tabled::builder::Builder;
use tabled::settings::Style as TableStyle;

use crate::core::config::TableFormat;
use crate::core::errors::{ReportError, Result};
use crate::reports::TableData;

use super::templates::LATEX_TABLE_TEMPLATE_NAME;

/// Placeholder for cells without a measurement.
pub const MISSING_CELL: &str = "-";

/// Format a metric cell with a fixed number of decimals.
pub fn format_cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => MISSING_CELL.to_string(),
    }
}

fn text_rows(table: &TableData, precision: usize) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .map(|row| {
            row.labels
                .iter()
                .cloned()
                .chain(row.values.iter().map(|v| format_cell(*v, precision)))
                .collect()
        })
        .collect()
}

/// Render a table in the requested format.
pub fn render_table(
    handlebars: &Handlebars<'static>,
    table: &TableData,
    format: TableFormat,
    precision: usize,
) -> Result<String> {
    match format {
        TableFormat::Markdown => Ok(render_markdown(table, precision)),
        TableFormat::Latex => render_latex(handlebars, table, precision),
        TableFormat::Csv => render_csv(table, precision),
    }
}

/// Render as a markdown table preceded by its caption.
pub fn render_markdown(table: &TableData, precision: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.headers.clone());
    for row in text_rows(table, precision) {
        builder.push_record(row);
    }

    let mut rendered = builder.build();
    rendered.with(TableStyle::markdown());
    format!("**{}**\n\n{}\n", table.title, rendered)
}

/// Escape LaTeX special characters in cell text.
pub fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '~' => escaped.push_str(r"\textasciitilde{}"),
            '^' => escaped.push_str(r"\textasciicircum{}"),
            '\\' => escaped.push_str(r"\textbackslash{}"),
            'Δ' => escaped.push_str(r"$\Delta$"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn render_latex(
    handlebars: &Handlebars<'static>,
    table: &TableData,
    precision: usize,
) -> Result<String> {
    let label_columns = table.rows.first().map_or(2, |row| row.labels.len());
    let value_columns = table.headers.len().saturating_sub(label_columns);
    let column_spec = format!("{}{}", "l".repeat(label_columns), "r".repeat(value_columns));

    let rows: Vec<Vec<String>> = text_rows(table, precision)
        .into_iter()
        .map(|row| row.iter().map(|cell| escape_latex(cell)).collect())
        .collect();

    let data = json!({
        "caption": escape_latex(&table.title),
        "column_spec": column_spec,
        "headers": table.headers.iter().map(|h| escape_latex(h)).collect::<Vec<_>>(),
        "rows": rows,
    });

    handlebars
        .render(LATEX_TABLE_TEMPLATE_NAME, &data)
        .map_err(|e| ReportError::render("latex", e.to_string()))
}

fn render_csv(table: &TableData, precision: usize) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&table.headers)?;
    for row in text_rows(table, precision) {
        wtr.write_record(&row)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| ReportError::render("csv", format!("CSV writer error: {e}")))?;
    String::from_utf8(data)
        .map_err(|e| ReportError::render("csv", format!("UTF-8 conversion error: {e}")))
}
