//! Precomputed experiment records.
//!
//! Result files come in two shapes: CSV with a header row, or JSON holding
//! an array of objects (optionally wrapped as `{"records": [...]}`). Both are
//! read into [`ResultRecord`]s whose typed accessors report the offending
//! file, row and field when a value is missing or malformed.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::core::errors::{ReportError, Result};

/// Supported result file encodings, in lookup order.
pub const RESULT_EXTENSIONS: [&str; 2] = ["csv", "json"];

/// One row of precomputed experimental output.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    index: usize,
    fields: IndexMap<String, Value>,
}

impl ResultRecord {
    /// Build a record from its position in the file and its fields.
    pub fn new(index: usize, fields: IndexMap<String, Value>) -> Self {
        Self { index, fields }
    }

    /// Zero-based position of the record in its file.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw field value, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// All records of one result file.
#[derive(Debug, Clone)]
pub struct RecordSet {
    path: PathBuf,
    records: Vec<ResultRecord>,
}

impl RecordSet {
    /// Wrap already-parsed records.
    pub fn new(path: impl Into<PathBuf>, records: Vec<ResultRecord>) -> Self {
        Self {
            path: path.into(),
            records,
        }
    }

    /// Load a result file, choosing the parser from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::data_not_found(
                format!("cannot read result file {}: {e}", path.display()),
                vec![path.to_path_buf()],
            )
        })?;

        let records = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => parse_json(path, &content)?,
            _ => parse_csv(path, &content)?,
        };

        if records.is_empty() {
            return Err(ReportError::schema(path, "result file contains no records"));
        }

        info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self::new(path, records))
    }

    /// File the records were read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records in file order.
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fail unless every record carries every listed field.
    pub fn require_fields(&self, fields: &[&str]) -> Result<()> {
        for record in &self.records {
            for field in fields {
                self.text(record, field)?;
            }
        }
        debug!(
            "{} satisfies required fields {:?}",
            self.path.display(),
            fields
        );
        Ok(())
    }

    /// Textual value of a field. Empty values count as missing.
    pub fn text(&self, record: &ResultRecord, field: &str) -> Result<String> {
        let value = match record.get(field) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => {
                return Err(ReportError::schema_field(
                    &self.path,
                    record.index(),
                    field,
                    format!("field '{field}' must be a scalar, found {other}"),
                ))
            }
        };

        if value.is_empty() {
            return Err(ReportError::schema_field(
                &self.path,
                record.index(),
                field,
                format!("record {} is missing field '{field}'", record.index()),
            ));
        }
        Ok(value)
    }

    /// Numeric value of a field. Accepts JSON numbers and numeric strings.
    pub fn number(&self, record: &ResultRecord, field: &str) -> Result<f64> {
        let parsed = match record.get(field) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                return Err(ReportError::schema_field(
                    &self.path,
                    record.index(),
                    field,
                    format!("record {} is missing field '{field}'", record.index()),
                ))
            }
            Some(_) => None,
        };

        parsed.filter(|v| v.is_finite()).ok_or_else(|| {
            ReportError::schema_field(
                &self.path,
                record.index(),
                field,
                format!(
                    "record {} has a non-numeric value for field '{field}'",
                    record.index()
                ),
            )
        })
    }
}

fn parse_csv(path: &Path, content: &str) -> Result<Vec<ResultRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ReportError::schema(path, format!("unreadable CSV header: {e}")))?
        .clone();

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            ReportError::schema(path, format!("malformed CSV record {index}: {e}"))
        })?;

        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(ResultRecord::new(index, fields));
    }

    Ok(records)
}

fn parse_json(path: &Path, content: &str) -> Result<Vec<ResultRecord>> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| ReportError::schema(path, format!("malformed JSON: {e}")))?;

    let rows = match document {
        Value::Array(rows) => rows,
        Value::Object(mut object) => match object.remove("records") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(ReportError::schema(
                    path,
                    "JSON result file must be an array or hold a 'records' array",
                ))
            }
        },
        _ => {
            return Err(ReportError::schema(
                path,
                "JSON result file must be an array of records",
            ))
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(object) => Ok(ResultRecord::new(index, object.into_iter().collect())),
            other => Err(ReportError::schema(
                path,
                format!("record {index} is not an object: {other}"),
            )),
        })
        .collect()
}
