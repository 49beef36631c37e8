//! Descriptive statistics over experiment metrics.

use indexmap::IndexMap;
use statrs::statistics::{Data, Median, Statistics};

/// Decimal places kept in computed summaries.
pub const SUMMARY_DECIMALS: i32 = 6;

/// Round to [`SUMMARY_DECIMALS`] places so float noise never reaches output.
pub fn round_summary(value: f64) -> f64 {
    let factor = 10f64.powi(SUMMARY_DECIMALS);
    let rounded = (value * factor).round() / factor;
    // normalise -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Descriptive statistics of one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    /// Number of observations
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Median
    pub median: f64,
    /// Sample standard deviation (0 for a single observation)
    pub std_dev: f64,
    /// Smallest observation
    pub min: f64,
    /// Largest observation
    pub max: f64,
}

impl SampleStats {
    /// Summarize a sample. Returns `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let std_dev = if values.len() > 1 {
            values.std_dev()
        } else {
            0.0
        };

        Some(Self {
            count: values.len(),
            mean: round_summary(values.mean()),
            median: round_summary(Data::new(values.to_vec()).median()),
            std_dev: round_summary(std_dev),
            min: Statistics::min(values),
            max: Statistics::max(values),
        })
    }
}

/// Group values by key, keeping keys in first-seen order.
pub fn group_values<K, I>(pairs: I) -> IndexMap<K, Vec<f64>>
where
    K: std::hash::Hash + Eq,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut groups: IndexMap<K, Vec<f64>> = IndexMap::new();
    for (key, value) in pairs {
        groups.entry(key).or_default().push(value);
    }
    groups
}

/// Mean of a non-empty slice, rounded for output.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round_summary(values.mean())
}
