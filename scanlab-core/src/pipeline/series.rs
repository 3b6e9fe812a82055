//! IndicatorSeries: named, bar-aligned indicator output.

use serde::Serialize;
use std::collections::BTreeMap;

use super::PipelineError;

/// Container for all indicator series computed over one bar sequence.
///
/// Every stored series has exactly `bar_count` values; `insert` refuses anything else.
/// Names are kept sorted so iteration and digests are deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndicatorSeries {
    bar_count: usize,
    series: BTreeMap<String, Vec<f64>>,
}

impl IndicatorSeries {
    pub fn new(bar_count: usize) -> Self {
        Self {
            bar_count,
            series: BTreeMap::new(),
        }
    }

    /// Insert a named indicator series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), PipelineError> {
        let name = name.into();
        if values.len() != self.bar_count {
            return Err(PipelineError::LengthMismatch {
                name,
                expected: self.bar_count,
                actual: values.len(),
            });
        }
        self.series.insert(name, values);
        Ok(())
    }

    /// Get the indicator value at a specific bar index (NaN included).
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Get the full series for a named indicator.
    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    /// Defined value `offset` bars before the latest bar; None if missing or NaN.
    pub fn back(&self, name: &str, offset: usize) -> Option<f64> {
        let idx = self.bar_count.checked_sub(1 + offset)?;
        self.get(name, idx).filter(|v| !v.is_nan())
    }

    /// Defined value on the latest bar.
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.back(name, 0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Number of bars each series spans.
    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    /// Number of indicator series stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// blake3 digest over names and exact bit patterns. Two runs with equal
    /// digests produced bit-identical output.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.bar_count as u64).to_le_bytes());
        for (name, values) in &self.series {
            hasher.update(name.as_bytes());
            hasher.update(&[0]);
            for v in values {
                hasher.update(&v.to_bits().to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}
