use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// A metric cell: either a number or explicitly unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Metric {
    Value(f64),
    Unavailable,
}

impl Metric {
    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(v),
            Metric::Unavailable => None,
        }
    }
}

/// One dataset row. `rank` is filled in by [`crate::ranking::rank`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub postcode: String,
    pub region: String,
    pub metric: Metric,
    pub rank: Option<u32>,
    /// Display-only columns in header order.
    pub extra_fields: Vec<(String, String)>,
}

impl MetricRecord {
    pub fn field(&self, column: &str) -> Option<&str> {
        self.extra_fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// Which CSV columns carry the key, the label and the ranking metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetColumns {
    pub key: String,
    pub label: String,
    pub metric: String,
    pub unavailable_sentinel: String,
}

impl Default for DatasetColumns {
    fn default() -> Self {
        Self {
            key: "Postcode".to_string(),
            label: "Region".to_string(),
            metric: "Order per Capita - 2020".to_string(),
            unavailable_sentinel: "n/a".to_string(),
        }
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
}

fn parse_metric(raw: &str, sentinel: &str, row: usize) -> Result<Metric, LoadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == sentinel {
        return Ok(Metric::Unavailable);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Metric::Value(v)),
        _ => Err(LoadError::InvalidMetric {
            row,
            value: trimmed.to_string(),
        }),
    }
}

/// Parse the tabular source. Rows keep input order; `rank` is left empty.
/// A repeated key keeps its first row, whether or not that row has a metric.
pub fn parse_csv(text: &str, columns: &DatasetColumns) -> Result<Vec<MetricRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let key_idx = column_index(&headers, &columns.key)?;
    let label_idx = column_index(&headers, &columns.label)?;
    let metric_idx = column_index(&headers, &columns.metric)?;

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        // Header is line 1.
        let line = i + 2;
        let postcode = row.get(key_idx).unwrap_or_default().trim().to_string();
        if postcode.is_empty() {
            tracing::debug!(line, "skipping dataset row without a key");
            continue;
        }
        if !seen.insert(postcode.clone()) {
            tracing::warn!(line, key = %postcode, "duplicate dataset key ignored");
            continue;
        }
        let metric = parse_metric(
            row.get(metric_idx).unwrap_or_default(),
            &columns.unavailable_sentinel,
            line,
        )?;
        let extra_fields = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| ![key_idx, label_idx, metric_idx].contains(idx))
            .map(|(idx, name)| {
                (
                    name.to_string(),
                    row.get(idx).unwrap_or_default().trim().to_string(),
                )
            })
            .collect();

        records.push(MetricRecord {
            postcode,
            region: row.get(label_idx).unwrap_or_default().trim().to_string(),
            metric,
            rank: None,
            extra_fields,
        });
    }

    if records.is_empty() {
        return Err(LoadError::Empty("dataset"));
    }
    tracing::debug!(rows = records.len(), "parsed dataset");
    Ok(records)
}
