use std::ops::Range;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::SeriesError;

/// Value column of CO2 and weight series.
pub const RECORD: &str = "record";
pub const HUMIDITY_INTERIOR: &str = "Interior (%)";
pub const HUMIDITY_EXTERIOR: &str = "Exterior (%)";
pub const TEMPERATURE_INTERIOR: &str = "Interior (\u{00B0}C)";
pub const TEMPERATURE_EXTERIOR: &str = "Exterior (\u{00B0}C)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Time-indexed numeric table for one physical quantity (or a join of
/// several). Timestamps are strictly increasing and every column has one
/// value per timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementSeries {
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl MeasurementSeries {
    pub fn new(timestamps: Vec<NaiveDateTime>, columns: Vec<Column>) -> Result<Self, SeriesError> {
        if let Some(pos) = timestamps.windows(2).position(|w| w[0] >= w[1]) {
            return Err(SeriesError::Unordered(pos + 1));
        }
        for (i, col) in columns.iter().enumerate() {
            if col.values.len() != timestamps.len() {
                return Err(SeriesError::LengthMismatch {
                    column: col.name.clone(),
                    expected: timestamps.len(),
                    actual: col.values.len(),
                });
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(SeriesError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Self { timestamps, columns })
    }

    /// Build a one-column series from `(timestamp, value)` pairs.
    pub fn single(
        name: impl Into<String>,
        points: Vec<(NaiveDateTime, f64)>,
    ) -> Result<Self, SeriesError> {
        let (timestamps, values): (Vec<_>, Vec<_>) = points.into_iter().unzip();
        Self::new(timestamps, vec![Column::new(name, values)])
    }

    /// Build a series from row-major data. Every row must carry one value per
    /// entry of `names`.
    pub fn from_rows(
        names: &[&str],
        rows: Vec<(NaiveDateTime, Vec<f64>)>,
    ) -> Result<Self, SeriesError> {
        let mut timestamps = Vec::with_capacity(rows.len());
        let mut columns: Vec<Column> = names
            .iter()
            .map(|n| Column::new(*n, Vec::with_capacity(rows.len())))
            .collect();
        for (ts, values) in rows {
            timestamps.push(ts);
            for (col_idx, col) in columns.iter_mut().enumerate() {
                col.values.push(values.get(col_idx).copied().unwrap_or(f64::NAN));
            }
        }
        Self::new(timestamps, columns)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// `(timestamp, value)` pairs of one column.
    pub fn points(&self, name: &str) -> Option<Vec<(NaiveDateTime, f64)>> {
        let values = self.column(name)?;
        Some(
            self.timestamps
                .iter()
                .copied()
                .zip(values.iter().copied())
                .collect(),
        )
    }

    /// Rows `range` of every column.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            timestamps: self.timestamps[range.clone()].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values[range.clone()].to_vec()))
                .collect(),
        }
    }

    /// Keep the rows for which `keep` returns true, given the row index.
    pub fn retain_rows(&self, mut keep: impl FnMut(usize) -> bool) -> Self {
        let rows: Vec<usize> = (0..self.len()).filter(|&i| keep(i)).collect();
        Self {
            timestamps: rows.iter().map(|&i| self.timestamps[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), rows.iter().map(|&i| c.values[i]).collect()))
                .collect(),
        }
    }

    pub fn rename_column(mut self, from: &str, to: &str) -> Self {
        if let Some(col) = self.columns.iter_mut().find(|c| c.name == from) {
            col.name = to.to_string();
        }
        self
    }

    /// Keep only the named columns, in the given order. Unknown names are
    /// skipped.
    pub fn select(&self, names: &[&str]) -> Self {
        Self {
            timestamps: self.timestamps.clone(),
            columns: names
                .iter()
                .filter_map(|n| self.columns.iter().find(|c| c.name == *n).cloned())
                .collect(),
        }
    }
}
