use crate::data::series::{Column, MeasurementSeries};
use crate::error::{CorrelationError, SeriesError};

/// Pearson correlation coefficient of two aligned samples, clamped to [-1, 1].
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, CorrelationError> {
    if x.len() != y.len() {
        return Err(CorrelationError::LengthMismatch { x: x.len(), y: y.len() });
    }
    let n = x.len();
    if n < 2 {
        return Err(CorrelationError::InsufficientData(n));
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return Err(CorrelationError::ZeroVariance);
    }
    Ok((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Spearman rank correlation: Pearson over average ranks (ties share the
/// mean of their positions).
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64, CorrelationError> {
    if x.len() != y.len() {
        return Err(CorrelationError::LengthMismatch { x: x.len(), y: y.len() });
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end are 0-based, ranks are 1-based
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Align several series on the timestamps they all share. Columns are
/// concatenated in input order and must have distinct names.
pub fn inner_join(series: &[MeasurementSeries]) -> Result<MeasurementSeries, SeriesError> {
    let Some((first, rest)) = series.split_first() else {
        return Ok(MeasurementSeries::default());
    };

    // Inputs are sorted, so membership is a binary search.
    let common: Vec<_> = first
        .timestamps()
        .iter()
        .copied()
        .filter(|ts| rest.iter().all(|s| s.timestamps().binary_search(ts).is_ok()))
        .collect();

    // Gather each input's columns at the shared timestamps.
    let mut columns = Vec::new();
    for s in series {
        let rows: Vec<usize> = common
            .iter()
            .filter_map(|ts| s.timestamps().binary_search(ts).ok())
            .collect();
        for col in s.columns() {
            columns.push(Column::new(
                col.name.clone(),
                rows.iter().map(|&i| col.values[i]).collect(),
            ));
        }
    }
    MeasurementSeries::new(common, columns)
}

/// Complete-case filter: keep only rows where every column is finite.
pub fn drop_incomplete(series: &MeasurementSeries) -> MeasurementSeries {
    series.retain_rows(|row| series.columns().iter().all(|c| c.values[row].is_finite()))
}

/// Pairwise Pearson coefficients of every column. Undefined cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

pub fn correlation_matrix(series: &MeasurementSeries) -> CorrelationMatrix {
    let columns = series.columns();
    let values = columns
        .iter()
        .map(|a| {
            columns
                .iter()
                .map(|b| pearson(&a.values, &b.values).ok())
                .collect()
        })
        .collect();
    CorrelationMatrix {
        labels: columns.iter().map(|c| c.name.clone()).collect(),
        values,
    }
}
