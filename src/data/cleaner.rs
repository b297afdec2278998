use std::path::Path;

use chrono::NaiveDateTime;

use crate::attribute::Attribute;
use crate::data::datetime::column_to_timestamps;
use crate::data::loader::{column_to_f64, RawTable};
use crate::data::series::{MeasurementSeries, RECORD};
use crate::error::LoadError;

/// Preferred names of the timestamp column, checked before sniffing.
const TIMESTAMP_COLUMNS: &[&str] = &["timestamp", "created_at", "date", "time", "datetime"];

/// Position of the exterior and interior (brood) readings in a packed
/// `honey*brood*exterior` record.
const PACKED_INTERIOR: usize = 1;
const PACKED_EXTERIOR: usize = 2;

/// Turn a raw table into a cleaned series for `attribute`: parsed timestamps,
/// numeric values, rows with missing values dropped, sorted, and one reading
/// per timestamp (the last one wins).
pub fn clean(table: &RawTable, attribute: Attribute, path: &Path) -> Result<MeasurementSeries, LoadError> {
    let timestamps = timestamp_column(table).ok_or_else(|| LoadError::NoTimestampColumn(path.to_path_buf()))?;
    let names = attribute.value_columns();
    let values = value_columns(table, attribute, path)?;

    // A row survives only with a timestamp and every value parsed.
    let mut rows: Vec<(NaiveDateTime, Vec<f64>)> = Vec::with_capacity(table.row_count);
    let mut dropped = 0usize;
    for (row_idx, ts) in timestamps.iter().enumerate() {
        let row: Option<Vec<f64>> = values.iter().map(|col| col[row_idx]).collect();
        match (ts, row) {
            (Some(ts), Some(row)) if accepts(attribute, &row) => rows.push((*ts, row)),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::debug!("Dropped {dropped} incomplete {attribute} rows from {:?}", path);
    }

    // Stable sort, so the last duplicate in file order wins.
    rows.sort_by_key(|(ts, _)| *ts);
    let mut deduped: Vec<(NaiveDateTime, Vec<f64>)> = Vec::with_capacity(rows.len());
    for (ts, row) in rows {
        match deduped.last_mut() {
            Some((last_ts, last_row)) if *last_ts == ts => *last_row = row,
            _ => deduped.push((ts, row)),
        }
    }

    Ok(MeasurementSeries::from_rows(names, deduped)?)
}

fn accepts(attribute: Attribute, row: &[f64]) -> bool {
    match attribute {
        Attribute::Co2 => row.iter().all(|v| *v >= 0.0),
        _ => true,
    }
}

fn timestamp_column(table: &RawTable) -> Option<Vec<Option<NaiveDateTime>>> {
    TIMESTAMP_COLUMNS
        .iter()
        .filter_map(|name| table.column(name))
        .chain(table.column_data.iter().map(Vec::as_slice))
        .find_map(column_to_timestamps)
}

fn value_columns(table: &RawTable, attribute: Attribute, path: &Path) -> Result<Vec<Vec<Option<f64>>>, LoadError> {
    let missing = |column: &str| LoadError::MissingColumn {
        column: column.to_string(),
        path: path.to_path_buf(),
    };

    match attribute {
        Attribute::Co2 | Attribute::Weight => {
            let record = table.column(RECORD).ok_or_else(|| missing(RECORD))?;
            Ok(vec![column_to_f64(record)])
        }
        Attribute::Temperature | Attribute::Humidity => {
            let names = attribute.value_columns();
            if let (Some(interior), Some(exterior)) = (table.column(names[0]), table.column(names[1])) {
                return Ok(vec![column_to_f64(interior), column_to_f64(exterior)]);
            }
            // Older exports pack both channels into the record column.
            let record = table.column(RECORD).ok_or_else(|| missing(names[0]))?;
            let (interior, exterior): (Vec<Option<f64>>, Vec<Option<f64>>) =
                record.iter().map(|cell| unpack(cell)).unzip();
            Ok(vec![interior, exterior])
        }
    }
}

/// Split a `honey*brood*exterior` record into (interior, exterior).
fn unpack(cell: &str) -> (Option<f64>, Option<f64>) {
    let parts: Vec<Option<f64>> = cell
        .split('*')
        .map(|p| p.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect();
    if parts.len() <= PACKED_EXTERIOR {
        return (None, None);
    }
    (parts[PACKED_INTERIOR], parts[PACKED_EXTERIOR])
}
