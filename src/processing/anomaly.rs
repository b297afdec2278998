use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::statistics::{mean, sample_std_dev};
use crate::data::datetime::serialize_timestamp;
use crate::data::series::MeasurementSeries;

/// |z| above which a reading is anomalous.
pub const Z_SCORE_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub column: String,
    pub value: f64,
}

/// A flagged row: the raw values of every evaluated column plus the
/// timestamp. Serializes flat, e.g. `{"record": 2000.0, "timestamp": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub timestamp: NaiveDateTime,
    pub readings: Vec<Reading>,
}

impl Anomaly {
    pub fn value(&self, column: &str) -> Option<f64> {
        self.readings
            .iter()
            .find(|r| r.column == column)
            .map(|r| r.value)
    }
}

impl Serialize for Anomaly {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Timestamp<'a>(&'a NaiveDateTime);
        impl Serialize for Timestamp<'_> {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                serialize_timestamp(self.0, s)
            }
        }

        let mut map = serializer.serialize_map(Some(self.readings.len() + 1))?;
        for reading in &self.readings {
            map.serialize_entry(&reading.column, &reading.value)?;
        }
        map.serialize_entry("timestamp", &Timestamp(&self.timestamp))?;
        map.end()
    }
}

/// Flag every row whose value in ANY of `columns` lies more than `threshold`
/// sample standard deviations from that column's mean over the window.
/// Columns with zero or undefined deviation, or absent from the window, are
/// not evaluated. Results are in time order, one per row.
pub fn detect_anomalies(window: &MeasurementSeries, columns: &[&str], threshold: f64) -> Vec<Anomaly> {
    // Columns missing from the window are neither tested nor reported.
    let present: Vec<(&str, &[f64])> = columns
        .iter()
        .filter_map(|name| window.column(name).map(|values| (*name, values)))
        .collect();

    // Flat columns have no z-score.
    let evaluated: Vec<(&[f64], f64, f64)> = present
        .iter()
        .filter_map(|(_, values)| {
            let std = sample_std_dev(values).filter(|s| *s > 0.0)?;
            Some((*values, mean(values)?, std))
        })
        .collect();
    if evaluated.is_empty() {
        return Vec::new();
    }

    // A row is flagged when any column is out of bounds.
    window
        .timestamps()
        .iter()
        .enumerate()
        .filter(|(row, _)| {
            evaluated
                .iter()
                .any(|(values, mean, std)| ((values[*row] - mean) / std).abs() > threshold)
        })
        // Report every present column, flagged or not.
        .map(|(row, ts)| Anomaly {
            timestamp: *ts,
            readings: present
                .iter()
                .map(|(name, values)| Reading {
                    column: name.to_string(),
                    value: values[row],
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::{HUMIDITY_EXTERIOR, HUMIDITY_INTERIOR, RECORD};
    use chrono::NaiveDate;

    fn ts(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::minutes(15 * i as i64)
    }

    fn scalar(values: &[f64]) -> MeasurementSeries {
        MeasurementSeries::single(
            RECORD,
            values.iter().enumerate().map(|(i, v)| (ts(i), *v)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn small_sample_outlier_is_not_flagged() {
        // z(100) = 72 / sqrt(1620) = 1.789 with the n-1 deviation
        let series = scalar(&[10.0, 10.0, 10.0, 10.0, 100.0]);
        assert!(detect_anomalies(&series, &[RECORD], Z_SCORE_THRESHOLD).is_empty());
        assert_eq!(detect_anomalies(&series, &[RECORD], 1.7).len(), 1);
    }

    #[test]
    fn constant_and_empty_windows_yield_nothing() {
        let series = scalar(&[400.0; 20]);
        assert!(detect_anomalies(&series, &[RECORD], Z_SCORE_THRESHOLD).is_empty());
        let empty = MeasurementSeries::default();
        assert!(detect_anomalies(&empty, &[RECORD], Z_SCORE_THRESHOLD).is_empty());
        assert!(detect_anomalies(&scalar(&[1.0]), &[RECORD], Z_SCORE_THRESHOLD).is_empty());
    }

    #[test]
    fn flags_outlier_once_with_its_timestamp() {
        let mut values: Vec<f64> = (0..40).map(|i| 400.0 + (i % 5) as f64 * 5.0 - 10.0).collect();
        values[17] = 2000.0;
        let series = scalar(&values);
        let found = detect_anomalies(&series, &[RECORD], Z_SCORE_THRESHOLD);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].timestamp, ts(17));
        assert_eq!(found[0].value(RECORD), Some(2000.0));

        // idempotent
        assert_eq!(found, detect_anomalies(&series, &[RECORD], Z_SCORE_THRESHOLD));
    }

    #[test]
    fn paired_columns_are_ored_and_degenerate_columns_skipped() {
        let n = 30;
        let interior: Vec<f64> = (0..n).map(|i| if i == 5 { 95.0 } else { 60.0 + (i % 3) as f64 }).collect();
        let exterior: Vec<f64> = (0..n).map(|i| if i == 20 { 10.0 } else { 70.0 + (i % 2) as f64 }).collect();
        let rows = (0..n).map(|i| (ts(i), vec![interior[i], exterior[i]])).collect();
        let series = MeasurementSeries::from_rows(&[HUMIDITY_INTERIOR, HUMIDITY_EXTERIOR], rows).unwrap();

        let found = detect_anomalies(&series, &[HUMIDITY_INTERIOR, HUMIDITY_EXTERIOR], Z_SCORE_THRESHOLD);
        let stamps: Vec<NaiveDateTime> = found.iter().map(|a| a.timestamp).collect();
        assert_eq!(stamps, vec![ts(5), ts(20)]);
        assert_eq!(found[1].value(HUMIDITY_INTERIOR), Some(interior[20]));
        assert_eq!(found[1].value(HUMIDITY_EXTERIOR), Some(10.0));

        let flat = MeasurementSeries::from_rows(
            &[HUMIDITY_INTERIOR, HUMIDITY_EXTERIOR],
            (0..n).map(|i| (ts(i), vec![interior[i], 50.0])).collect(),
        )
        .unwrap();
        let found = detect_anomalies(&flat, &[HUMIDITY_INTERIOR, HUMIDITY_EXTERIOR], Z_SCORE_THRESHOLD);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value(HUMIDITY_EXTERIOR), Some(50.0));
    }

    #[test]
    fn serializes_flat() {
        let anomaly = Anomaly {
            timestamp: ts(4),
            readings: vec![Reading {
                column: RECORD.to_string(),
                value: 2000.0,
            }],
        };
        let json = serde_json::to_string(&anomaly).unwrap();
        assert_eq!(json, r#"{"record":2000.0,"timestamp":"2025-03-01 01:00:00"}"#);
    }
}
