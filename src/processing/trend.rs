use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};

use super::statistics::round2;
use crate::data::datetime::format_timestamp;

/// Period boundary (as text) to rounded mean. Keys sort chronologically.
pub type TrendMapping = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Hourly,
    Daily,
    /// Monday to Sunday, labelled with the Sunday.
    Weekly,
}

impl Granularity {
    /// Label of the period containing `ts`.
    pub fn bucket(&self, ts: &NaiveDateTime) -> NaiveDateTime {
        match self {
            Granularity::Hourly => ts.date().and_time(NaiveTime::MIN) + Duration::hours(i64::from(ts.hour())),
            Granularity::Daily => ts.date().and_time(NaiveTime::MIN),
            Granularity::Weekly => {
                let to_sunday = 6 - i64::from(ts.weekday().num_days_from_monday());
                (ts.date() + Duration::days(to_sunday)).and_time(NaiveTime::MIN)
            }
        }
    }
}

/// Aggregates of one non-empty period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub period: NaiveDateTime,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Bucket {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Group time-ordered values into periods. Periods without finite readings
/// are omitted. Output is in period order.
pub fn resample(timestamps: &[NaiveDateTime], values: &[f64], granularity: Granularity) -> Vec<Bucket> {
    let mut groups: BTreeMap<NaiveDateTime, (usize, f64, f64, f64)> = BTreeMap::new();
    for (ts, value) in timestamps.iter().zip(values) {
        if !value.is_finite() {
            continue;
        }
        let entry = groups
            .entry(granularity.bucket(ts))
            .or_insert((0, 0.0, f64::INFINITY, f64::NEG_INFINITY));
        entry.0 += 1;
        entry.1 += value;
        entry.2 = entry.2.min(*value);
        entry.3 = entry.3.max(*value);
    }

    groups
        .into_iter()
        .map(|(period, (count, sum, min, max))| Bucket {
            period,
            count,
            min,
            max,
            mean: sum / count as f64,
        })
        .collect()
}

/// Rounded mean per period, keyed by the period's timestamp text.
pub fn trend(timestamps: &[NaiveDateTime], values: &[f64], granularity: Granularity) -> TrendMapping {
    resample(timestamps, values, granularity)
        .into_iter()
        .map(|b| (format_timestamp(&b.period), round2(b.mean)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn weekly_bucket_ends_on_sunday() {
        // 2025-03-03 is a Monday, 2025-03-09 the following Sunday.
        let sunday = at(9, 0, 0);
        assert_eq!(Granularity::Weekly.bucket(&at(3, 0, 0)), sunday);
        assert_eq!(Granularity::Weekly.bucket(&at(9, 23, 59)), sunday);
        assert_eq!(Granularity::Weekly.bucket(&at(10, 0, 0)), at(16, 0, 0));
    }

    #[test]
    fn one_calendar_week_is_one_bucket() {
        let ts: Vec<NaiveDateTime> = (3..=9).map(|d| at(d, 12, 0)).collect();
        let values = vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 71.0];
        let weekly = trend(&ts, &values, Granularity::Weekly);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly.get("2025-03-09 00:00:00"), Some(&40.14));
    }

    #[test]
    fn empty_periods_are_omitted() {
        let ts = vec![at(1, 10, 0), at(1, 10, 30), at(3, 8, 0)];
        let daily = trend(&ts, &[1.0, 2.0, 5.0], Granularity::Daily);
        let keys: Vec<&str> = daily.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2025-03-01 00:00:00", "2025-03-03 00:00:00"]);
        assert_eq!(daily["2025-03-01 00:00:00"], 1.5);
    }

    #[test]
    fn hourly_buckets_carry_extremes() {
        let ts = vec![at(1, 10, 5), at(1, 10, 50), at(1, 11, 0)];
        let buckets = resample(&ts, &[30.0, 31.5, 29.0], Granularity::Hourly);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].period, at(1, 10, 0));
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[0].range(), 1.5);
        assert_eq!(buckets[1].mean, 29.0);
    }
}
