use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use super::statistics::{mean, round2, sample_std_dev};

/// Where the day ends and the night begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiurnalConvention {
    /// Daytime is 06:00 to 17:59.
    Hours6To18,
    /// Daytime is 07:00 to 18:59.
    Hours7To19,
}

impl DiurnalConvention {
    pub fn is_daytime(&self, ts: &NaiveDateTime) -> bool {
        let hour = ts.hour();
        match self {
            DiurnalConvention::Hours6To18 => (6..18).contains(&hour),
            DiurnalConvention::Hours7To19 => (7..19).contains(&hour),
        }
    }
}

/// Day/night aggregates of one column. Fields are `None` when their
/// partition is empty (and the deviations also below two readings).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DiurnalSplit {
    pub day_mean: Option<f64>,
    pub night_mean: Option<f64>,
    pub day_std_dev: Option<f64>,
    pub night_std_dev: Option<f64>,
}

/// Readings taken during the day and during the night, in that order.
pub fn split_values(
    timestamps: &[NaiveDateTime],
    values: &[f64],
    convention: DiurnalConvention,
) -> (Vec<f64>, Vec<f64>) {
    let mut day = Vec::new();
    let mut night = Vec::new();
    for (ts, value) in timestamps.iter().zip(values) {
        if convention.is_daytime(ts) {
            day.push(*value);
        } else {
            night.push(*value);
        }
    }
    (day, night)
}

/// Split `values` by the time of day of the matching timestamp.
pub fn partition(timestamps: &[NaiveDateTime], values: &[f64], convention: DiurnalConvention) -> DiurnalSplit {
    let (day, night) = split_values(timestamps, values, convention);
    DiurnalSplit {
        day_mean: mean(&day).map(round2),
        night_mean: mean(&night).map(round2),
        day_std_dev: sample_std_dev(&day).map(round2),
        night_std_dev: sample_std_dev(&night).map(round2),
    }
}

/// Mean value per clock hour (0..=23). Hours without readings are absent.
pub fn hourly_profile(timestamps: &[NaiveDateTime], values: &[f64]) -> Vec<(u32, f64)> {
    let mut sums = [(0.0f64, 0usize); 24];
    for (ts, value) in timestamps.iter().zip(values) {
        if value.is_finite() {
            let slot = &mut sums[ts.hour() as usize];
            slot.0 += value;
            slot.1 += 1;
        }
    }
    sums.iter()
        .enumerate()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(hour, (sum, count))| (hour as u32, sum / *count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn boundaries_differ_between_conventions() {
        let early = at(6, 30);
        let evening = at(18, 30);
        assert!(DiurnalConvention::Hours6To18.is_daytime(&early));
        assert!(!DiurnalConvention::Hours7To19.is_daytime(&early));
        assert!(!DiurnalConvention::Hours6To18.is_daytime(&evening));
        assert!(DiurnalConvention::Hours7To19.is_daytime(&evening));
        assert!(!DiurnalConvention::Hours7To19.is_daytime(&at(19, 0)));
        assert!(DiurnalConvention::Hours6To18.is_daytime(&at(17, 59)));
    }

    #[test]
    fn partition_means_and_variability() {
        let ts = vec![at(2, 0), at(3, 0), at(10, 0), at(12, 0), at(14, 0)];
        let values = vec![500.0, 520.0, 400.0, 410.0, 420.0];
        let split = partition(&ts, &values, DiurnalConvention::Hours7To19);
        assert_eq!(split.day_mean, Some(410.0));
        assert_eq!(split.night_mean, Some(510.0));
        assert_eq!(split.day_std_dev, Some(10.0));
        assert_eq!(split.night_std_dev, Some(14.14));
    }

    #[test]
    fn split_follows_the_convention() {
        let ts = vec![at(6, 30), at(12, 0), at(18, 30)];
        let values = vec![1.0, 2.0, 3.0];
        assert_eq!(
            split_values(&ts, &values, DiurnalConvention::Hours6To18),
            (vec![1.0, 2.0], vec![3.0])
        );
        assert_eq!(
            split_values(&ts, &values, DiurnalConvention::Hours7To19),
            (vec![2.0, 3.0], vec![1.0])
        );
    }

    #[test]
    fn empty_partition_is_null() {
        let split = partition(&[at(10, 0)], &[400.0], DiurnalConvention::Hours6To18);
        assert_eq!(split.day_mean, Some(400.0));
        assert_eq!(split.night_mean, None);
        assert_eq!(split.day_std_dev, None);
    }

    #[test]
    fn hourly_profile_is_sparse() {
        let ts = vec![at(1, 0), at(1, 30), at(23, 0)];
        let profile = hourly_profile(&ts, &[10.0, 20.0, 5.0]);
        assert_eq!(profile, vec![(1, 15.0), (23, 5.0)]);
    }
}
