use serde::Serialize;

/// Round to two decimals, the precision of every reported figure.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean of the finite values, `None` when there are none.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Sample (n-1) standard deviation of the finite values, `None` below two
/// observations.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if vals.len() < 2 {
        return None;
    }
    let mean = vals.iter().sum::<f64>() / vals.len() as f64;
    let variance = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (vals.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Quantile `q` (0..=1) of ascending `sorted` values, interpolating
/// linearly between neighbours.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Five-number summary for a box plot. Whiskers reach the furthest reading
/// within 1.5 IQR of the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxSummary {
    pub fn compute(values: &[f64]) -> Option<Self> {
        let mut vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        vals.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&vals, 0.25)?;
        let median = quantile(&vals, 0.5)?;
        let q3 = quantile(&vals, 0.75)?;
        let fence = 1.5 * (q3 - q1);

        // Sorted, so the first and last readings inside the fences are the
        // whisker ends.
        let lower_whisker = vals.iter().copied().find(|v| *v >= q1 - fence).unwrap_or(q1);
        let upper_whisker = vals.iter().rev().copied().find(|v| *v <= q3 + fence).unwrap_or(q3);
        Some(Self {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
        })
    }
}

/// Descriptive statistics of one column over a window. Every field is `None`
/// for an empty window, and `std_dev` is also `None` with a single reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    #[serde(rename = "Mean")]
    pub mean: Option<f64>,
    #[serde(rename = "Median")]
    pub median: Option<f64>,
    #[serde(rename = "Standard Deviation")]
    pub std_dev: Option<f64>,
    #[serde(rename = "Min")]
    pub min: Option<f64>,
    #[serde(rename = "Max")]
    pub max: Option<f64>,
}

impl SummaryStats {
    /// Compute statistics from values, ignoring NaN. Results are rounded to
    /// two decimals.
    pub fn compute(values: &[f64]) -> Self {
        let mut vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return Self::default();
        }

        let count = vals.len();
        let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        vals.sort_by(|a, b| a.total_cmp(b));
        let median = if count % 2 == 0 {
            (vals[count / 2 - 1] + vals[count / 2]) / 2.0
        } else {
            vals[count / 2]
        };

        Self {
            mean: mean(&vals).map(round2),
            median: Some(round2(median)),
            std_dev: sample_std_dev(&vals).map(round2),
            min: Some(round2(min)),
            max: Some(round2(max)),
        }
    }

    /// `max - min` of the rounded extremes.
    pub fn range(&self) -> Option<f64> {
        Some(round2(self.max? - self.min?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_is_all_null() {
        let stats = SummaryStats::compute(&[]);
        assert_eq!(stats, SummaryStats::default());
        assert_eq!(stats.range(), None);
    }

    #[test]
    fn single_reading_has_no_std_dev() {
        let stats = SummaryStats::compute(&[412.346]);
        assert_eq!(stats.mean, Some(412.35));
        assert_eq!(stats.median, Some(412.35));
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.min, stats.max);
    }

    #[test]
    fn sample_standard_deviation() {
        let stats = SummaryStats::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.mean, Some(5.0));
        assert_eq!(stats.median, Some(4.5));
        // population std is 2.0, sample std is sqrt(32/7)
        assert_eq!(stats.std_dev, Some(2.14));
        assert_eq!(stats.range(), Some(7.0));
    }

    #[test]
    fn ordering_holds_and_nan_is_ignored() {
        let values = [35.2, f64::NAN, 33.9, 36.4, 34.1, 35.0];
        let stats = SummaryStats::compute(&values);
        let (min, max) = (stats.min.unwrap(), stats.max.unwrap());
        assert!(min <= stats.median.unwrap() && stats.median.unwrap() <= max);
        assert!(min <= stats.mean.unwrap() && stats.mean.unwrap() <= max);
        assert_eq!(stats.min, Some(33.9));
    }

    #[test]
    fn quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn box_whiskers_stop_at_the_fence() {
        let summary = BoxSummary::compute(&[5.0, 1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(summary.q1, 2.25);
        assert_eq!(summary.median, 3.5);
        assert_eq!(summary.q3, 4.75);
        assert_eq!(summary.lower_whisker, 1.0);
        // 100 lies beyond q3 + 1.5 * 2.5
        assert_eq!(summary.upper_whisker, 5.0);
        assert_eq!(BoxSummary::compute(&[f64::NAN]), None);
    }

    #[test]
    fn serializes_with_report_keys() {
        let json = serde_json::to_value(SummaryStats::compute(&[1.0])).unwrap();
        assert_eq!(json["Max"], 1.0);
        assert!(json["Standard Deviation"].is_null());
    }
}
