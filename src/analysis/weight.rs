use chrono::NaiveDate;
use serde::Serialize;

use super::{ErrorResult, PlotContext, SectionOutcome, SectionResult};
use crate::data::series::{MeasurementSeries, RECORD};
use crate::plotting::{Line, TimeChart, GREEN};
use crate::processing::anomaly::{detect_anomalies, Anomaly, Z_SCORE_THRESHOLD};
use crate::processing::diurnal::{partition, DiurnalConvention};
use crate::processing::statistics::{round2, SummaryStats};
use crate::processing::trend::{resample, Granularity};
use crate::processing::window::MonthWindow;

pub const TREND_PLOT: &str = "weight_monthly_trend.png";

/// Daily swing above which a day is reported, in kg.
pub const SIGNIFICANT_FLUCTUATION_KG: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyFluctuation {
    pub date: NaiveDate,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub fluctuation_range: f64,
}

/// Day/night means of the hourly mean weight (day is 06:00 to 17:59).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyPatterns {
    #[serde(rename = "Daytime Mean Weight")]
    pub day_mean: Option<f64>,
    #[serde(rename = "Nighttime Mean Weight")]
    pub night_mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightResult {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Statistics")]
    pub statistics: SummaryStats,
    #[serde(rename = "Daily Weight Fluctuations")]
    pub fluctuations: Vec<DailyFluctuation>,
    #[serde(rename = "Hourly Patterns")]
    pub hourly_patterns: HourlyPatterns,
    #[serde(rename = "Anomalies")]
    pub anomalies: Vec<Anomaly>,
}

/// Days whose max - min exceeds [`SIGNIFICANT_FLUCTUATION_KG`].
pub fn significant_fluctuations(month: &MeasurementSeries) -> Vec<DailyFluctuation> {
    let Some(values) = month.column(RECORD) else {
        return Vec::new();
    };
    resample(month.timestamps(), values, Granularity::Daily)
        .into_iter()
        .filter(|day| day.range() > SIGNIFICANT_FLUCTUATION_KG)
        .map(|day| DailyFluctuation {
            date: day.period.date(),
            min: round2(day.min),
            max: round2(day.max),
            mean: round2(day.mean),
            fluctuation_range: round2(day.range()),
        })
        .collect()
}

pub fn hourly_patterns(month: &MeasurementSeries) -> HourlyPatterns {
    let Some(values) = month.column(RECORD) else {
        return HourlyPatterns {
            day_mean: None,
            night_mean: None,
        };
    };
    let hourly = resample(month.timestamps(), values, Granularity::Hourly);
    let hours: Vec<_> = hourly.iter().map(|b| b.period).collect();
    let means: Vec<f64> = hourly.iter().map(|b| b.mean).collect();
    let split = partition(&hours, &means, DiurnalConvention::Hours6To18);
    HourlyPatterns {
        day_mean: split.day_mean,
        night_mean: split.night_mean,
    }
}

pub fn analyze(series: &MeasurementSeries, window: MonthWindow, plots: PlotContext<'_>) -> SectionOutcome {
    let month = window.filter(series);
    let values = match month.column(RECORD) {
        Some(values) if !values.is_empty() => values,
        _ => return SectionOutcome::failed(ErrorResult::no_data(window)),
    };

    let result = WeightResult {
        year: window.year(),
        month: window.month(),
        statistics: SummaryStats::compute(values),
        fluctuations: significant_fluctuations(&month),
        hourly_patterns: hourly_patterns(&month),
        anomalies: detect_anomalies(&month, &[RECORD], Z_SCORE_THRESHOLD),
    };
    tracing::debug!(
        "Weight {}: {} readings, {} significant fluctuation days",
        window.short(),
        month.len(),
        result.fluctuations.len()
    );

    let chart = TimeChart {
        title: format!("Weight Trend for {window}"),
        y_label: "Weight (kg)".to_string(),
        lines: vec![Line::new("Hive Weight", GREEN, month.points(RECORD).unwrap_or_default())],
    };
    let drawn = plots.draw(TREND_PLOT, |p, path| p.time_series(&chart, path));

    SectionOutcome {
        result: SectionResult::Weight(result),
        plots: drawn.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn flags_days_with_large_swing() {
        let series = MeasurementSeries::single(
            RECORD,
            vec![
                (at(1, 6), 40.0),
                (at(1, 18), 40.8),
                (at(2, 6), 41.0),
                (at(2, 18), 42.5),
            ],
        )
        .unwrap();
        let days = significant_fluctuations(&series);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
        assert_eq!(days[0].fluctuation_range, 1.5);
        assert_eq!(days[0].mean, 41.75);
    }

    #[test]
    fn day_night_split_uses_hourly_means() {
        let series = MeasurementSeries::single(
            RECORD,
            vec![
                (at(1, 2), 40.0),
                (at(1, 10), 41.0),
                (at(1, 11), 43.0),
                (at(1, 20), 42.0),
            ],
        )
        .unwrap();
        let patterns = hourly_patterns(&series);
        assert_eq!(patterns.day_mean, Some(42.0));
        assert_eq!(patterns.night_mean, Some(41.0));
    }
}
