use serde::Serialize;

use super::{ErrorResult, PlotContext, SectionOutcome, SectionResult};
use crate::data::series::{MeasurementSeries, RECORD};
use crate::plotting::{BoxChart, BoxGroup, HourlyProfileChart, Line, TimeChart, BLUE, ORANGE, PURPLE, RED};
use crate::processing::anomaly::{detect_anomalies, Anomaly, Z_SCORE_THRESHOLD};
use crate::processing::diurnal::{hourly_profile, partition, split_values, DiurnalConvention};
use crate::processing::statistics::SummaryStats;
use crate::processing::trend::{trend, Granularity, TrendMapping};
use crate::processing::window::MonthWindow;

pub const TREND_PLOT: &str = "co2_monthly_trend.png";
pub const DIURNAL_PLOT: &str = "co2_diurnal_variation.png";

/// Which report the analysis is for. The attribute report splits the day at
/// 06:00/18:00, the combined report at 07:00/19:00 and adds variability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Co2Variant {
    Attribute,
    Combined,
}

impl Co2Variant {
    pub fn convention(&self) -> DiurnalConvention {
        match self {
            Co2Variant::Attribute => DiurnalConvention::Hours6To18,
            Co2Variant::Combined => DiurnalConvention::Hours7To19,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Variability {
    #[serde(rename = "Daytime Variability")]
    pub day: Option<f64>,
    #[serde(rename = "Nighttime Variability")]
    pub night: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Co2Diurnal {
    #[serde(skip)]
    pub convention: DiurnalConvention,
    #[serde(rename = "Daytime Mean CO2")]
    pub day_mean: Option<f64>,
    #[serde(rename = "Nighttime Mean CO2")]
    pub night_mean: Option<f64>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub variability: Option<Variability>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trends {
    #[serde(rename = "Weekly Trend")]
    pub weekly: TrendMapping,
    #[serde(rename = "Daily Trend")]
    pub daily: TrendMapping,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Co2Result {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Statistics")]
    pub statistics: SummaryStats,
    #[serde(rename = "Diurnal Variations")]
    pub diurnal: Co2Diurnal,
    #[serde(rename = "Trends")]
    pub trends: Trends,
    #[serde(rename = "Anomalies")]
    pub anomalies: Vec<Anomaly>,
}

pub fn analyze(series: &MeasurementSeries, window: MonthWindow, variant: Co2Variant, plots: PlotContext<'_>) -> SectionOutcome {
    let month = window.filter(series);
    let values = match month.column(RECORD) {
        Some(values) if !values.is_empty() => values,
        _ => return SectionOutcome::failed(ErrorResult::no_data(window)),
    };
    let timestamps = month.timestamps();

    let split = partition(timestamps, values, variant.convention());
    let diurnal = Co2Diurnal {
        convention: variant.convention(),
        day_mean: split.day_mean,
        night_mean: split.night_mean,
        variability: (variant == Co2Variant::Combined).then_some(Variability {
            day: split.day_std_dev,
            night: split.night_std_dev,
        }),
    };

    let result = Co2Result {
        year: window.year(),
        month: window.month(),
        statistics: SummaryStats::compute(values),
        diurnal,
        trends: Trends {
            weekly: trend(timestamps, values, Granularity::Weekly),
            daily: trend(timestamps, values, Granularity::Daily),
        },
        anomalies: detect_anomalies(&month, &[RECORD], Z_SCORE_THRESHOLD),
    };
    tracing::debug!(
        "CO2 {}: {} readings, {} anomalies",
        window.short(),
        month.len(),
        result.anomalies.len()
    );

    let trend_chart = TimeChart {
        title: format!("CO2 Trend for {window}"),
        y_label: "CO2 (ppm)".to_string(),
        lines: vec![Line::new("CO2 Level", RED, month.points(RECORD).unwrap_or_default())],
    };
    let trend_drawn = plots.draw(TREND_PLOT, |p, path| p.time_series(&trend_chart, path));

    // The attribute report shows the hourly profile, the combined report the
    // day and night distributions on its own boundary.
    let diurnal_title = format!("Diurnal Variation of CO2 Levels for {window}");
    let diurnal_drawn = match variant {
        Co2Variant::Attribute => {
            let chart = HourlyProfileChart {
                title: diurnal_title,
                y_label: "Average CO2 (ppm)".to_string(),
                label: "Hourly Average CO2".to_string(),
                color: PURPLE,
                profile: hourly_profile(timestamps, values),
            };
            plots.draw(DIURNAL_PLOT, |p, path| p.hourly_profile(&chart, path))
        }
        Co2Variant::Combined => {
            let (day, night) = split_values(timestamps, values, result.diurnal.convention);
            let chart = BoxChart {
                title: diurnal_title,
                x_label: "Period".to_string(),
                y_label: "CO2 (ppm)".to_string(),
                groups: vec![
                    BoxGroup {
                        label: "Day".to_string(),
                        color: ORANGE,
                        values: day,
                    },
                    BoxGroup {
                        label: "Night".to_string(),
                        color: BLUE,
                        values: night,
                    },
                ],
            };
            plots.draw(DIURNAL_PLOT, |p, path| p.box_plot(&chart, path))
        }
    };
    let drawn = [trend_drawn, diurnal_drawn];

    SectionOutcome {
        result: SectionResult::Co2(result),
        plots: drawn.into_iter().flatten().collect(),
    }
}
