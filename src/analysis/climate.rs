use std::path::PathBuf;

use serde::Serialize;

use super::{ErrorResult, PlotContext, SectionOutcome};
use crate::data::series::MeasurementSeries;
use crate::plotting::{Line, TimeChart, BLUE, ORANGE};
use crate::processing::anomaly::{detect_anomalies, Anomaly, Z_SCORE_THRESHOLD};
use crate::processing::statistics::SummaryStats;
use crate::processing::window::MonthWindow;

/// Summary of one sensor position (interior or exterior).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelStats {
    #[serde(rename = "Average")]
    pub mean: Option<f64>,
    #[serde(rename = "Min")]
    pub min: Option<f64>,
    #[serde(rename = "Max")]
    pub max: Option<f64>,
    #[serde(rename = "Standard Deviation")]
    pub std_dev: Option<f64>,
    #[serde(rename = "Range")]
    pub range: Option<f64>,
}

impl From<SummaryStats> for ChannelStats {
    fn from(stats: SummaryStats) -> Self {
        Self {
            mean: stats.mean,
            min: stats.min,
            max: stats.max,
            std_dev: stats.std_dev,
            range: stats.range(),
        }
    }
}

/// Temperature or humidity month summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateResult {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Interior")]
    pub interior: ChannelStats,
    #[serde(rename = "Exterior")]
    pub exterior: ChannelStats,
    #[serde(rename = "Anomalies")]
    pub anomalies: Vec<Anomaly>,
}

/// How a paired interior/exterior quantity is labelled and charted.
pub(crate) struct ClimateKind {
    pub name: &'static str,
    pub interior: &'static str,
    pub exterior: &'static str,
    pub y_label: &'static str,
    pub plot: &'static str,
}

/// Shared analysis of temperature and humidity. The caller wraps the result
/// in its own section variant.
pub(crate) fn analyze(
    kind: &ClimateKind,
    series: &MeasurementSeries,
    window: MonthWindow,
    plots: PlotContext<'_>,
) -> Result<(ClimateResult, Vec<PathBuf>), ErrorResult> {
    let month = window.filter(series);
    let (Some(interior), Some(exterior)) = (month.column(kind.interior), month.column(kind.exterior)) else {
        return Err(ErrorResult::no_data(window));
    };
    if month.is_empty() {
        return Err(ErrorResult::no_data(window));
    }

    let result = ClimateResult {
        year: window.year(),
        month: window.month(),
        interior: SummaryStats::compute(interior).into(),
        exterior: SummaryStats::compute(exterior).into(),
        anomalies: detect_anomalies(&month, &[kind.interior, kind.exterior], Z_SCORE_THRESHOLD),
    };
    tracing::debug!(
        "{} {}: {} readings, {} anomalies",
        kind.name,
        window.short(),
        month.len(),
        result.anomalies.len()
    );

    let chart = TimeChart {
        title: format!("{} Trend for {window}", kind.name),
        y_label: kind.y_label.to_string(),
        lines: vec![
            Line::new(
                format!("Interior {}", kind.name),
                ORANGE,
                month.points(kind.interior).unwrap_or_default(),
            ),
            Line::new(
                format!("Exterior {}", kind.name),
                BLUE,
                month.points(kind.exterior).unwrap_or_default(),
            ),
        ],
    };
    let drawn = plots.draw(kind.plot, |p, path| p.time_series(&chart, path));

    Ok((result, drawn.into_iter().collect()))
}

pub(crate) fn into_outcome(
    outcome: Result<(ClimateResult, Vec<PathBuf>), ErrorResult>,
    wrap: fn(ClimateResult) -> super::SectionResult,
) -> SectionOutcome {
    match outcome {
        Ok((result, plots)) => SectionOutcome {
            result: wrap(result),
            plots,
        },
        Err(error) => SectionOutcome::failed(error),
    }
}
