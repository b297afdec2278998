use super::climate::{self, ClimateKind};
use super::{PlotContext, SectionOutcome, SectionResult};
use crate::data::series::{MeasurementSeries, TEMPERATURE_EXTERIOR, TEMPERATURE_INTERIOR};
use crate::processing::window::MonthWindow;

pub const TREND_PLOT: &str = "temperature_trend.png";

const KIND: ClimateKind = ClimateKind {
    name: "Temperature",
    interior: TEMPERATURE_INTERIOR,
    exterior: TEMPERATURE_EXTERIOR,
    y_label: "Temperature (\u{00B0}C)",
    plot: TREND_PLOT,
};

/// Interior and exterior temperature statistics, range and anomalies.
pub fn analyze(series: &MeasurementSeries, window: MonthWindow, plots: PlotContext<'_>) -> SectionOutcome {
    climate::into_outcome(climate::analyze(&KIND, series, window, plots), SectionResult::Temperature)
}
