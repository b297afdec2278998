use super::climate::{self, ClimateKind};
use super::{PlotContext, SectionOutcome, SectionResult};
use crate::data::series::{MeasurementSeries, HUMIDITY_EXTERIOR, HUMIDITY_INTERIOR};
use crate::processing::window::MonthWindow;

pub const TREND_PLOT: &str = "humidity_trend.png";

const KIND: ClimateKind = ClimateKind {
    name: "Humidity",
    interior: HUMIDITY_INTERIOR,
    exterior: HUMIDITY_EXTERIOR,
    y_label: "Humidity (%)",
    plot: TREND_PLOT,
};

pub fn analyze(series: &MeasurementSeries, window: MonthWindow, plots: PlotContext<'_>) -> SectionOutcome {
    climate::into_outcome(climate::analyze(&KIND, series, window, plots), SectionResult::Humidity)
}
