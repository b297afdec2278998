//! Per-attribute analyzers and the correlation engine. Each analyzer turns
//! one month of a cleaned series into a [`SectionOutcome`]: a structured
//! result (or an error marker) plus the paths of the charts it managed to
//! draw.

pub mod climate;
pub mod co2;
pub mod correlation;
pub mod humidity;
pub mod temperature;
pub mod weight;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::attribute::Section;
use crate::error::PlotError;
use crate::plotting::Plotter;
use crate::processing::window::MonthWindow;

/// Error marker standing in for a section result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResult {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Error")]
    pub error: String,
}

impl ErrorResult {
    pub fn new(window: MonthWindow, error: impl Into<String>) -> Self {
        Self {
            year: window.year(),
            month: window.month(),
            error: error.into(),
        }
    }

    /// The window holds no readings.
    pub fn no_data(window: MonthWindow) -> Self {
        Self::new(window, format!("No data available for {}", window.short()))
    }

    /// Nothing survived joining and complete-case filtering.
    pub fn no_overlap(window: MonthWindow) -> Self {
        Self::new(window, format!("No valid data after cleaning for {}", window.short()))
    }
}

/// Result of one section for one month. Serializes as the bare record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionResult {
    Co2(co2::Co2Result),
    Temperature(climate::ClimateResult),
    Humidity(climate::ClimateResult),
    Weight(weight::WeightResult),
    Correlation(correlation::CorrelationResult),
    Error(ErrorResult),
}

impl SectionResult {
    pub fn error(&self) -> Option<&str> {
        match self {
            SectionResult::Error(e) => Some(&e.error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionOutcome {
    pub result: SectionResult,
    /// Charts actually written, in drawing order.
    pub plots: Vec<PathBuf>,
}

impl SectionOutcome {
    pub fn failed(error: ErrorResult) -> Self {
        Self {
            result: SectionResult::Error(error),
            plots: Vec::new(),
        }
    }
}

/// Chart files a section draws when it has data.
pub fn expected_plots(section: Section) -> &'static [&'static str] {
    match section {
        Section::Co2 => &[co2::TREND_PLOT, co2::DIURNAL_PLOT],
        Section::Weight => &[weight::TREND_PLOT],
        Section::Temperature => &[temperature::TREND_PLOT],
        Section::Humidity => &[humidity::TREND_PLOT],
        Section::Correlation => &[
            correlation::CO2_TEMP_WEIGHT_PLOT,
            correlation::HUMIDITY_WEIGHT_PLOT,
            correlation::HEATMAP_PLOT,
        ],
    }
}

/// Where and with what an analyzer draws its charts.
#[derive(Clone, Copy)]
pub struct PlotContext<'a> {
    plotter: &'a dyn Plotter,
    folder: &'a Path,
}

impl<'a> PlotContext<'a> {
    pub fn new(plotter: &'a dyn Plotter, folder: &'a Path) -> Self {
        Self { plotter, folder }
    }

    /// Draw one chart into the folder. A failure is logged and yields `None`
    /// so the section carries on without that chart.
    pub fn draw<F>(&self, file_name: &str, render: F) -> Option<PathBuf>
    where
        F: FnOnce(&dyn Plotter, &Path) -> Result<(), PlotError>,
    {
        let path = self.folder.join(file_name);
        match render(self.plotter, &path) {
            Ok(()) => {
                tracing::debug!("Saved chart {:?}", path);
                Some(path)
            }
            Err(err) => {
                tracing::warn!("Could not draw {}: {}", file_name, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_markers() {
        let window = MonthWindow::new(2025, 3).unwrap();
        let json = serde_json::to_value(SectionResult::Error(ErrorResult::no_data(window))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Year": 2025, "Month": 3, "Error": "No data available for 2025-03"})
        );
        assert_eq!(
            ErrorResult::no_overlap(window).error,
            "No valid data after cleaning for 2025-03"
        );
    }
}
