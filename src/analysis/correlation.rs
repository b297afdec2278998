use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::{ErrorResult, PlotContext, SectionOutcome, SectionResult};
use crate::data::series::{
    MeasurementSeries, HUMIDITY_EXTERIOR, HUMIDITY_INTERIOR, RECORD, TEMPERATURE_EXTERIOR,
    TEMPERATURE_INTERIOR,
};
use crate::error::CorrelationError;
use crate::plotting::{DualAxisChart, Heatmap, Line, BLUE, GREEN, ORANGE, RED};
use crate::processing::correlation::{correlation_matrix, drop_incomplete, inner_join, pearson, spearman};
use crate::processing::window::MonthWindow;

pub const CO2_TEMP_WEIGHT_PLOT: &str = "co2_temp_weight_trends.png";
pub const HUMIDITY_WEIGHT_PLOT: &str = "humidity_weight_trends.png";
pub const HEATMAP_PLOT: &str = "correlation_heatmap.png";

pub const CO2_RECORD: &str = "co2_record";
pub const WEIGHT_RECORD: &str = "weight_record";

/// The four cleaned sources the engine aligns.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationInputs<'a> {
    pub humidity: &'a MeasurementSeries,
    pub temperature: &'a MeasurementSeries,
    pub weight: &'a MeasurementSeries,
    pub co2: &'a MeasurementSeries,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub pearson: f64,
    pub spearman: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairCorrelation {
    pub name: &'static str,
    pub outcome: Result<Coefficients, CorrelationError>,
}

impl PairCorrelation {
    /// `Pearson: 0.12, Spearman: 0.34` or `Error: <reason>`.
    pub fn formatted(&self) -> String {
        match &self.outcome {
            Ok(c) => format!("Pearson: {:.2}, Spearman: {:.2}", c.pearson, c.spearman),
            Err(err) => format!("Error: {err}"),
        }
    }
}

/// Pairwise association with hive weight. Serializes as a map from pair name
/// to its formatted text.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    pub pairs: Vec<PairCorrelation>,
    /// Rows left after joining and complete-case filtering.
    pub aligned_rows: usize,
}

impl CorrelationResult {
    pub fn pair(&self, name: &str) -> Option<&PairCorrelation> {
        self.pairs.iter().find(|p| p.name == name)
    }
}

impl Serialize for CorrelationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pairs.len()))?;
        for pair in &self.pairs {
            map.serialize_entry(pair.name, &pair.formatted())?;
        }
        map.end()
    }
}

/// Pairs evaluated against hive weight: (name, x column).
const PAIRS: [(&str, &str); 3] = [
    ("CO2 vs Weight", CO2_RECORD),
    ("Temperature vs Weight", TEMPERATURE_INTERIOR),
    ("Humidity vs Weight", HUMIDITY_INTERIOR),
];

fn correlate(x: &[f64], y: &[f64]) -> Result<Coefficients, CorrelationError> {
    Ok(Coefficients {
        pearson: pearson(x, y)?,
        spearman: spearman(x, y)?,
    })
}

/// Join one month of the four sources on their shared timestamps and measure
/// how CO2, interior temperature and interior humidity track hive weight.
pub fn analyze(inputs: CorrelationInputs<'_>, window: MonthWindow, plots: PlotContext<'_>) -> SectionOutcome {
    let humidity = window.filter(inputs.humidity);
    let temperature = window.filter(inputs.temperature);
    let weight = window.filter(inputs.weight);
    let co2 = window.filter(inputs.co2);
    if [&humidity, &temperature, &weight, &co2].iter().any(|s| s.is_empty()) {
        return SectionOutcome::failed(ErrorResult::no_data(window));
    }

    let parts = [
        humidity.select(&[HUMIDITY_INTERIOR, HUMIDITY_EXTERIOR]),
        temperature.select(&[TEMPERATURE_INTERIOR, TEMPERATURE_EXTERIOR]),
        weight.rename_column(RECORD, WEIGHT_RECORD).select(&[WEIGHT_RECORD]),
        co2.rename_column(RECORD, CO2_RECORD).select(&[CO2_RECORD]),
    ];
    let combined = match inner_join(&parts) {
        Ok(joined) => drop_incomplete(&joined),
        Err(err) => {
            tracing::warn!("Cannot align sources for {}: {}", window.short(), err);
            return SectionOutcome::failed(ErrorResult::new(window, err.to_string()));
        }
    };
    if combined.is_empty() {
        return SectionOutcome::failed(ErrorResult::no_overlap(window));
    }

    let weight_values = combined.column(WEIGHT_RECORD).unwrap_or_default();
    let pairs = PAIRS
        .iter()
        .map(|&(name, column)| PairCorrelation {
            name,
            outcome: correlate(combined.column(column).unwrap_or_default(), weight_values),
        })
        .collect();
    let result = CorrelationResult {
        pairs,
        aligned_rows: combined.len(),
    };
    tracing::debug!("Correlation {}: {} aligned rows", window.short(), combined.len());

    let points = |column: &str| combined.points(column).unwrap_or_default();
    let weight_line = || Line::new("Weight Record", GREEN, points(WEIGHT_RECORD));
    let co2_chart = DualAxisChart {
        title: format!("CO2, Temperature, and Weight Trends for {window}"),
        left_label: "CO2 (ppm)".to_string(),
        right_label: "Temperature (\u{00B0}C) / Weight (kg)".to_string(),
        left: Line::new("CO2 Record", BLUE, points(CO2_RECORD)),
        right: vec![
            Line::new("Interior Temperature (\u{00B0}C)", RED, points(TEMPERATURE_INTERIOR)),
            weight_line(),
        ],
    };
    let humidity_chart = DualAxisChart {
        title: format!("Humidity and Weight Trends for {window}"),
        left_label: "Humidity (%)".to_string(),
        right_label: "Weight (kg)".to_string(),
        left: Line::new("Interior Humidity (%)", ORANGE, points(HUMIDITY_INTERIOR)),
        right: vec![weight_line()],
    };
    let heatmap = Heatmap {
        title: format!("Correlation Heatmap for {window}"),
        matrix: correlation_matrix(&combined),
    };
    let drawn = [
        plots.draw(CO2_TEMP_WEIGHT_PLOT, |p, path| p.dual_axis(&co2_chart, path)),
        plots.draw(HUMIDITY_WEIGHT_PLOT, |p, path| p.dual_axis(&humidity_chart, path)),
        plots.draw(HEATMAP_PLOT, |p, path| p.heatmap(&heatmap, path)),
    ];

    SectionOutcome {
        result: SectionResult::Correlation(result),
        plots: drawn.into_iter().flatten().collect(),
    }
}
