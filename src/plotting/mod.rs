pub mod chart;

use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::PlotError;
use crate::processing::correlation::CorrelationMatrix;

pub use chart::ChartPlotter;

/// RGB triple.
pub type Rgb = (u8, u8, u8);

pub const RED: Rgb = (214, 39, 40);
pub const BLUE: Rgb = (31, 119, 180);
pub const GREEN: Rgb = (44, 160, 44);
pub const ORANGE: Rgb = (255, 127, 14);
pub const PURPLE: Rgb = (148, 103, 189);

/// One named line of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: String,
    pub color: Rgb,
    pub points: Vec<(NaiveDateTime, f64)>,
}

impl Line {
    pub fn new(label: impl Into<String>, color: Rgb, points: Vec<(NaiveDateTime, f64)>) -> Self {
        Self {
            label: label.into(),
            color,
            points,
        }
    }
}

/// Lines over a date axis sharing one value axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeChart {
    pub title: String,
    pub y_label: String,
    pub lines: Vec<Line>,
}

/// One line on the left axis, the others on a shared right axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DualAxisChart {
    pub title: String,
    pub left_label: String,
    pub right_label: String,
    pub left: Line,
    pub right: Vec<Line>,
}

/// Mean value per clock hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyProfileChart {
    pub title: String,
    pub y_label: String,
    pub label: String,
    pub color: Rgb,
    pub profile: Vec<(u32, f64)>,
}

/// One labelled group of readings in a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGroup {
    pub label: String,
    pub color: Rgb,
    pub values: Vec<f64>,
}

/// Distribution of a few groups side by side, e.g. day against night.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub groups: Vec<BoxGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub title: String,
    pub matrix: CorrelationMatrix,
}

/// Chart rendering collaborator. Each call writes one image to `path`.
pub trait Plotter {
    fn time_series(&self, chart: &TimeChart, path: &Path) -> Result<(), PlotError>;
    fn hourly_profile(&self, chart: &HourlyProfileChart, path: &Path) -> Result<(), PlotError>;
    fn dual_axis(&self, chart: &DualAxisChart, path: &Path) -> Result<(), PlotError>;
    fn box_plot(&self, chart: &BoxChart, path: &Path) -> Result<(), PlotError>;
    fn heatmap(&self, chart: &Heatmap, path: &Path) -> Result<(), PlotError>;
}

/// Diverging blue-white-red scale for a value in [-1, 1].
pub fn coolwarm(value: f64) -> Rgb {
    const COOL: Rgb = (59, 76, 192);
    const NEUTRAL: Rgb = (221, 221, 221);
    const WARM: Rgb = (180, 4, 38);

    let t = value.clamp(-1.0, 1.0);
    let (from, to, f) = if t < 0.0 {
        (NEUTRAL, COOL, -t)
    } else {
        (NEUTRAL, WARM, t)
    };
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8;
    (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), (59, 76, 192));
        assert_eq!(coolwarm(0.0), (221, 221, 221));
        assert_eq!(coolwarm(1.0), (180, 4, 38));
        assert_eq!(coolwarm(7.0), coolwarm(1.0));
    }
}
