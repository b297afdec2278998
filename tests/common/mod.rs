#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};

use hivescope::error::PlotError;
use hivescope::plotting::{BoxChart, DualAxisChart, Heatmap, HourlyProfileChart, Plotter, TimeChart};

pub fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// Writes an empty file for every chart and remembers the file names and
/// the box charts. Charts named in `fail_on` are refused instead.
#[derive(Clone, Default)]
pub struct RecordingPlotter {
    pub drawn: Rc<RefCell<Vec<String>>>,
    pub boxes: Rc<RefCell<Vec<BoxChart>>>,
    pub fail_on: Vec<&'static str>,
}

impl RecordingPlotter {
    pub fn failing(names: &[&'static str]) -> Self {
        Self {
            fail_on: names.to_vec(),
            ..Self::default()
        }
    }

    fn record(&self, path: &Path) -> Result<(), PlotError> {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        if self.fail_on.iter().any(|f| *f == name) {
            return Err(PlotError::Backend(format!("refusing {name}")));
        }
        std::fs::write(path, b"").map_err(|e| PlotError::Backend(e.to_string()))?;
        self.drawn.borrow_mut().push(name);
        Ok(())
    }

    pub fn drawn(&self) -> Vec<String> {
        self.drawn.borrow().clone()
    }

    pub fn boxes(&self) -> Vec<BoxChart> {
        self.boxes.borrow().clone()
    }
}

impl Plotter for RecordingPlotter {
    fn time_series(&self, _chart: &TimeChart, path: &Path) -> Result<(), PlotError> {
        self.record(path)
    }

    fn hourly_profile(&self, _chart: &HourlyProfileChart, path: &Path) -> Result<(), PlotError> {
        self.record(path)
    }

    fn dual_axis(&self, _chart: &DualAxisChart, path: &Path) -> Result<(), PlotError> {
        self.record(path)
    }

    fn box_plot(&self, chart: &BoxChart, path: &Path) -> Result<(), PlotError> {
        self.record(path)?;
        self.boxes.borrow_mut().push(chart.clone());
        Ok(())
    }

    fn heatmap(&self, _chart: &Heatmap, path: &Path) -> Result<(), PlotError> {
        self.record(path)
    }
}
