use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::analysis::{expected_plots, SectionOutcome, SectionResult};
use crate::attribute::Section;
use crate::processing::window::MonthWindow;

/// One analysed section of one month.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    pub section: Section,
    pub result: SectionResult,
    pub plots: Vec<PathBuf>,
}

impl SectionReport {
    pub fn new(section: Section, outcome: SectionOutcome) -> Self {
        Self {
            section,
            result: outcome.result,
            plots: outcome.plots,
        }
    }

    /// Every chart the section should have, paired with the written file if
    /// drawing succeeded. Error sections expect no charts.
    pub fn chart_slots(&self) -> Vec<(&'static str, Option<&Path>)> {
        if self.result.error().is_some() {
            return Vec::new();
        }
        expected_plots(self.section)
            .iter()
            .map(|name| {
                let written = self
                    .plots
                    .iter()
                    .find(|p| p.file_name().and_then(|f| f.to_str()) == Some(*name))
                    .map(PathBuf::as_path);
                (*name, written)
            })
            .collect()
    }
}

/// Results of every selected section for one month, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBundle {
    pub window: MonthWindow,
    pub folder: PathBuf,
    pub sections: Vec<SectionReport>,
}

impl MonthBundle {
    /// Key of the month in the report, e.g. `2025_March`.
    pub fn key(&self) -> String {
        self.window.label()
    }
}

/// Everything the renderer needs for one report file.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeReport {
    pub title: String,
    pub hive_id: String,
    /// Folder the report file is written to.
    pub folder: PathBuf,
    /// File name without extension.
    pub file_stem: String,
    pub months: Vec<MonthBundle>,
}

struct Sections<'a>(&'a [SectionReport]);

impl Serialize for Sections<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for section in self.0 {
            map.serialize_entry(section.section.title(), &section.result)?;
        }
        map.end()
    }
}

struct Plots<'a>(&'a [SectionReport]);

impl Serialize for Plots<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for section in self.0.iter().filter(|s| !s.plots.is_empty()) {
            map.serialize_entry(section.section.title(), &section.plots)?;
        }
        map.end()
    }
}

struct ResultsByMonth<'a>(&'a [MonthBundle]);

impl Serialize for ResultsByMonth<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for bundle in self.0 {
            map.serialize_entry(&bundle.key(), &Sections(&bundle.sections))?;
        }
        map.end()
    }
}

struct PlotsByMonth<'a>(&'a [MonthBundle]);

impl Serialize for PlotsByMonth<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for bundle in self.0 {
            map.serialize_entry(&bundle.key(), &Plots(&bundle.sections))?;
        }
        map.end()
    }
}

/// Serializes as `{"Title", "Hive", "Results": {month: {section: result}},
/// "Plots": {month: {section: [paths]}}}` with months in chronological order.
impl Serialize for RangeReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("Title", &self.title)?;
        map.serialize_entry("Hive", &self.hive_id)?;
        map.serialize_entry("Results", &ResultsByMonth(&self.months))?;
        map.serialize_entry("Plots", &PlotsByMonth(&self.months))?;
        map.end()
    }
}
