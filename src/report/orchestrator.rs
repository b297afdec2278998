use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::bundle::{MonthBundle, RangeReport, SectionReport};
use super::render::ReportRenderer;
use super::renderer_for;
use crate::analysis::co2::Co2Variant;
use crate::analysis::correlation::CorrelationInputs;
use crate::analysis::{co2, correlation, humidity, temperature, weight};
use crate::analysis::{ErrorResult, PlotContext, SectionOutcome};
use crate::attribute::{Attribute, Section};
use crate::config::{ConfigInput, ReportMode, RunConfig};
use crate::data::load_series;
use crate::data::series::MeasurementSeries;
use crate::error::{LoadError, RunError};
use crate::plotting::Plotter;
use crate::processing::window::MonthWindow;

/// Where a run is. `Failed` is reachable from every step before `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Configured,
    Loading,
    Analyzing,
    Rendering,
    Done,
    Failed,
}

/// Supplies the cleaned series of an attribute.
pub trait SeriesSource {
    fn load(&self, attribute: Attribute) -> Result<MeasurementSeries, LoadError>;
}

/// Reads each attribute from its configured file.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    files: BTreeMap<Attribute, PathBuf>,
}

impl FileSource {
    pub fn new(files: BTreeMap<Attribute, PathBuf>) -> Self {
        Self { files }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.files.clone())
    }
}

impl SeriesSource for FileSource {
    fn load(&self, attribute: Attribute) -> Result<MeasurementSeries, LoadError> {
        let path = self
            .files
            .get(&attribute)
            .ok_or(LoadError::NotConfigured(attribute))?;
        load_series(path, attribute)
    }
}

type Sources = BTreeMap<Attribute, MeasurementSeries>;

/// Drives a run: loads the sources, analyses every month in order and hands
/// the collected bundles to the renderer.
pub struct Orchestrator {
    config: RunConfig,
    source: Box<dyn SeriesSource>,
    plotter: Box<dyn Plotter>,
    renderer: Box<dyn ReportRenderer>,
    state: RunState,
}

impl Orchestrator {
    pub fn new(
        config: RunConfig,
        source: Box<dyn SeriesSource>,
        plotter: Box<dyn Plotter>,
        renderer: Box<dyn ReportRenderer>,
    ) -> Self {
        Self {
            config,
            source,
            plotter,
            renderer,
            state: RunState::Configured,
        }
    }

    /// Validate `input` and wire the configured files and output format.
    pub fn from_input(input: ConfigInput, today: NaiveDate, plotter: Box<dyn Plotter>) -> Result<Self, RunError> {
        let config = RunConfig::resolve(input, today)?;
        let source = FileSource::from_config(&config);
        let renderer = renderer_for(config.format);
        Ok(Self::new(config, Box::new(source), plotter, renderer))
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run to completion and return the written report files.
    pub fn run(&mut self) -> Result<Vec<PathBuf>, RunError> {
        tracing::info!(
            "Generating {:?} reports for {} month(s), sections {:?}",
            self.config.mode,
            self.config.months.len(),
            self.config.sections
        );
        let result = match self.config.mode {
            ReportMode::Attribute => self.run_per_attribute(),
            ReportMode::Combined => self.run_combined(),
        };
        self.state = match &result {
            Ok(_) => RunState::Done,
            Err(err) => {
                tracing::error!("Run failed: {}", err);
                RunState::Failed
            }
        };
        result
    }

    fn bounds(&self) -> Result<(MonthWindow, MonthWindow), RunError> {
        match (self.config.first_month(), self.config.last_month()) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(RunError::NothingRendered),
        }
    }

    /// One report per section. A section whose source cannot be loaded is
    /// skipped.
    fn run_per_attribute(&mut self) -> Result<Vec<PathBuf>, RunError> {
        let (first, last) = self.bounds()?;
        let mut written = Vec::new();

        for section in self.config.sections.clone() {
            // Attribute mode tolerates a missing source.
            self.state = RunState::Loading;
            let sources = match self.load_all(section.sources()) {
                Ok(sources) => sources,
                Err(RunError::Load { attribute, source }) => {
                    tracing::warn!("Skipping {} report, cannot load {}: {}", section.slug(), attribute, source);
                    continue;
                }
                Err(other) => return Err(other),
            };

            self.state = RunState::Analyzing;
            let mut months = Vec::with_capacity(self.config.months.len());
            for window in self.config.months.clone() {
                let folder = self
                    .config
                    .output_dir
                    .join(format!("{}_{}", window.label(), section.slug()));
                create_folder(&folder)?;
                let outcome = self.analyze(section, &sources, window, Co2Variant::Attribute, &folder);
                months.push(MonthBundle {
                    window,
                    folder,
                    sections: vec![SectionReport::new(section, outcome)],
                });
            }

            // One report per section covering the whole range.
            let report = RangeReport {
                title: format!(
                    "{} Analysis Report for {}: {} to {}",
                    section.report_prefix(),
                    self.config.hive_id,
                    first,
                    last
                ),
                hive_id: self.config.hive_id.clone(),
                folder: self.config.output_dir.join(format!(
                    "Range_{}_{}_to_{}",
                    section.slug(),
                    first.label(),
                    last.label()
                )),
                file_stem: format!(
                    "{}_Report_{}_{}_to_{}",
                    section.report_prefix(),
                    self.config.hive_id,
                    first.label(),
                    last.label()
                ),
                months,
            };
            written.push(self.render(&report)?);
        }

        if written.is_empty() {
            return Err(RunError::NothingRendered);
        }
        Ok(written)
    }

    /// One report with every selected section per month. Every source must
    /// load.
    fn run_combined(&mut self) -> Result<Vec<PathBuf>, RunError> {
        let (first, last) = self.bounds()?;

        // Load each source once, however many sections share it.
        self.state = RunState::Loading;
        let mut needed: Vec<Attribute> = self
            .config
            .sections
            .iter()
            .flat_map(|s| s.sources().iter().copied())
            .collect();
        needed.sort();
        needed.dedup();
        let sources = self.load_all(&needed)?;

        // Every section of a month shares one folder.
        self.state = RunState::Analyzing;
        let mut months = Vec::with_capacity(self.config.months.len());
        for window in self.config.months.clone() {
            tracing::info!("Analysing {}", window);
            let folder = self.config.output_dir.join(window.label());
            create_folder(&folder)?;
            let sections = self
                .config
                .sections
                .iter()
                .map(|&section| {
                    let outcome = self.analyze(section, &sources, window, Co2Variant::Combined, &folder);
                    SectionReport::new(section, outcome)
                })
                .collect();
            months.push(MonthBundle {
                window,
                folder,
                sections,
            });
        }

        let report = RangeReport {
            title: format!(
                "Beehive Analysis Report for {}: {} to {}",
                self.config.hive_id, first, last
            ),
            hive_id: self.config.hive_id.clone(),
            folder: self
                .config
                .output_dir
                .join(format!("Range_{}_to_{}", first.label(), last.label())),
            file_stem: format!(
                "Report_{}_{}_to_{}",
                self.config.hive_id,
                first.label(),
                last.label()
            ),
            months,
        };
        Ok(vec![self.render(&report)?])
    }

    fn load_all(&self, attributes: &[Attribute]) -> Result<Sources, RunError> {
        attributes
            .iter()
            .map(|&attribute| {
                self.source
                    .load(attribute)
                    .map(|series| (attribute, series))
                    .map_err(|source| RunError::Load { attribute, source })
            })
            .collect()
    }

    fn analyze(
        &self,
        section: Section,
        sources: &Sources,
        window: MonthWindow,
        variant: Co2Variant,
        folder: &Path,
    ) -> SectionOutcome {
        let plots = PlotContext::new(self.plotter.as_ref(), folder);
        let get = |attribute: Attribute| sources.get(&attribute);
        let outcome = match section {
            Section::Co2 => get(Attribute::Co2).map(|s| co2::analyze(s, window, variant, plots)),
            Section::Weight => get(Attribute::Weight).map(|s| weight::analyze(s, window, plots)),
            Section::Temperature => get(Attribute::Temperature).map(|s| temperature::analyze(s, window, plots)),
            Section::Humidity => get(Attribute::Humidity).map(|s| humidity::analyze(s, window, plots)),
            Section::Correlation => match (
                get(Attribute::Humidity),
                get(Attribute::Temperature),
                get(Attribute::Weight),
                get(Attribute::Co2),
            ) {
                (Some(humidity), Some(temperature), Some(weight), Some(co2)) => {
                    let inputs = CorrelationInputs {
                        humidity,
                        temperature,
                        weight,
                        co2,
                    };
                    Some(correlation::analyze(inputs, window, plots))
                }
                _ => None,
            },
        };
        // A section whose sources were not loaded reports no data.
        let outcome = outcome.unwrap_or_else(|| SectionOutcome::failed(ErrorResult::no_data(window)));
        if let Some(reason) = outcome.result.error() {
            tracing::warn!("{} for {}: {}", section, window, reason);
        }
        outcome
    }

    fn render(&mut self, report: &RangeReport) -> Result<PathBuf, RunError> {
        self.state = RunState::Rendering;
        let path = self.renderer.render(report)?;
        if let Some(dir) = &self.config.download_dir {
            deliver(&path, dir);
        }
        Ok(path)
    }
}

fn create_folder(folder: &Path) -> Result<(), RunError> {
    std::fs::create_dir_all(folder).map_err(|source| RunError::Folder {
        path: folder.to_path_buf(),
        source,
    })
}

/// Copy the report into `dir`. Failure is logged only; the report itself is
/// already written.
fn deliver(report: &Path, dir: &Path) {
    let Some(name) = report.file_name() else {
        return;
    };
    let target = dir.join(name);
    let copied = std::fs::create_dir_all(dir).and_then(|()| std::fs::copy(report, &target));
    match copied {
        Ok(_) => tracing::info!("Report copied to {:?}", target),
        Err(err) => tracing::error!("Could not copy report to {:?}: {}", target, err),
    }
}
