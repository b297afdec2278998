//! Run configuration. Raw option strings (from the command line or the
//! environment) are resolved once into a [`RunConfig`]; nothing downstream
//! reads the environment.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Datelike, Month, NaiveDate};

use crate::attribute::{Attribute, Section};
use crate::error::ConfigError;
use crate::processing::window::{month_range, MonthWindow};

pub const MIN_YEAR: i32 = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportMode {
    /// One report per attribute.
    #[default]
    Attribute,
    /// One report with every section per month.
    Combined,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Unvalidated options as given by the user.
#[derive(Debug, Clone, Default)]
pub struct ConfigInput {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
    pub attributes: Vec<String>,
    pub mode: ReportMode,
    pub co2_file: Option<PathBuf>,
    pub weight_file: Option<PathBuf>,
    pub temperature_file: Option<PathBuf>,
    pub humidity_file: Option<PathBuf>,
    pub csv_dir: PathBuf,
    pub hive_id: String,
    pub output_dir: PathBuf,
    pub download_dir: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Fully resolved run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Ascending, never empty.
    pub months: Vec<MonthWindow>,
    /// Sections in processing order, never empty.
    pub sections: Vec<Section>,
    pub mode: ReportMode,
    pub files: BTreeMap<Attribute, PathBuf>,
    pub hive_id: String,
    pub output_dir: PathBuf,
    pub download_dir: Option<PathBuf>,
    pub format: OutputFormat,
}

impl RunConfig {
    /// Validate `input`. `today` supplies the default month and the upper
    /// bound on years.
    pub fn resolve(input: ConfigInput, today: NaiveDate) -> Result<Self, ConfigError> {
        let months = resolve_months(&input, today)?;
        let sections = resolve_sections(&input.attributes, input.mode)?;

        let overrides = [
            (Attribute::Co2, input.co2_file),
            (Attribute::Weight, input.weight_file),
            (Attribute::Temperature, input.temperature_file),
            (Attribute::Humidity, input.humidity_file),
        ];
        let files = overrides
            .into_iter()
            .map(|(attribute, path)| {
                let path = path.unwrap_or_else(|| input.csv_dir.join(attribute.default_file_name(&input.hive_id)));
                (attribute, path)
            })
            .collect();

        Ok(Self {
            months,
            sections,
            mode: input.mode,
            files,
            hive_id: input.hive_id,
            output_dir: input.output_dir,
            download_dir: input.download_dir,
            format: input.format,
        })
    }

    pub fn first_month(&self) -> Option<MonthWindow> {
        self.months.first().copied()
    }

    pub fn last_month(&self) -> Option<MonthWindow> {
        self.months.last().copied()
    }
}

/// Date range if given, else the single year and month, else the month of
/// `today`.
pub fn resolve_months(input: &ConfigInput, today: NaiveDate) -> Result<Vec<MonthWindow>, ConfigError> {
    match (&input.start_date, &input.end_date) {
        (Some(start), Some(end)) => {
            if input.year.is_some() || input.month.is_some() {
                tracing::warn!("Ignoring year and month as a date range was provided");
            }
            let start = parse_month_year(start, today)?;
            let end = parse_month_year(end, today)?;
            if start > end {
                return Err(ConfigError::StartAfterEnd);
            }
            tracing::info!("Using date range {} to {}", start, end);
            return Ok(month_range(start, end));
        }
        (Some(_), None) => {
            return Err(ConfigError::IncompleteRange {
                given: "start-date",
                missing: "end-date",
            })
        }
        (None, Some(_)) => {
            return Err(ConfigError::IncompleteRange {
                given: "end-date",
                missing: "start-date",
            })
        }
        (None, None) => {}
    }

    let window = match (&input.year, &input.month) {
        (Some(year), Some(month)) => {
            let year = validate_year(year, today)?;
            let month = parse_month(month)?;
            MonthWindow::new(year, month).ok_or(ConfigError::MonthOutOfRange(i64::from(month)))?
        }
        (Some(_), None) => {
            return Err(ConfigError::IncompleteRange {
                given: "year",
                missing: "month",
            })
        }
        (None, Some(_)) => {
            return Err(ConfigError::IncompleteRange {
                given: "month",
                missing: "year",
            })
        }
        (None, None) => {
            let current = MonthWindow::new(today.year(), today.month()).ok_or(ConfigError::MonthOutOfRange(0))?;
            tracing::info!("No dates given, using the current month ({})", current);
            current
        }
    };
    Ok(vec![window])
}

/// Parse `MM/YYYY`.
pub fn parse_month_year(input: &str, today: NaiveDate) -> Result<MonthWindow, ConfigError> {
    let invalid = || ConfigError::InvalidDateFormat(input.to_string());
    let (month, year) = input.trim().split_once('/').ok_or_else(invalid)?;
    let month: i64 = month.trim().parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(ConfigError::MonthOutOfRange(month));
    }
    let year = validate_year(year, today).map_err(|err| match err {
        ConfigError::InvalidYear(_) => invalid(),
        other => other,
    })?;
    MonthWindow::new(year, month as u32).ok_or_else(invalid)
}

/// A month number (1-12) or a full English month name.
pub fn parse_month(input: &str) -> Result<u32, ConfigError> {
    let trimmed = input.trim();
    if let Ok(number) = trimmed.parse::<i64>() {
        return if (1..=12).contains(&number) {
            Ok(number as u32)
        } else {
            Err(ConfigError::MonthOutOfRange(number))
        };
    }
    (1..=12u8)
        .filter_map(|m| Month::try_from(m).ok())
        .find(|m| m.name().eq_ignore_ascii_case(trimmed))
        .map(|m| m.number_from_month())
        .ok_or_else(|| ConfigError::InvalidMonth(trimmed.to_string()))
}

/// A year between [`MIN_YEAR`] and next year.
pub fn validate_year(input: &str, today: NaiveDate) -> Result<i32, ConfigError> {
    let year: i64 = input
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidYear(input.trim().to_string()))?;
    let max = today.year() + 1;
    if year < i64::from(MIN_YEAR) || year > i64::from(max) {
        return Err(ConfigError::YearOutOfRange {
            year,
            min: MIN_YEAR,
            max,
        });
    }
    Ok(year as i32)
}

/// Attribute names separated by commas or whitespace. Defaults to temperature
/// in attribute mode and to every section in combined mode.
pub fn resolve_sections(attributes: &[String], mode: ReportMode) -> Result<Vec<Section>, ConfigError> {
    let mut sections = attributes
        .iter()
        .flat_map(|a| a.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|a| !a.is_empty())
        .map(Section::parse)
        .collect::<Result<Vec<_>, _>>()?;

    if sections.is_empty() {
        sections = match mode {
            ReportMode::Attribute => vec![Section::Temperature],
            ReportMode::Combined => Section::ORDER.to_vec(),
        };
    }
    if mode == ReportMode::Attribute && sections.contains(&Section::Correlation) {
        return Err(ConfigError::CorrelationRequiresCombined);
    }

    sections.sort_by_key(|s| Section::ORDER.iter().position(|o| o == s));
    sections.dedup();
    Ok(sections)
}
