use std::path::PathBuf;

use thiserror::Error;

use crate::attribute::Attribute;

/// Invalid run configuration. Always fatal, raised before any data loads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid format: {0}. Use MM/YYYY (e.g., 03/2025)")]
    InvalidDateFormat(String),

    #[error("Invalid month: {0}. Use 1-12 or full month name (e.g., March)")]
    InvalidMonth(String),

    #[error("Month must be between 1 and 12, got {0}")]
    MonthOutOfRange(i64),

    #[error("Invalid year: {0}. Use a number (e.g., 2025)")]
    InvalidYear(String),

    #[error("Year must be between {min} and {max}, got {year}")]
    YearOutOfRange { year: i64, min: i32, max: i32 },

    #[error("Start date must be before or equal to end date")]
    StartAfterEnd,

    #[error("Invalid attribute: {0}. Choose from co2, temperature, humidity, weight, correlation")]
    UnknownAttribute(String),

    #[error("Correlation analysis is only available in combined mode")]
    CorrelationRequiresCombined,

    #[error("Both --{given} and --{missing} are required")]
    IncompleteRange { given: &'static str, missing: &'static str },
}

/// Structural problems with a measurement series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("Column '{column}' has {actual} values but the index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Timestamps must be strictly increasing (violated at row {0})")]
    Unordered(usize),

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// Failure to read or clean one source file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Cannot read spreadsheet {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("No data found in {0}")]
    Empty(PathBuf),

    #[error("No timestamp column found in {0}")]
    NoTimestampColumn(PathBuf),

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("No source file configured for {0}")]
    NotConfigured(Attribute),

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// A correlation coefficient that cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    #[error("x and y must have the same length ({x} != {y})")]
    LengthMismatch { x: usize, y: usize },

    #[error("at least 2 aligned points are required, got {0}")]
    InsufficientData(usize),

    #[error("an input array is constant; the correlation coefficient is not defined")]
    ZeroVariance,
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Nothing to plot for '{0}'")]
    Empty(String),

    #[error("Drawing failed: {0}")]
    Backend(String),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>> for PlotError {
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        PlotError::Backend(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level failure of a report run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load {attribute} data: {source}")]
    Load {
        attribute: Attribute,
        #[source]
        source: LoadError,
    },

    #[error("Cannot create folder {path}: {source}")]
    Folder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("No report could be generated: every selected attribute failed to load")]
    NothingRendered,
}
