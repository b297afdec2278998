pub mod cleaner;
pub mod datetime;
pub mod loader;
pub mod parser;
pub mod series;

use std::path::Path;

use crate::attribute::Attribute;
use crate::error::LoadError;
use series::MeasurementSeries;

/// Load and clean the source file of one attribute.
pub fn load_series(path: &Path, attribute: Attribute) -> Result<MeasurementSeries, LoadError> {
    let table = loader::load_table(path)?;
    let series = cleaner::clean(&table, attribute, path)?;
    tracing::info!(
        "Loaded {} {} readings from {:?}",
        series.len(),
        attribute,
        path
    );
    Ok(series)
}
