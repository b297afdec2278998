use std::fmt;

use serde::Serialize;

use crate::data::series::{
    HUMIDITY_EXTERIOR, HUMIDITY_INTERIOR, RECORD, TEMPERATURE_EXTERIOR, TEMPERATURE_INTERIOR,
};
use crate::error::ConfigError;

/// A physical quantity measured by the hive sensors. Each attribute comes from
/// its own source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Attribute {
    Co2,
    Weight,
    Temperature,
    Humidity,
}

impl Attribute {
    /// Name used in file and folder names.
    pub fn slug(&self) -> &'static str {
        match self {
            Attribute::Co2 => "carbondioxide",
            Attribute::Weight => "weight",
            Attribute::Temperature => "temperature",
            Attribute::Humidity => "humidity",
        }
    }

    /// Default source file name for a hive, e.g. `hive_weights_hive1.csv`.
    pub fn default_file_name(&self, hive_id: &str) -> String {
        let stem = match self {
            Attribute::Co2 => "hive_carbondioxide",
            Attribute::Weight => "hive_weights",
            Attribute::Temperature => "hive_temperatures",
            Attribute::Humidity => "hive_humidity",
        };
        format!("{stem}_{hive_id}.csv")
    }

    /// Columns guaranteed on a cleaned series of this attribute.
    pub fn value_columns(&self) -> &'static [&'static str] {
        match self {
            Attribute::Co2 | Attribute::Weight => &[RECORD],
            Attribute::Temperature => &[TEMPERATURE_INTERIOR, TEMPERATURE_EXTERIOR],
            Attribute::Humidity => &[HUMIDITY_INTERIOR, HUMIDITY_EXTERIOR],
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Attribute::Co2 => "ppm",
            Attribute::Weight => "kg",
            Attribute::Temperature => "\u{00B0}C",
            Attribute::Humidity => "%",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// One analysis section of a monthly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Section {
    Co2,
    Weight,
    Temperature,
    Humidity,
    Correlation,
}

impl Section {
    /// Fixed processing order within a month.
    pub const ORDER: [Section; 5] = [
        Section::Co2,
        Section::Weight,
        Section::Temperature,
        Section::Humidity,
        Section::Correlation,
    ];

    /// Accepts the web frontend names (`co2`) as well as the file names
    /// (`carbondioxide`).
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        match input.trim().to_lowercase().as_str() {
            "co2" | "carbondioxide" => Ok(Section::Co2),
            "weight" => Ok(Section::Weight),
            "temperature" => Ok(Section::Temperature),
            "humidity" => Ok(Section::Humidity),
            "correlation" => Ok(Section::Correlation),
            _ => Err(ConfigError::UnknownAttribute(input.trim().to_string())),
        }
    }

    /// Title of the section in the month bundle, e.g. `CO2 Analysis`.
    pub fn title(&self) -> &'static str {
        match self {
            Section::Co2 => "CO2 Analysis",
            Section::Weight => "Weight Analysis",
            Section::Temperature => "Temperature Analysis",
            Section::Humidity => "Humidity Analysis",
            Section::Correlation => "Correlation Analysis",
        }
    }

    /// Prefix of an attribute-specific report file, e.g. `Carbondioxide`.
    pub fn report_prefix(&self) -> &'static str {
        match self {
            Section::Co2 => "Carbondioxide",
            Section::Weight => "Weight",
            Section::Temperature => "Temperature",
            Section::Humidity => "Humidity",
            Section::Correlation => "Correlation",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Section::Correlation => "correlation",
            other => other.sources()[0].slug(),
        }
    }

    /// Source series this section needs.
    pub fn sources(&self) -> &'static [Attribute] {
        match self {
            Section::Co2 => &[Attribute::Co2],
            Section::Weight => &[Attribute::Weight],
            Section::Temperature => &[Attribute::Temperature],
            Section::Humidity => &[Attribute::Humidity],
            Section::Correlation => &[
                Attribute::Humidity,
                Attribute::Temperature,
                Attribute::Weight,
                Attribute::Co2,
            ],
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frontend_and_backend_names() {
        assert_eq!(Section::parse("co2").unwrap(), Section::Co2);
        assert_eq!(Section::parse("CarbonDioxide").unwrap(), Section::Co2);
        assert_eq!(Section::parse(" Weight ").unwrap(), Section::Weight);
        assert_eq!(
            Section::parse("pressure"),
            Err(ConfigError::UnknownAttribute("pressure".to_string()))
        );
    }

    #[test]
    fn correlation_needs_every_source() {
        let mut sources = Section::Correlation.sources().to_vec();
        sources.sort();
        assert_eq!(
            sources,
            vec![Attribute::Co2, Attribute::Weight, Attribute::Temperature, Attribute::Humidity]
        );
        assert_eq!(Section::Humidity.slug(), "humidity");
        assert_eq!(Attribute::Weight.default_file_name("hive7"), "hive_weights_hive7.csv");
    }
}
