//! Month bundles, the range report built from them and the renderers that
//! write it out.

pub mod bundle;
pub mod orchestrator;
pub mod render;

pub use bundle::{MonthBundle, RangeReport, SectionReport};
pub use orchestrator::{FileSource, Orchestrator, RunState, SeriesSource};
pub use render::{JsonRenderer, ReportRenderer, TextRenderer};

use crate::config::OutputFormat;

pub fn renderer_for(format: OutputFormat) -> Box<dyn ReportRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}
