pub mod analysis;
pub mod attribute;
pub mod config;
pub mod data;
pub mod error;
pub mod plotting;
pub mod processing;
pub mod report;
