pub mod anomaly;
pub mod correlation;
pub mod diurnal;
pub mod downsampling;
pub mod statistics;
pub mod trend;
pub mod window;
