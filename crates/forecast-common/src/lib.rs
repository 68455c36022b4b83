//! Common types and utilities shared across the forecast output services.

pub mod dataset;
pub mod error;
pub mod time;

pub use dataset::{Attributes, ForecastDataset, SicVariable};
pub use error::{ForecastError, ForecastResult};
pub use time::{artifact_date, plot_date, title_date, CfTimeUnits, TimeUnit};
