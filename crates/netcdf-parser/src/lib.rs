//! NetCDF reader for gridded sea-ice forecasts.
//!
//! Loads the `sic_mean` / `sic_stddev` variables of a forecast file into a
//! [`ForecastDataset`](forecast_common::ForecastDataset). Dimensions are
//! matched by name, so files written as `(time, yc, xc, leadtime)` and
//! `(time, leadtime, yc, xc)` are both accepted.

pub mod error;
mod forecast;
mod native;

pub use error::{NetCdfError, NetCdfResult};
pub use forecast::{load_forecast_dataset, read_forecast_dataset};
pub use native::{load_forecast_dataset_from_bytes, silence_hdf5_errors};
