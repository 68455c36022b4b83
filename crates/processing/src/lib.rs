//! Output processing for gridded sea-ice forecasts.
//!
//! Given a loaded [`ForecastDataset`](forecast_common::ForecastDataset), the
//! processors in this crate derive:
//!
//! - `output_metadata`: the dataset attributes, verbatim
//! - `output_forecast`: one PNG figure per quantity and leadtime
//! - `output_sie_growth`: sea-ice extent per leadtime
//! - `output_trend`: spatial means of concentration and uncertainty
//!
//! # Architecture
//!
//! Configuration is parsed into typed [`ProcessorConfig`]s once. The
//! [`Dispatcher`] runs them in configured order, wrapping every processor
//! with [`downstream_process`] for logging, timing and error normalisation.
//! Figures go through an [`ArtifactStore`](storage::ArtifactStore) and are
//! skipped when their artifact already exists, so re-delivered events only
//! redo missing work.

pub mod aggregate;
pub mod config;
pub mod dispatcher;
pub mod downstream;
pub mod error;
pub mod naming;
pub mod processors;

// Re-exports
pub use config::{
    OutputConfig, ProcessorConfig, ProcessorKind, ProcessorOptions, RenderSettings,
    DEFAULT_GRID_AREA_SIZE, DEFAULT_THRESHOLD,
};
pub use dispatcher::{DispatchReport, Dispatcher, ProcessorOutcome};
pub use downstream::downstream_process;
pub use error::{ConfigError, ProcessingError, Result};
pub use naming::{artifact_name, figure_title, result_name};
pub use processors::{ProcessContext, ProcessorFn, RenderSummary, TrendSeries};
