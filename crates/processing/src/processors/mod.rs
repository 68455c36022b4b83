//! The output processors.
//!
//! Each processor is a plain function over a shared, read-only dataset plus
//! a [`ProcessContext`], returning a JSON result or `None` when its only
//! effect is writing artifacts.

mod forecast;
mod metadata;
mod sie_growth;
mod trend;

use forecast_common::ForecastDataset;
use serde_json::Value;
use storage::ArtifactStore;

use crate::config::{ProcessorKind, ProcessorOptions, RenderSettings};
use crate::error::Result;

pub use forecast::{colormap_for, output_forecast, render_forecast, RenderSummary};
pub use metadata::{metadata, output_metadata};
pub use sie_growth::{output_sie_growth, sie_growth};
pub use trend::{output_trend, trend, TrendSeries};

/// Everything a processor may need besides the dataset.
///
/// The same context shape is handed to every processor, whether or not it
/// uses a given field.
#[derive(Clone, Copy)]
pub struct ProcessContext<'a> {
    pub options: ProcessorOptions,
    /// Destination for rendered figures, when one is configured.
    pub artifacts: Option<&'a dyn ArtifactStore>,
    pub render: &'a RenderSettings,
}

/// Uniform processor signature.
pub type ProcessorFn = fn(&ForecastDataset, &ProcessContext<'_>) -> Result<Option<Value>>;

/// The function implementing a processor.
pub fn processor_for(kind: ProcessorKind) -> ProcessorFn {
    match kind {
        ProcessorKind::Metadata => output_metadata,
        ProcessorKind::Forecast => output_forecast,
        ProcessorKind::SieGrowth => output_sie_growth,
        ProcessorKind::Trend => output_trend,
    }
}
