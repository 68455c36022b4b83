//! Per-leadtime forecast figures.

use bytes::Bytes;
use forecast_common::{ForecastDataset, SicVariable};
use metrics::counter;
use renderer::{render_figure, Colormap, FigureSpec};
use serde::Serialize;
use serde_json::Value;
use storage::ArtifactStore;
use tracing::{debug, error, info, warn};

use super::ProcessContext;
use crate::aggregate::colour_bounds;
use crate::config::RenderSettings;
use crate::error::{ConfigError, ProcessingError, Result};
use crate::naming::{artifact_name, figure_title};

/// What happened to the figures of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RenderSummary {
    pub fn total(&self) -> usize {
        self.written + self.skipped + self.failed
    }
}

/// Colormap for a quantity: blues for concentration, purples for stddev.
pub fn colormap_for(var: SicVariable) -> Colormap {
    match var {
        SicVariable::Mean => Colormap::blues_r(),
        SicVariable::Stddev => Colormap::bupu_r(),
    }
}

/// Render one figure per quantity and leadtime into `store`.
///
/// Figures whose artifact already exists are skipped. A failure on one
/// figure is logged and the rest are still attempted; the run then fails
/// with [`ProcessingError::RenderBatch`] so a retry redoes only the missing
/// figures.
pub fn render_forecast(
    ds: &ForecastDataset,
    store: &dyn ArtifactStore,
    render: &RenderSettings,
) -> Result<RenderSummary> {
    if render.font.is_none() {
        warn!("No font available, figures will be rendered without text");
    }

    let mut summary = RenderSummary::default();

    for var in SicVariable::ALL {
        let (vmin, vmax) = colour_bounds(ds, var);
        let colormap = colormap_for(var);
        debug!(var = %var, vmin, vmax, "Colour scale");

        for (idx, &leadtime) in ds.leadtimes().iter().enumerate() {
            let plot_date = ds.plot_date(leadtime)?;
            let name = artifact_name(var, plot_date);

            match store.exists(&name) {
                Ok(true) => {
                    warn!("Skipping {} as already exists", store.location(&name));
                    counter!("artifacts_skipped_total").increment(1);
                    summary.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    error!(artifact = %name, error = %e, "Failed to check for existing artifact");
                    counter!("artifact_render_failures_total").increment(1);
                    summary.failed += 1;
                    continue;
                }
            }

            let spec = FigureSpec {
                title: figure_title(var, plot_date),
                colormap: colormap.clone(),
                vmin,
                vmax,
                cell_size: render.cell_size,
            };

            match render_one(ds, var, idx, &name, &spec, store, render) {
                Ok(size) => {
                    info!(leadtime, size, "Saved {}", store.location(&name));
                    counter!("artifacts_written_total").increment(1);
                    summary.written += 1;
                }
                Err(e) => {
                    error!(artifact = %name, leadtime, error = %e, "Failed to produce figure");
                    counter!("artifact_render_failures_total").increment(1);
                    summary.failed += 1;
                }
            }
        }
    }

    info!(
        written = summary.written,
        skipped = summary.skipped,
        failed = summary.failed,
        "Forecast figures done"
    );

    if summary.failed > 0 {
        return Err(ProcessingError::RenderBatch {
            failed: summary.failed,
            total: summary.total(),
        });
    }

    Ok(summary)
}

fn render_one(
    ds: &ForecastDataset,
    var: SicVariable,
    leadtime_index: usize,
    name: &str,
    spec: &FigureSpec,
    store: &dyn ArtifactStore,
    render: &RenderSettings,
) -> Result<usize> {
    let slice = ds.slice(var, leadtime_index);
    let (ny, nx) = slice.dim();
    let data: Vec<f32> = slice.iter().copied().collect();

    let png = render_figure(&data, nx, ny, spec, render.font.as_deref()).map_err(|e| {
        ProcessingError::Render {
            artifact: name.to_string(),
            message: e.to_string(),
        }
    })?;

    let size = png.len();
    store.put(name, Bytes::from(png))?;
    Ok(size)
}

pub fn output_forecast(ds: &ForecastDataset, ctx: &ProcessContext<'_>) -> Result<Option<Value>> {
    let store = ctx
        .artifacts
        .ok_or_else(|| ConfigError::MissingOption("output_directory".to_string()))?;

    render_forecast(ds, store, ctx.render)?;
    Ok(None)
}
