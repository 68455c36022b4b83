//! Processing of a single forecast file.
//!
//! Loads the file, runs the configured processors and writes each JSON
//! result next to the other outputs as `<processor>.<YYYYMMDD>.json`.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use forecast_common::ForecastDataset;
use metrics::counter;
use processing::{result_name, DispatchReport, Dispatcher, RenderSettings};
use serde::Serialize;
use storage::{ArtifactStore, LocalArtifactStore};
use tracing::{error, info, instrument};

use crate::config::ServiceConfig;
use crate::events::BlobRef;

/// Outcome of processing one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    #[serde(flatten)]
    pub dispatch: DispatchReport,
    /// Result documents written to the results store.
    pub results_written: Vec<String>,
    /// Result documents that could not be written.
    pub results_failed: Vec<String>,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        self.dispatch.is_success() && self.results_failed.is_empty()
    }
}

pub struct Pipeline {
    dispatcher: Dispatcher,
    input_directory: Option<PathBuf>,
    results: Option<Arc<dyn ArtifactStore>>,
}

impl Pipeline {
    pub fn new(
        dispatcher: Dispatcher,
        input_directory: Option<PathBuf>,
        results: Option<Arc<dyn ArtifactStore>>,
    ) -> Self {
        Self {
            dispatcher,
            input_directory,
            results,
        }
    }

    /// Build stores, render settings and the dispatcher from configuration.
    ///
    /// Fails if the processor plan is invalid or an output directory cannot
    /// be created, so a bad deployment is caught at startup.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let artifacts: Option<Arc<dyn ArtifactStore>> = match &config.output_directory {
            Some(dir) => Some(Arc::new(LocalArtifactStore::new(dir).with_context(|| {
                format!("Failed to open output directory {}", dir.display())
            })?)),
            None => None,
        };

        let results: Option<Arc<dyn ArtifactStore>> = match config.results_directory() {
            Some(dir) => Some(Arc::new(LocalArtifactStore::new(&dir).with_context(|| {
                format!("Failed to open results directory {}", dir.display())
            })?)),
            None => None,
        };

        let render = RenderSettings::new(config.render.cell_size, config.font_path.as_deref())?;
        let dispatcher = Dispatcher::from_config(&config.outputs, artifacts, render)
            .context("Invalid outputs configuration")?;

        info!(
            processors = ?dispatcher.plan().iter().map(|p| p.kind.name()).collect::<Vec<_>>(),
            output_directory = ?config.output_directory,
            results_directory = ?config.results_directory(),
            "Pipeline configured"
        );

        Ok(Self::new(dispatcher, config.input_directory.clone(), results))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Local path of a blob named by a storage event.
    ///
    /// Names are resolved under `input_directory` and may not escape it.
    pub fn resolve_blob(&self, blob: &BlobRef) -> Result<PathBuf> {
        let Some(input_directory) = &self.input_directory else {
            bail!("input_directory is not configured, cannot resolve {}", blob.name);
        };

        let relative = Path::new(&blob.name);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            bail!("Refusing blob name outside the input directory: {}", blob.name);
        }

        Ok(input_directory.join(relative))
    }

    /// Load a forecast file and process it.
    ///
    /// Failing to load the file is an error; processor failures are
    /// reported in the returned [`FileReport`].
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn process_file(&self, path: &Path) -> Result<FileReport> {
        let dataset = netcdf_parser::load_forecast_dataset(path).map_err(|e| {
            counter!("forecast_files_total", "outcome" => "unreadable").increment(1);
            anyhow::Error::new(e).context(format!("Failed to load {}", path.display()))
        })?;

        Ok(self.process_dataset(&dataset))
    }

    /// Run every processor over a loaded dataset and persist the results.
    pub fn process_dataset(&self, dataset: &ForecastDataset) -> FileReport {
        let dispatch = self.dispatcher.run(dataset);
        let base_date = dataset.base_time().date_naive();

        let mut results_written = Vec::new();
        let mut results_failed = Vec::new();

        if let Some(store) = &self.results {
            for (kind, value) in dispatch.results() {
                let name = result_name(kind, base_date);
                let written = serde_json::to_vec_pretty(value)
                    .map_err(anyhow::Error::from)
                    .and_then(|body| Ok(store.put(&name, Bytes::from(body))?));

                match written {
                    Ok(()) => {
                        info!(location = %store.location(&name), "Saved {}", name);
                        results_written.push(name);
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to save {}", name);
                        results_failed.push(name);
                    }
                }
            }
        }

        let report = FileReport {
            dispatch,
            results_written,
            results_failed,
        };

        let outcome = if report.is_success() { "success" } else { "failure" };
        counter!("forecast_files_total", "outcome" => outcome).increment(1);

        report
    }
}
