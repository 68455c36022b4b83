//! Runs the configured processors over one dataset.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use forecast_common::ForecastDataset;
use serde::Serialize;
use serde_json::Value;
use storage::ArtifactStore;
use tracing::{info, warn};

use crate::config::{OutputConfig, ProcessorConfig, ProcessorKind, RenderSettings};
use crate::downstream::downstream_process;
use crate::error::ConfigError;
use crate::processors::{processor_for, ProcessContext};

/// Outcome of a single processor.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessorOutcome {
    pub processor: ProcessorKind,
    /// Result payload; `None` for side-effect-only processors and failures.
    pub result: Option<Value>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl ProcessorOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of every configured processor, in run order.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub base_time: DateTime<Utc>,
    pub outcomes: Vec<ProcessorOutcome>,
}

impl DispatchReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ProcessorOutcome::succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProcessorOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// Processors that produced a result payload.
    pub fn results(&self) -> impl Iterator<Item = (ProcessorKind, &Value)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().map(|v| (o.processor, v)))
    }

    pub fn outcome(&self, kind: ProcessorKind) -> Option<&ProcessorOutcome> {
        self.outcomes.iter().find(|o| o.processor == kind)
    }
}

/// Ordered processing plan plus the shared context handed to processors.
pub struct Dispatcher {
    plan: Vec<ProcessorConfig>,
    artifacts: Option<Arc<dyn ArtifactStore>>,
    render: RenderSettings,
}

impl Dispatcher {
    /// Build a dispatcher, rejecting plans that cannot run.
    ///
    /// A plan with `output_forecast` needs an artifact store; without one
    /// this fails here, before any processor has run.
    pub fn new(
        plan: Vec<ProcessorConfig>,
        artifacts: Option<Arc<dyn ArtifactStore>>,
        render: RenderSettings,
    ) -> Result<Self, ConfigError> {
        for config in &plan {
            config.options.validate()?;
            if config.kind.needs_artifact_store() && artifacts.is_none() {
                return Err(ConfigError::MissingOption("output_directory".to_string()));
            }
        }

        Ok(Self {
            plan,
            artifacts,
            render,
        })
    }

    pub fn from_config(
        config: &OutputConfig,
        artifacts: Option<Arc<dyn ArtifactStore>>,
        render: RenderSettings,
    ) -> Result<Self, ConfigError> {
        Self::new(config.validate()?, artifacts, render)
    }

    pub fn plan(&self) -> &[ProcessorConfig] {
        &self.plan
    }

    /// Run every processor in order.
    ///
    /// A failing processor is recorded and the remaining processors still
    /// run; they share nothing but the read-only dataset.
    pub fn run(&self, ds: &ForecastDataset) -> DispatchReport {
        info!(
            base_time = %ds.base_time(),
            leadtimes = ds.leadtimes().len(),
            processors = self.plan.len(),
            "Dispatching output processors"
        );

        let outcomes = self
            .plan
            .iter()
            .map(|config| {
                let ctx = ProcessContext {
                    options: config.options,
                    artifacts: self.artifacts.as_deref(),
                    render: &self.render,
                };
                let wrapped = downstream_process(config.kind, processor_for(config.kind));

                let start = Instant::now();
                let result = wrapped(ds, &ctx);
                let elapsed_ms = start.elapsed().as_millis() as u64;

                match result {
                    Ok(result) => ProcessorOutcome {
                        processor: config.kind,
                        result,
                        error: None,
                        elapsed_ms,
                    },
                    Err(e) => ProcessorOutcome {
                        processor: config.kind,
                        result: None,
                        error: Some(e.to_string()),
                        elapsed_ms,
                    },
                }
            })
            .collect::<Vec<_>>();

        let report = DispatchReport {
            base_time: ds.base_time(),
            outcomes,
        };

        if !report.is_success() {
            warn!(
                failed = report.failures().count(),
                "Some output processors failed"
            );
        }

        report
    }
}
