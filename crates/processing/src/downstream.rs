//! Cross-cutting wrapper applied to every processor.

use std::time::Instant;

use forecast_common::ForecastDataset;
use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{error, info, info_span};

use crate::config::ProcessorKind;
use crate::error::{ProcessingError, Result};
use crate::processors::{ProcessContext, ProcessorFn};

/// Wrap a processor with logging, timing, metrics and error normalisation.
///
/// The returned function behaves like `f`, except that it runs inside a
/// `processor` span and any error comes back as
/// [`ProcessingError::Processor`] naming the processor.
pub fn downstream_process(
    kind: ProcessorKind,
    f: ProcessorFn,
) -> impl Fn(&ForecastDataset, &ProcessContext<'_>) -> Result<Option<Value>> {
    move |ds, ctx| {
        let name = kind.name();
        let span = info_span!("processor", processor = name);
        let _enter = span.enter();

        info!("Called {}", name);
        let start = Instant::now();
        let result = f(ds, ctx);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        histogram!("processor_duration_ms", "processor" => name).record(elapsed_ms);

        match result {
            Ok(value) => {
                counter!("processor_runs_total", "processor" => name, "outcome" => "success")
                    .increment(1);
                info!(elapsed_ms, has_result = value.is_some(), "Finished {}", name);
                Ok(value)
            }
            Err(e) => {
                counter!("processor_runs_total", "processor" => name, "outcome" => "failure")
                    .increment(1);
                error!(elapsed_ms, error = %e, "{} failed", name);
                Err(ProcessingError::Processor {
                    name: name.to_string(),
                    source: Box::new(e),
                })
            }
        }
    }
}
