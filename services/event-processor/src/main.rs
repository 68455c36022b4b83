//! Sea-ice forecast event processor.
//!
//! Listens for storage events announcing new forecast files and runs the
//! configured output processors over each one. `process` runs the same
//! pipeline once over a local file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use event_processor::config::ServiceConfig;
use event_processor::logging::{self, LogFormat};
use event_processor::pipeline::Pipeline;
use event_processor::server::{start_server, ServerState};

#[derive(Parser, Debug)]
#[command(name = "event-processor")]
#[command(about = "Output processing for sea-ice forecasts")]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        env = "FORECAST_PROCESSING_CONFIG",
        default_value = "/etc/event-processor/config.yaml"
    )]
    config: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the event trigger over HTTP (default)
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Process a single local forecast file and exit
    Process {
        /// NetCDF forecast file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    logging::init(&args.log_level, args.log_format)?;

    let config = ServiceConfig::load(&args.config)?;
    info!(config = %args.config.display(), "Loaded configuration");

    let pipeline = Pipeline::from_config(&config)?;

    match args.command.unwrap_or(Command::Serve { port: None }) {
        Command::Process { file } => process_once(&pipeline, file),
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(serve(pipeline, port))
        }
    }
}

fn process_once(pipeline: &Pipeline, file: PathBuf) -> Result<()> {
    let report = pipeline.process_file(&file)?;

    for outcome in &report.dispatch.outcomes {
        match &outcome.error {
            None => info!(
                processor = outcome.processor.name(),
                elapsed_ms = outcome.elapsed_ms,
                "Processor succeeded"
            ),
            Some(e) => error!(processor = outcome.processor.name(), error = %e, "Processor failed"),
        }
    }

    if !report.is_success() {
        bail!(
            "{} processor(s) and {} result write(s) failed for {}",
            report.dispatch.failures().count(),
            report.results_failed.len(),
            file.display()
        );
    }

    info!(results = ?report.results_written, "Processing complete");
    Ok(())
}

async fn serve(pipeline: Pipeline, port: u16) -> Result<()> {
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()?;
    info!("Prometheus metrics exporter initialized");

    let state = Arc::new(ServerState::new(pipeline, Some(prometheus_handle)));
    start_server(state, port).await
}
