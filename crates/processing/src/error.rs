//! Error types for the processing crate.

use thiserror::Error;

/// Problems with the processor configuration, detected before any work runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required option: {0}")]
    MissingOption(String),

    #[error("Invalid value for {option}: {message}")]
    InvalidValue { option: String, message: String },

    #[error("Unknown processor: {0}")]
    UnknownProcessor(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Environment variable {0} is not set")]
    EnvVar(String),
}

/// Errors that can occur while running output processors.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unexpected dataset shape: {0}")]
    DataShape(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Failed to render {artifact}: {message}")]
    Render { artifact: String, message: String },

    #[error("{failed} of {total} figures failed to render")]
    RenderBatch { failed: usize, total: usize },

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Processor {name} failed: {source}")]
    Processor {
        name: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Whether the error comes from configuration rather than data or I/O.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Processor { source, .. } => source.is_config(),
            _ => false,
        }
    }
}

impl From<forecast_common::ForecastError> for ProcessingError {
    fn from(e: forecast_common::ForecastError) -> Self {
        Self::DataShape(e.to_string())
    }
}

/// Result type for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;
