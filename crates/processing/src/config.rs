//! Typed processor configuration.
//!
//! The `outputs` section of the service configuration is an ordered mapping
//! of processor name to options:
//!
//! ```yaml
//! outputs:
//!   output_metadata: {}
//!   output_forecast: {}
//!   output_sie_growth: { grid_area_size: 25, threshold: 0.15 }
//!   output_trend:
//! ```
//!
//! It is validated once into a list of [`ProcessorConfig`]s; processors never
//! look options up themselves.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use rusttype::Font;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Linear size of one grid cell; extent is `count * size^2`.
pub const DEFAULT_GRID_AREA_SIZE: f64 = 25.0;

/// Concentration above which a cell counts as ice.
pub const DEFAULT_THRESHOLD: f64 = 0.15;

/// Default pixels per grid cell in rendered figures.
pub const DEFAULT_CELL_SIZE: u32 = 2;

/// The available output processors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessorKind {
    #[serde(rename = "output_metadata")]
    Metadata,
    #[serde(rename = "output_forecast")]
    Forecast,
    #[serde(rename = "output_sie_growth")]
    SieGrowth,
    #[serde(rename = "output_trend")]
    Trend,
}

impl ProcessorKind {
    pub const ALL: [ProcessorKind; 4] = [
        ProcessorKind::Metadata,
        ProcessorKind::Forecast,
        ProcessorKind::SieGrowth,
        ProcessorKind::Trend,
    ];

    /// Name used in configuration, logs and result artifact names.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Metadata => "output_metadata",
            Self::Forecast => "output_forecast",
            Self::SieGrowth => "output_sie_growth",
            Self::Trend => "output_trend",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether the processor writes artifacts and so needs a store.
    pub fn needs_artifact_store(&self) -> bool {
        matches!(self, Self::Forecast)
    }
}

impl fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProcessorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ConfigError::UnknownProcessor(s.to_string()))
    }
}

/// Options recognised by the processors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorOptions {
    /// Linear size of one grid cell, in the unit extent is reported in.
    pub grid_area_size: f64,
    /// Concentration cutoff; cells strictly above it count as ice.
    pub threshold: f64,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            grid_area_size: DEFAULT_GRID_AREA_SIZE,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ProcessorOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.grid_area_size.is_finite() || self.grid_area_size <= 0.0 {
            return Err(ConfigError::InvalidValue {
                option: "grid_area_size".to_string(),
                message: format!("must be a positive number, got {}", self.grid_area_size),
            });
        }
        if !self.threshold.is_finite() {
            return Err(ConfigError::InvalidValue {
                option: "threshold".to_string(),
                message: format!("must be a finite number, got {}", self.threshold),
            });
        }
        Ok(())
    }
}

/// One validated entry of the processing plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorConfig {
    pub kind: ProcessorKind,
    pub options: ProcessorOptions,
}

impl ProcessorConfig {
    pub fn new(kind: ProcessorKind) -> Self {
        Self {
            kind,
            options: ProcessorOptions::default(),
        }
    }

    pub fn with_options(kind: ProcessorKind, options: ProcessorOptions) -> Self {
        Self { kind, options }
    }
}

/// Raw, ordered `outputs` mapping as read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputConfig(serde_yaml::Mapping);

impl OutputConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Every processor with default options, in their canonical order.
    pub fn all() -> Self {
        let mut mapping = serde_yaml::Mapping::new();
        for kind in ProcessorKind::ALL {
            mapping.insert(kind.name().into(), serde_yaml::Value::Null);
        }
        Self(mapping)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse every entry into a typed [`ProcessorConfig`], keeping order.
    ///
    /// Unknown processor names, unknown option keys and out-of-range values
    /// are rejected here so that nothing runs on a bad configuration.
    pub fn validate(&self) -> Result<Vec<ProcessorConfig>, ConfigError> {
        self.0
            .iter()
            .map(|(key, value)| {
                let name = key.as_str().ok_or_else(|| {
                    ConfigError::Parse(format!("processor names must be strings, got {:?}", key))
                })?;
                let kind = ProcessorKind::from_str(name)?;

                let options = if value.is_null() {
                    ProcessorOptions::default()
                } else {
                    serde_yaml::from_value::<ProcessorOptions>(value.clone()).map_err(|e| {
                        ConfigError::InvalidValue {
                            option: name.to_string(),
                            message: e.to_string(),
                        }
                    })?
                };

                options.validate().map_err(|e| match e {
                    ConfigError::InvalidValue { option, message } => ConfigError::InvalidValue {
                        option: format!("{}.{}", name, option),
                        message,
                    },
                    other => other,
                })?;

                Ok(ProcessorConfig { kind, options })
            })
            .collect()
    }
}

/// Settings shared by every rendered figure.
#[derive(Clone)]
pub struct RenderSettings {
    /// Pixels per grid cell along each axis.
    pub cell_size: u32,
    /// Font for titles and tick labels. Defaults to the bundled font.
    pub font: Option<Arc<Font<'static>>>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            font: renderer::text::resolve_font(None).map(Arc::new),
        }
    }
}

impl fmt::Debug for RenderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSettings")
            .field("cell_size", &self.cell_size)
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl RenderSettings {
    /// Build settings, loading the font if a path is given.
    ///
    /// An unreadable font is logged and the bundled font used instead.
    pub fn new(cell_size: u32, font_path: Option<&Path>) -> Result<Self, ConfigError> {
        if cell_size == 0 {
            return Err(ConfigError::InvalidValue {
                option: "render.cell_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            cell_size,
            font: renderer::text::resolve_font(font_path).map(Arc::new),
        })
    }
}
