//! Configuration loader for the event processor.
//!
//! ```yaml
//! output_directory: /data/outputs
//! input_directory: /data/forecasts
//! results_directory: ${RESULTS_DIR:-/data/outputs/results}
//! font_path: /usr/share/fonts/truetype/dejavu/DejaVuSans.ttf
//! server:
//!   port: 7071
//! render:
//!   cell_size: 2
//! outputs:
//!   output_metadata: {}
//!   output_forecast: {}
//!   output_sie_growth: { grid_area_size: 25, threshold: 0.15 }
//!   output_trend: {}
//! ```
//!
//! Supports environment variable substitution using `${VAR}` and
//! `${VAR:-default}` syntax.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use processing::{ConfigError, OutputConfig};
use serde::Deserialize;

/// Default HTTP port, matching the Functions host convention.
pub const DEFAULT_PORT: u16 = 7071;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Where forecast figures are written. Required for `output_forecast`.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
    /// Directory blob names from storage events are resolved against.
    #[serde(default)]
    pub input_directory: Option<PathBuf>,
    /// Where JSON processor results are written.
    #[serde(default)]
    pub results_directory: Option<PathBuf>,
    /// TrueType font for figure text, replacing the bundled one.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub render: RenderConfig,
    /// Processors to run, in order. Defaults to all of them.
    #[serde(default = "OutputConfig::all")]
    pub outputs: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
        }
    }
}

fn default_cell_size() -> u32 {
    processing::config::DEFAULT_CELL_SIZE
}

impl ServiceConfig {
    /// Load, substitute environment variables and parse a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content)?;
        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Results directory, falling back to `<output_directory>/results`.
    pub fn results_directory(&self) -> Option<PathBuf> {
        self.results_directory
            .clone()
            .or_else(|| self.output_directory.as_ref().map(|dir| dir.join("results")))
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references.
///
/// A referenced variable without a default that is not set is an error.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => {
                        return Err(ConfigError::Parse(format!(
                            "Unclosed variable substitution: ${{{}",
                            var_expr
                        )))
                    }
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String, ConfigError> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).map_err(|_| ConfigError::EnvVar(expr.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use processing::ProcessorKind;

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("EVENT_PROCESSOR_TEST_DIR", "/data/out");
        let result = expand_env_vars("output_directory: ${EVENT_PROCESSOR_TEST_DIR}/png").unwrap();
        assert_eq!(result, "output_directory: /data/out/png");
    }

    #[test]
    fn test_expand_env_vars_default() {
        let result = expand_env_vars("a: ${EVENT_PROCESSOR_UNSET_VAR:-fallback}").unwrap();
        assert_eq!(result, "a: fallback");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let err = expand_env_vars("a: ${EVENT_PROCESSOR_REQUIRED_VAR}").unwrap_err();
        assert_eq!(err, ConfigError::EnvVar("EVENT_PROCESSOR_REQUIRED_VAR".into()));
    }

    #[test]
    fn test_expand_env_vars_unclosed() {
        assert!(matches!(expand_env_vars("a: ${OOPS"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_plain_dollar_untouched() {
        assert_eq!(expand_env_vars("cost: $5").unwrap(), "cost: $5");
    }

    #[test]
    fn test_full_config() {
        let config = ServiceConfig::from_yaml_str(
            r#"
output_directory: /data/outputs
input_directory: /data/forecasts
font_path: /fonts/DejaVuSans.ttf
server:
  port: 8080
render:
  cell_size: 3
outputs:
  output_sie_growth: { threshold: 0.3 }
  output_forecast: {}
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.render.cell_size, 3);
        assert_eq!(
            config.results_directory(),
            Some(PathBuf::from("/data/outputs/results"))
        );

        let plan = config.outputs.validate().unwrap();
        assert_eq!(plan[0].kind, ProcessorKind::SieGrowth);
        assert_eq!(plan[0].options.threshold, 0.3);
        assert_eq!(plan[1].kind, ProcessorKind::Forecast);
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_yaml_str("output_directory: /tmp/out").unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.render.cell_size, 2);
        assert_eq!(config.outputs.validate().unwrap().len(), 4);
    }

    #[test]
    fn test_explicit_results_directory() {
        let config = ServiceConfig::from_yaml_str("results_directory: /r").unwrap();
        assert_eq!(config.results_directory(), Some(PathBuf::from("/r")));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(ServiceConfig::from_yaml_str("output_dir: /tmp").is_err());
    }
}
