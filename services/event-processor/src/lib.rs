//! Event-triggered output processing for sea-ice forecasts.
//!
//! Receives storage notifications for newly written forecast files, loads
//! each file and runs the configured output processors over it:
//!
//! - [`config`]: YAML configuration with `${VAR}` substitution
//! - [`events`]: Event Grid notification parsing
//! - [`pipeline`]: load, dispatch and persist results for one file
//! - [`server`]: HTTP trigger, status and metrics endpoints

pub mod config;
pub mod events;
pub mod logging;
pub mod pipeline;
pub mod server;
