//! Deterministic names for output artifacts.
//!
//! Every figure is keyed by quantity and the calendar day it predicts, so a
//! re-run for the same forecast maps onto exactly the same names and can
//! skip whatever already exists.

use chrono::NaiveDate;
use forecast_common::{artifact_date, title_date, SicVariable};

use crate::config::ProcessorKind;

/// Figure name, e.g. `sic_mean.20230725.png`.
pub fn artifact_name(var: SicVariable, plot_date: NaiveDate) -> String {
    format!("{}.{}.png", var.name(), artifact_date(plot_date))
}

/// Figure title, e.g. `sic_mean - 2023/07/25`.
pub fn figure_title(var: SicVariable, plot_date: NaiveDate) -> String {
    format!("{} - {}", var.name(), title_date(plot_date))
}

/// Name of a persisted processor result, e.g. `output_trend.20230724.json`.
pub fn result_name(kind: ProcessorKind, base_date: NaiveDate) -> String {
    format!("{}.{}.json", kind.name(), artifact_date(base_date))
}
