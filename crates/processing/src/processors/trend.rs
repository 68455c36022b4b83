use std::collections::BTreeMap;

use forecast_common::{ForecastDataset, SicVariable};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProcessContext;
use crate::aggregate::{mean_ignoring_zero, per_leadtime};
use crate::error::Result;

/// Spatial means per leadtime; `None` where a slice has no usable cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub mean: BTreeMap<u32, Option<f64>>,
    pub stddev: BTreeMap<u32, Option<f64>>,
}

/// Mean concentration and mean uncertainty over each leadtime slice.
///
/// Cells that are exactly zero count as missing, which also drops genuine
/// open water; see DESIGN.md.
pub fn trend(ds: &ForecastDataset) -> TrendSeries {
    TrendSeries {
        mean: per_leadtime(ds, SicVariable::Mean, mean_ignoring_zero),
        stddev: per_leadtime(ds, SicVariable::Stddev, mean_ignoring_zero),
    }
}

pub fn output_trend(ds: &ForecastDataset, _ctx: &ProcessContext<'_>) -> Result<Option<Value>> {
    Ok(Some(serde_json::to_value(trend(ds))?))
}
