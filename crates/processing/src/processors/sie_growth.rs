use std::collections::BTreeMap;

use forecast_common::{ForecastDataset, SicVariable};
use serde_json::Value;

use super::ProcessContext;
use crate::aggregate::{count_above, extent, per_leadtime};
use crate::config::ProcessorOptions;
use crate::error::Result;

/// Sea-ice extent per leadtime: cells with mean concentration strictly
/// above the threshold, times the area of one cell.
pub fn sie_growth(ds: &ForecastDataset, options: &ProcessorOptions) -> BTreeMap<u32, f64> {
    per_leadtime(ds, SicVariable::Mean, |slice| {
        extent(count_above(slice, options.threshold), options.grid_area_size)
    })
}

pub fn output_sie_growth(ds: &ForecastDataset, ctx: &ProcessContext<'_>) -> Result<Option<Value>> {
    ctx.options.validate()?;
    Ok(Some(serde_json::to_value(sie_growth(ds, &ctx.options))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSettings;
    use crate::error::{ConfigError, ProcessingError};
    use serde_json::json;
    use test_utils::{constant_dataset, two_by_two_dataset};

    #[test]
    fn test_two_by_two_extents() {
        let ds = two_by_two_dataset();
        let series = sie_growth(&ds, &ProcessorOptions::default());
        assert_eq!(series[&0], 1250.0);
        assert_eq!(series[&1], 625.0);
    }

    #[test]
    fn test_all_zero_grid_has_zero_extent() {
        let ds = constant_dataset(&[0, 1, 2], 4, 4, 0.0, 0.0);
        let series = sie_growth(&ds, &ProcessorOptions::default());
        assert!(series.values().all(|&v| v == 0.0));
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_json_keys_are_leadtimes() {
        let ds = two_by_two_dataset();
        let render = RenderSettings::default();
        let ctx = ProcessContext {
            options: ProcessorOptions::default(),
            artifacts: None,
            render: &render,
        };
        let value = output_sie_growth(&ds, &ctx).unwrap().unwrap();
        assert_eq!(value, json!({"0": 1250.0, "1": 625.0}));
    }

    #[test]
    fn test_rejects_non_positive_area() {
        let ds = two_by_two_dataset();
        let render = RenderSettings::default();
        let ctx = ProcessContext {
            options: ProcessorOptions {
                grid_area_size: 0.0,
                threshold: 0.15,
            },
            artifacts: None,
            render: &render,
        };
        let err = output_sie_growth(&ds, &ctx).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::Config(ConfigError::InvalidValue { .. })
        ));
    }
}
