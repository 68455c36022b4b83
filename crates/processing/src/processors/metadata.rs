use forecast_common::{Attributes, ForecastDataset};
use serde_json::Value;

use super::ProcessContext;
use crate::error::Result;

/// The dataset's descriptive attributes, unchanged.
pub fn metadata(ds: &ForecastDataset) -> Attributes {
    ds.attributes().clone()
}

pub fn output_metadata(ds: &ForecastDataset, _ctx: &ProcessContext<'_>) -> Result<Option<Value>> {
    Ok(Some(Value::Object(metadata(ds))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProcessorOptions, RenderSettings};
    use forecast_common::Attributes;
    use serde_json::json;
    use test_utils::{dataset_with_attributes, two_by_two_dataset};

    fn run(ds: &ForecastDataset) -> Value {
        let render = RenderSettings::default();
        let ctx = ProcessContext {
            options: ProcessorOptions::default(),
            artifacts: None,
            render: &render,
        };
        output_metadata(ds, &ctx).unwrap().unwrap()
    }

    #[test]
    fn test_returns_attributes_verbatim() {
        let ds = two_by_two_dataset();
        assert_eq!(
            run(&ds),
            json!({
                "title": "Sea Ice Concentration Prediction",
                "icenet_version": "0.2.7"
            })
        );
    }

    #[test]
    fn test_empty_attributes() {
        let ds = dataset_with_attributes(Attributes::new());
        assert_eq!(run(&ds), json!({}));
    }

    #[test]
    fn test_nested_values_survive() {
        let mut attrs = Attributes::new();
        attrs.insert("geospatial_bounds".into(), json!([-90.0, 90.0]));
        attrs.insert("model_version".into(), json!(3));
        let ds = dataset_with_attributes(attrs.clone());
        assert_eq!(metadata(&ds), attrs);
    }
}
