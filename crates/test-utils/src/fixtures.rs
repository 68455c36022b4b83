//! Fixed forecast scenarios with hand-checked expected outputs.

use chrono::{DateTime, TimeZone, Utc};
use forecast_common::{Attributes, ForecastDataset};
use ndarray::array;

/// Issue time used by all generated datasets: 2023-07-24T00:00:00Z.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 7, 24, 0, 0, 0)
        .single()
        .expect("valid fixture date")
}

/// Two leadtimes over a 2x2 grid.
///
/// | leadtime | sic_mean              | sic_stddev            |
/// |----------|-----------------------|-----------------------|
/// | 0        | `[[0.2,0.1],[0,0.3]]` | `[[0.1,0],[0,0.3]]`   |
/// | 1        | `[[0.5,0],[0,0.15]]`  | all zero              |
///
/// With threshold 0.15 and grid cell size 25 the extents are 1250 and 625;
/// the trend means are 0.2 and 0.325, the stddev trend is 0.2 then missing.
pub fn two_by_two_dataset() -> ForecastDataset {
    let sic_mean = array![
        [[0.2f32, 0.1], [0.0, 0.3]],
        [[0.5, 0.0], [0.0, 0.15]],
    ];
    let sic_stddev = array![
        [[0.1f32, 0.0], [0.0, 0.3]],
        [[0.0, 0.0], [0.0, 0.0]],
    ];

    let mut attributes = Attributes::new();
    attributes.insert("title".into(), "Sea Ice Concentration Prediction".into());
    attributes.insert("icenet_version".into(), "0.2.7".into());

    ForecastDataset::new(base_time(), vec![0, 1], sic_mean, sic_stddev, attributes)
        .expect("fixture dataset should be valid")
}
