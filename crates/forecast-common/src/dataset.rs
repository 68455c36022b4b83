//! In-memory view of a gridded sea-ice forecast.
//!
//! A [`ForecastDataset`] holds the two predicted quantities over
//! `[leadtime, yc, xc]` for a single forecast issue time. It is built once
//! by the dataset accessor and then only read, so it can be shared between
//! processors (and threads) by reference.

use chrono::{DateTime, NaiveDate, Utc};
use ndarray::{Array3, ArrayView2, ArrayView3, Axis};
use serde_json::{Map, Value};

use crate::error::{ForecastError, ForecastResult};
use crate::time::plot_date;

/// Dataset-scope descriptive metadata (provenance, model version, ...).
pub type Attributes = Map<String, Value>;

/// The predicted quantities carried by a forecast dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SicVariable {
    /// Fractional sea-ice concentration, conceptually in `[0, 1]`.
    Mean,
    /// Non-negative uncertainty of the concentration.
    Stddev,
}

impl SicVariable {
    /// Both quantities, in rendering order.
    pub const ALL: [SicVariable; 2] = [SicVariable::Mean, SicVariable::Stddev];

    /// Variable name as stored in the source file.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "sic_mean",
            Self::Stddev => "sic_stddev",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sic_mean" => Some(Self::Mean),
            "sic_stddev" => Some(Self::Stddev),
            _ => None,
        }
    }
}

impl std::fmt::Display for SicVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable forecast grid for one issue time.
#[derive(Debug, Clone)]
pub struct ForecastDataset {
    base_time: DateTime<Utc>,
    leadtimes: Vec<u32>,
    sic_mean: Array3<f32>,
    sic_stddev: Array3<f32>,
    attributes: Attributes,
}

impl ForecastDataset {
    /// Build a dataset, checking that both arrays are `[leadtime, yc, xc]`
    /// with a matching leadtime axis, that leadtimes strictly increase, and
    /// that every leadtime lands on a representable calendar day.
    pub fn new(
        base_time: DateTime<Utc>,
        leadtimes: Vec<u32>,
        sic_mean: Array3<f32>,
        sic_stddev: Array3<f32>,
        attributes: Attributes,
    ) -> ForecastResult<Self> {
        if let Some(pair) = leadtimes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ForecastError::InvalidLeadtime(format!(
                "leadtimes must be strictly increasing, found {} followed by {}",
                pair[0], pair[1]
            )));
        }

        for &leadtime in &leadtimes {
            plot_date(base_time, leadtime)?;
        }

        let (_, ny, nx) = sic_mean.dim();
        let expected = vec![leadtimes.len(), ny, nx];

        for (name, array) in [("sic_mean", &sic_mean), ("sic_stddev", &sic_stddev)] {
            if array.shape() != expected.as_slice() {
                return Err(ForecastError::ShapeMismatch {
                    var: name.to_string(),
                    expected: expected.clone(),
                    actual: array.shape().to_vec(),
                });
            }
        }

        Ok(Self {
            base_time,
            leadtimes,
            sic_mean,
            sic_stddev,
            attributes,
        })
    }

    /// Forecast issue time.
    pub fn base_time(&self) -> DateTime<Utc> {
        self.base_time
    }

    /// Leadtimes in days, in stored order.
    pub fn leadtimes(&self) -> &[u32] {
        &self.leadtimes
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Grid size as `(ny, nx)`.
    pub fn grid_shape(&self) -> (usize, usize) {
        let (_, ny, nx) = self.sic_mean.dim();
        (ny, nx)
    }

    /// Full `[leadtime, yc, xc]` array for a quantity.
    pub fn array(&self, var: SicVariable) -> ArrayView3<'_, f32> {
        match var {
            SicVariable::Mean => self.sic_mean.view(),
            SicVariable::Stddev => self.sic_stddev.view(),
        }
    }

    /// The `[yc, xc]` slice at a leadtime index.
    pub fn slice(&self, var: SicVariable, leadtime_index: usize) -> ArrayView2<'_, f32> {
        self.array(var).index_axis_move(Axis(0), leadtime_index)
    }

    /// Calendar day predicted by the given leadtime.
    pub fn plot_date(&self, leadtime: u32) -> ForecastResult<NaiveDate> {
        plot_date(self.base_time, leadtime)
    }
}
