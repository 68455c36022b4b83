//! Synthetic forecast dataset generators.
//!
//! These create small, predictable datasets so processor outputs can be
//! checked by hand.

use forecast_common::{Attributes, ForecastDataset};
use ndarray::Array3;

use crate::fixtures::base_time;

/// Builds a dataset whose cell values come from closures of
/// `(leadtime_index, y, x)`.
///
/// # Example
///
/// ```
/// use test_utils::dataset_from_fn;
///
/// let ds = dataset_from_fn(&[0, 1], 2, 3, |lt, _, _| lt as f32 * 0.5, |_, _, _| 0.1);
/// assert_eq!(ds.grid_shape(), (2, 3));
/// ```
pub fn dataset_from_fn<M, S>(
    leadtimes: &[u32],
    ny: usize,
    nx: usize,
    mean_fn: M,
    stddev_fn: S,
) -> ForecastDataset
where
    M: Fn(usize, usize, usize) -> f32,
    S: Fn(usize, usize, usize) -> f32,
{
    let shape = (leadtimes.len(), ny, nx);
    let sic_mean = Array3::from_shape_fn(shape, |(lt, y, x)| mean_fn(lt, y, x));
    let sic_stddev = Array3::from_shape_fn(shape, |(lt, y, x)| stddev_fn(lt, y, x));

    ForecastDataset::new(
        base_time(),
        leadtimes.to_vec(),
        sic_mean,
        sic_stddev,
        Attributes::new(),
    )
    .expect("generated dataset should be valid")
}

/// Every cell holds the same mean and stddev.
pub fn constant_dataset(
    leadtimes: &[u32],
    ny: usize,
    nx: usize,
    mean: f32,
    stddev: f32,
) -> ForecastDataset {
    dataset_from_fn(leadtimes, ny, nx, |_, _, _| mean, |_, _, _| stddev)
}

/// Mean rises linearly across the grid from 0 at the first cell to just
/// below 1 at the last; stddev grows with the leadtime index.
///
/// The first cell of every slice is exactly zero.
pub fn ramp_dataset(n_leadtimes: usize, ny: usize, nx: usize) -> ForecastDataset {
    let leadtimes: Vec<u32> = (1..=n_leadtimes as u32).collect();
    let cells = (ny * nx) as f32;
    dataset_from_fn(
        &leadtimes,
        ny,
        nx,
        |_, y, x| (y * nx + x) as f32 / cells,
        |lt, y, x| if y == 0 && x == 0 { 0.0 } else { 0.01 * (lt + 1) as f32 },
    )
}

/// A tiny dataset carrying the given attributes.
pub fn dataset_with_attributes(attributes: Attributes) -> ForecastDataset {
    ForecastDataset::new(
        base_time(),
        vec![0],
        Array3::zeros((1, 1, 1)),
        Array3::zeros((1, 1, 1)),
        attributes,
    )
    .expect("generated dataset should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_common::SicVariable;

    #[test]
    fn test_dataset_from_fn_values() {
        let ds = dataset_from_fn(&[0, 3], 2, 2, |lt, y, x| (lt * 100 + y * 10 + x) as f32, |_, _, _| 0.0);
        assert_eq!(ds.slice(SicVariable::Mean, 1)[[1, 0]], 110.0);
        assert_eq!(ds.leadtimes(), &[0, 3]);
    }

    #[test]
    fn test_ramp_dataset_first_cell_zero() {
        let ds = ramp_dataset(3, 4, 4);
        assert_eq!(ds.leadtimes(), &[1, 2, 3]);
        for lt in 0..3 {
            assert_eq!(ds.slice(SicVariable::Mean, lt)[[0, 0]], 0.0);
            assert_eq!(ds.slice(SicVariable::Stddev, lt)[[0, 0]], 0.0);
        }
    }

    #[test]
    fn test_constant_dataset() {
        let ds = constant_dataset(&[0], 3, 3, 0.4, 0.1);
        assert!(ds.array(SicVariable::Mean).iter().all(|&v| v == 0.4));
    }
}
