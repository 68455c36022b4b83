//! Numeric aggregation rules shared by the processors.
//!
//! - Threshold classification is strict (`value > threshold`) and done in
//!   the precision of the stored data, so a cell stored as exactly the
//!   threshold is not ice. NaN cells are never ice.
//! - Extent is `count * grid_area_size^2`.
//! - Spatial means skip cells that are exactly zero or NaN; a slice with no
//!   remaining cells has no mean (`None`), not a mean of zero.
//! - Colour scales start at 0. The mean tops out at 1; stddev at the largest
//!   value anywhere in its array.

use std::collections::BTreeMap;

use forecast_common::{ForecastDataset, SicVariable};
use ndarray::{ArrayView2, ArrayView3};
use rayon::prelude::*;

/// Fixed upper colour bound for the concentration mean.
pub const MEAN_VMAX: f32 = 1.0;

/// Number of cells strictly above `threshold`.
pub fn count_above(slice: ArrayView2<'_, f32>, threshold: f64) -> usize {
    let threshold = threshold as f32;
    slice.iter().filter(|&&v| v > threshold).count()
}

/// Area covered by `count` cells of side `grid_area_size`.
pub fn extent(count: usize, grid_area_size: f64) -> f64 {
    count as f64 * grid_area_size * grid_area_size
}

/// Mean over cells that are neither exactly zero nor NaN.
pub fn mean_ignoring_zero(slice: ArrayView2<'_, f32>) -> Option<f64> {
    let (sum, count) = slice
        .iter()
        .filter(|v| **v != 0.0 && !v.is_nan())
        .fold((0.0f64, 0usize), |(sum, count), &v| (sum + v as f64, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Largest non-NaN value, if any.
pub fn nan_max(array: ArrayView3<'_, f32>) -> Option<f32> {
    array
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |max, v| match max {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}

/// `(vmin, vmax)` for a quantity's colour scale.
///
/// An all-missing stddev array yields a NaN upper bound, which the renderer
/// treats as a unit range.
pub fn colour_bounds(ds: &ForecastDataset, var: SicVariable) -> (f32, f32) {
    match var {
        SicVariable::Mean => (0.0, MEAN_VMAX),
        SicVariable::Stddev => (0.0, nan_max(ds.array(var)).unwrap_or(f32::NAN)),
    }
}

/// Apply `f` to every leadtime slice of `var` in parallel, keyed by leadtime.
pub fn per_leadtime<T, F>(ds: &ForecastDataset, var: SicVariable, f: F) -> BTreeMap<u32, T>
where
    T: Send,
    F: Fn(ArrayView2<'_, f32>) -> T + Sync,
{
    let values: Vec<T> = (0..ds.leadtimes().len())
        .into_par_iter()
        .map(|idx| f(ds.slice(var, idx)))
        .collect();

    ds.leadtimes().iter().copied().zip(values).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};
    use test_utils::{assert_approx_eq, two_by_two_dataset};

    #[test]
    fn test_count_above_is_strict() {
        let slice = array![[0.2f32, 0.15], [0.0, 0.3]];
        assert_eq!(count_above(slice.view(), 0.15), 2);
        assert_eq!(count_above(slice.view(), 0.1), 3);
        assert_eq!(count_above(slice.view(), 0.3), 0);
    }

    #[test]
    fn test_count_above_ignores_nan() {
        let slice = array![[f32::NAN, 0.9]];
        assert_eq!(count_above(slice.view(), 0.15), 1);
    }

    #[test]
    fn test_extent() {
        assert_eq!(extent(2, 25.0), 1250.0);
        assert_eq!(extent(0, 25.0), 0.0);
        assert_eq!(extent(3, 0.5), 0.75);
    }

    #[test]
    fn test_mean_ignoring_zero() {
        let slice = array![[0.2f32, 0.1], [0.0, 0.3]];
        assert_approx_eq!(mean_ignoring_zero(slice.view()).unwrap(), 0.2, 1e-6);
    }

    #[test]
    fn test_mean_all_zero_is_missing() {
        let slice = array![[0.0f32, 0.0], [0.0, 0.0]];
        assert_eq!(mean_ignoring_zero(slice.view()), None);
    }

    #[test]
    fn test_mean_skips_nan() {
        let slice = array![[f32::NAN, 0.4], [0.0, 0.2]];
        assert_approx_eq!(mean_ignoring_zero(slice.view()).unwrap(), 0.3, 1e-6);

        let all_nan = array![[f32::NAN]];
        assert_eq!(mean_ignoring_zero(all_nan.view()), None);
    }

    #[test]
    fn test_nan_max() {
        let data = Array3::from_shape_vec((1, 1, 3), vec![0.1f32, f32::NAN, 0.4]).unwrap();
        assert_eq!(nan_max(data.view()), Some(0.4));

        let empty = Array3::<f32>::from_elem((1, 1, 2), f32::NAN);
        assert_eq!(nan_max(empty.view()), None);
    }

    #[test]
    fn test_colour_bounds() {
        let ds = two_by_two_dataset();
        assert_eq!(colour_bounds(&ds, SicVariable::Mean), (0.0, 1.0));
        assert_eq!(colour_bounds(&ds, SicVariable::Stddev), (0.0, 0.3));
    }

    #[test]
    fn test_per_leadtime_keeps_leadtime_keys() {
        let ds = two_by_two_dataset();
        let counts = per_leadtime(&ds, SicVariable::Mean, |s| count_above(s, 0.15));
        assert_eq!(counts.into_iter().collect::<Vec<_>>(), vec![(0, 2), (1, 1)]);
    }
}
