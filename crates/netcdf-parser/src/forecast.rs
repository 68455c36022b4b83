//! Reading forecast variables out of an open NetCDF file.

use std::path::Path;

use chrono::{DateTime, Utc};
use forecast_common::{Attributes, CfTimeUnits, ForecastDataset, SicVariable};
use ndarray::{Array3, ArrayD, Axis, Ix3, IxDyn};
use tracing::{debug, info, warn};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{attribute_to_json, get_f64_attr, get_string_attr, silence_hdf5_errors};

const TIME_DIM: &str = "time";
const LEADTIME_DIM: &str = "leadtime";
const Y_DIM: &str = "yc";
const X_DIM: &str = "xc";

/// Open a forecast NetCDF file and load it into memory.
pub fn load_forecast_dataset<P: AsRef<Path>>(path: P) -> NetCdfResult<ForecastDataset> {
    // Silence HDF5's verbose stderr output for missing attributes
    silence_hdf5_errors();

    let path = path.as_ref();
    let file = netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let dataset = read_forecast_dataset(&file)?;

    info!(
        path = %path.display(),
        base_time = %dataset.base_time(),
        leadtimes = dataset.leadtimes().len(),
        grid = ?dataset.grid_shape(),
        "Loaded forecast dataset"
    );

    Ok(dataset)
}

/// Build a [`ForecastDataset`] from an already opened file.
pub fn read_forecast_dataset(file: &netcdf::File) -> NetCdfResult<ForecastDataset> {
    let base_time = read_base_time(file)?;
    let leadtimes = read_leadtimes(file)?;
    let sic_mean = read_sic_variable(file, SicVariable::Mean)?;
    let sic_stddev = read_sic_variable(file, SicVariable::Stddev)?;
    let attributes = read_global_attributes(file);

    Ok(ForecastDataset::new(
        base_time, leadtimes, sic_mean, sic_stddev, attributes,
    )?)
}

/// First value of the `time` coordinate, decoded from its CF units.
fn read_base_time(file: &netcdf::File) -> NetCdfResult<DateTime<Utc>> {
    let time_var = file
        .variable(TIME_DIM)
        .ok_or_else(|| NetCdfError::MissingData("time variable".to_string()))?;

    let units = get_string_attr(&time_var, "units")
        .ok_or_else(|| NetCdfError::MissingData("units attribute on time".to_string()))?;

    let values: Vec<f64> = time_var.get_values(..)?;
    let first = values
        .first()
        .copied()
        .ok_or_else(|| NetCdfError::MissingData("time coordinate is empty".to_string()))?;

    if values.len() > 1 {
        warn!(count = values.len(), "Dataset has several issue times, using the first");
    }

    let units = CfTimeUnits::parse(&units)?;
    Ok(units.to_datetime(first)?)
}

/// Leadtime coordinate as whole days.
fn read_leadtimes(file: &netcdf::File) -> NetCdfResult<Vec<u32>> {
    let var = file
        .variable(LEADTIME_DIM)
        .ok_or_else(|| NetCdfError::MissingData("leadtime variable".to_string()))?;

    let raw: Vec<f64> = var.get_values(..)?;

    raw.into_iter()
        .map(|v| {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
                Ok(v as u32)
            } else {
                Err(NetCdfError::InvalidFormat(format!(
                    "leadtime value {} is not a non-negative whole number of days",
                    v
                )))
            }
        })
        .collect()
}

/// Read a forecast variable and normalise it to `[leadtime, yc, xc]`.
///
/// Fill values become NaN and packing (`scale_factor`, `add_offset`) is
/// undone. When the file holds several issue times only the first is kept.
fn read_sic_variable(file: &netcdf::File, var: SicVariable) -> NetCdfResult<Array3<f32>> {
    let nc_var = file
        .variable(var.name())
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", var.name())))?;

    let dims: Vec<(String, usize)> = nc_var
        .dimensions()
        .iter()
        .map(|d| (d.name(), d.len()))
        .collect();

    let position = |name: &str| dims.iter().position(|(n, _)| n == name);

    if let Some((unknown, _)) = dims
        .iter()
        .find(|(n, _)| ![TIME_DIM, LEADTIME_DIM, Y_DIM, X_DIM].contains(&n.as_str()))
    {
        return Err(NetCdfError::InvalidFormat(format!(
            "{} has unexpected dimension '{}'",
            var.name(),
            unknown
        )));
    }

    let mut axes = Vec::with_capacity(4);
    let time_axis = position(TIME_DIM);
    if let Some(t) = time_axis {
        axes.push(t);
    }
    for name in [LEADTIME_DIM, Y_DIM, X_DIM] {
        let idx = position(name).ok_or_else(|| {
            NetCdfError::MissingData(format!("{} dimension on {}", name, var.name()))
        })?;
        axes.push(idx);
    }

    let raw: Vec<f32> = nc_var.get_values(..)?;

    let fill_value = get_f64_attr(&nc_var, "_FillValue").or_else(|| get_f64_attr(&nc_var, "missing_value"));
    let scale_factor = get_f64_attr(&nc_var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(&nc_var, "add_offset").unwrap_or(0.0);

    debug!(
        var = var.name(),
        dims = ?dims,
        fill_value = ?fill_value,
        scale_factor,
        add_offset,
        "Reading forecast variable"
    );

    let data: Vec<f32> = raw
        .into_iter()
        .map(|v| unpack_value(v, fill_value, scale_factor, add_offset))
        .collect();

    let shape: Vec<usize> = dims.iter().map(|(_, len)| *len).collect();
    let array = ArrayD::from_shape_vec(IxDyn(&shape), data)
        .map_err(forecast_common::ForecastError::from)?
        .permuted_axes(IxDyn(&axes));

    let array = if time_axis.is_some() {
        if array.len_of(Axis(0)) == 0 {
            return Err(NetCdfError::MissingData(format!("{} has an empty time axis", var.name())));
        }
        array.index_axis_move(Axis(0), 0)
    } else {
        array
    };

    let array = array
        .into_dimensionality::<Ix3>()
        .map_err(forecast_common::ForecastError::from)?;

    Ok(array.as_standard_layout().into_owned())
}

fn unpack_value(raw: f32, fill_value: Option<f64>, scale_factor: f64, add_offset: f64) -> f32 {
    if raw.is_nan() {
        return f32::NAN;
    }
    if let Some(fill) = fill_value {
        if (raw as f64 - fill).abs() <= f64::EPSILON * fill.abs().max(1.0) {
            return f32::NAN;
        }
    }
    if scale_factor == 1.0 && add_offset == 0.0 {
        raw
    } else {
        (raw as f64 * scale_factor + add_offset) as f32
    }
}

fn read_global_attributes(file: &netcdf::File) -> Attributes {
    let mut attributes = Attributes::new();
    for attr in file.attributes() {
        match attr.value() {
            Ok(value) => {
                attributes.insert(attr.name().to_string(), attribute_to_json(value));
            }
            Err(e) => {
                warn!(attribute = attr.name(), error = %e, "Skipping unreadable global attribute");
            }
        }
    }
    attributes
}
