//! Low-level helpers around the native netcdf library.
//!
//! # Performance Notes
//!
//! The netcdf library requires a file path (it wraps libnetcdf/HDF5 which need
//! file handles). When reading from bytes, we write to a temp file first.
//!
//! On Linux, we use `/dev/shm` (memory-backed tmpfs) to minimize I/O latency.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

use forecast_common::ForecastDataset;
use netcdf::AttributeValue;
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::NetCdfResult;
use crate::forecast::load_forecast_dataset;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This function disables that output by calling
/// H5Eset_auto2 with null handlers. It only needs to be called once per
/// process, but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Load a forecast dataset from the raw bytes of a NetCDF file.
///
/// The bytes are spilled to a uniquely named temp file which is removed
/// when this returns, on success or on any error.
pub fn load_forecast_dataset_from_bytes(data: &[u8]) -> NetCdfResult<ForecastDataset> {
    load_from_bytes_in(data, &get_optimal_temp_dir())
}

fn load_from_bytes_in(data: &[u8], dir: &Path) -> NetCdfResult<ForecastDataset> {
    let mut temp_file = tempfile::Builder::new()
        .prefix("forecast_")
        .suffix(".nc")
        .tempfile_in(dir)?;
    temp_file.write_all(data)?;
    temp_file.flush()?;

    debug!(path = %temp_file.path().display(), size = data.len(), "Spilled NetCDF bytes to temp file");

    load_forecast_dataset(temp_file.path())
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Get the optimal temp directory for NetCDF file operations.
///
/// On Linux, uses /dev/shm (memory-backed tmpfs) if available for faster I/O.
/// Falls back to the system temp directory on other platforms or if /dev/shm is unavailable.
fn get_optimal_temp_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        let shm_path = Path::new("/dev/shm");
        if shm_path.is_dir() {
            let test_path = shm_path.join(format!(".forecast_nc_test_{}", std::process::id()));
            if std::fs::write(&test_path, b"test").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return shm_path.to_path_buf();
            }
        }
    }

    std::env::temp_dir()
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Numeric variable attribute, widened to f64.
pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// String variable attribute.
pub(crate) fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(mut v) if !v.is_empty() => Some(v.remove(0)),
        _ => None,
    }
}

fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

fn array_value<T, F>(values: Vec<T>, f: F) -> Value
where
    F: Fn(T) -> Value,
{
    Value::Array(values.into_iter().map(f).collect())
}

/// Convert a netcdf attribute into its JSON equivalent.
///
/// Non-finite floats have no JSON representation and become `null`.
pub(crate) fn attribute_to_json(value: AttributeValue) -> Value {
    match value {
        AttributeValue::Uchar(v) => Value::from(v),
        AttributeValue::Uchars(v) => array_value(v, Value::from),
        AttributeValue::Schar(v) => Value::from(v),
        AttributeValue::Schars(v) => array_value(v, Value::from),
        AttributeValue::Ushort(v) => Value::from(v),
        AttributeValue::Ushorts(v) => array_value(v, Value::from),
        AttributeValue::Short(v) => Value::from(v),
        AttributeValue::Shorts(v) => array_value(v, Value::from),
        AttributeValue::Uint(v) => Value::from(v),
        AttributeValue::Uints(v) => array_value(v, Value::from),
        AttributeValue::Int(v) => Value::from(v),
        AttributeValue::Ints(v) => array_value(v, Value::from),
        AttributeValue::Ulonglong(v) => Value::from(v),
        AttributeValue::Ulonglongs(v) => array_value(v, Value::from),
        AttributeValue::Longlong(v) => Value::from(v),
        AttributeValue::Longlongs(v) => array_value(v, Value::from),
        AttributeValue::Float(v) => float_value(v as f64),
        AttributeValue::Floats(v) => array_value(v, |x| float_value(x as f64)),
        AttributeValue::Double(v) => float_value(v),
        AttributeValue::Doubles(v) => array_value(v, float_value),
        AttributeValue::Str(v) => Value::String(v),
        AttributeValue::Strs(v) => array_value(v, Value::String),
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}
