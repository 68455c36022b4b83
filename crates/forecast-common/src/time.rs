//! Time handling for forecast base times and leadtimes.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{ForecastError, ForecastResult};

/// The calendar day a leadtime slice predicts: `base_time + leadtime_days`.
///
/// Fails when the sum falls outside chrono's representable range.
pub fn plot_date(base_time: DateTime<Utc>, leadtime_days: u32) -> ForecastResult<NaiveDate> {
    base_time
        .checked_add_signed(Duration::days(leadtime_days as i64))
        .map(|dt| dt.date_naive())
        .ok_or_else(|| {
            ForecastError::InvalidLeadtime(format!(
                "leadtime {} days from {} is out of range",
                leadtime_days, base_time
            ))
        })
}

/// Date component used in artifact names, e.g. `20230725`.
pub fn artifact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Date as shown in figure titles, e.g. `2023/07/25`.
pub fn title_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// Unit of a CF time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn seconds(self) -> f64 {
        match self {
            Self::Days => 86_400.0,
            Self::Hours => 3_600.0,
            Self::Minutes => 60.0,
            Self::Seconds => 1.0,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "days" | "day" | "d" => Some(Self::Days),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(Self::Hours),
            "minutes" | "minute" | "mins" | "min" => Some(Self::Minutes),
            "seconds" | "second" | "secs" | "sec" | "s" => Some(Self::Seconds),
            _ => None,
        }
    }
}

/// Parsed CF-convention time units, e.g. `"days since 1970-01-01 00:00:00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfTimeUnits {
    pub unit: TimeUnit,
    pub epoch: DateTime<Utc>,
}

impl CfTimeUnits {
    /// Parse a CF `units` attribute.
    ///
    /// Accepts `<unit> since <date>` where `<date>` is `YYYY-MM-DD`, optionally
    /// followed by a time (`HH:MM[:SS[.f]]`, space or `T` separated) and a
    /// UTC marker (`Z`, `UTC`, `+00:00`).
    pub fn parse(units: &str) -> ForecastResult<Self> {
        let (unit_str, epoch_str) = units
            .split_once(" since ")
            .ok_or_else(|| ForecastError::InvalidTime(format!("not CF time units: '{}'", units)))?;

        let unit = TimeUnit::parse(unit_str.trim())
            .ok_or_else(|| ForecastError::InvalidTime(format!("unknown time unit '{}'", unit_str)))?;

        let epoch = parse_epoch(epoch_str)?;

        Ok(Self { unit, epoch })
    }

    /// Convert a raw coordinate value into an absolute time.
    pub fn to_datetime(&self, value: f64) -> ForecastResult<DateTime<Utc>> {
        if !value.is_finite() {
            return Err(ForecastError::InvalidTime(format!(
                "non-finite time value {}",
                value
            )));
        }

        let out_of_range =
            || ForecastError::InvalidTime(format!("time value {} out of range", value));

        let millis = (value * self.unit.seconds() * 1000.0).round();
        if millis.abs() > i64::MAX as f64 / 2.0 {
            return Err(out_of_range());
        }

        self.epoch
            .checked_add_signed(Duration::milliseconds(millis as i64))
            .ok_or_else(out_of_range)
    }
}

fn parse_epoch(s: &str) -> ForecastResult<DateTime<Utc>> {
    let trimmed = s.trim();
    let trimmed = trimmed
        .strip_suffix("UTC")
        .or_else(|| trimmed.strip_suffix('Z'))
        .or_else(|| trimmed.strip_suffix("+00:00"))
        .unwrap_or(trimmed)
        .trim();

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    for format in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Some(ndt) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(ForecastError::InvalidTime(format!("unparseable epoch '{}'", s)))
}
