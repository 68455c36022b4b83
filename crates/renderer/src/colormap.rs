//! Sequential colormaps for forecast fields.
//!
//! Stops are the 9-class ColorBrewer schemes, evenly spaced over `[0, 1]`
//! and linearly interpolated between.

use crate::error::{RenderError, RenderResult};
use crate::gradient::{interpolate_color, Color};

const BLUES: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

const BUPU: [&str; 9] = [
    "#f7fcfd", "#e0ecf4", "#bfd3e6", "#9ebcda", "#8c96c6", "#8c6bb1", "#88419d", "#810f7c",
    "#4d004b",
];

/// Colour used for cells with no data (`dimgrey`).
pub const MISSING_COLOR: Color = Color {
    r: 105,
    g: 105,
    b: 105,
    a: 255,
};

/// A piecewise-linear colormap over normalised values.
#[derive(Debug, Clone)]
pub struct Colormap {
    stops: Vec<Color>,
}

impl Colormap {
    /// Reversed Blues, used for sea-ice concentration.
    pub fn blues_r() -> Self {
        Self::builtin(&BLUES).reversed()
    }

    /// Reversed BuPu, used for concentration uncertainty.
    pub fn bupu_r() -> Self {
        Self::builtin(&BUPU).reversed()
    }

    fn builtin(stops: &[&str]) -> Self {
        Self {
            stops: stops
                .iter()
                .map(|s| hex_to_color(s).unwrap_or(MISSING_COLOR))
                .collect(),
        }
    }

    fn reversed(mut self) -> Self {
        self.stops.reverse();
        self
    }

    /// Colour at a normalised position; out-of-range input is clamped.
    pub fn color_at(&self, t: f32) -> Color {
        if t.is_nan() {
            return MISSING_COLOR;
        }
        let t = t.clamp(0.0, 1.0);
        let segments = (self.stops.len() - 1) as f32;
        let pos = t * segments;
        let lower = (pos.floor() as usize).min(self.stops.len() - 2);
        interpolate_color(self.stops[lower], self.stops[lower + 1], pos - lower as f32)
    }

    /// Colour for a raw value mapped through `[vmin, vmax]`.
    pub fn map_value(&self, value: f32, vmin: f32, vmax: f32) -> Color {
        if !value.is_finite() {
            return MISSING_COLOR;
        }
        let range = effective_range(vmin, vmax);
        self.color_at((value - vmin) / range)
    }
}

/// Width of the value range, falling back to 1 when it is degenerate.
pub fn effective_range(vmin: f32, vmax: f32) -> f32 {
    let range = vmax - vmin;
    if range.is_finite() && range > f32::EPSILON {
        range
    } else {
        1.0
    }
}

/// Parse a `#rrggbb` colour string.
pub fn hex_to_color(hex: &str) -> RenderResult<Color> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(RenderError::InvalidColor(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| RenderError::InvalidColor(hex.to_string()))
    };
    Ok(Color::new(channel(0)?, channel(2)?, channel(4)?, 255))
}
