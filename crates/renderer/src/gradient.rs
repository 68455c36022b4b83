//! Colour-mapped raster rendering of gridded fields.

use rayon::prelude::*;

use crate::colormap::Colormap;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Linear color interpolation
pub(crate) fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    let mix = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Render a row-major grid as RGBA pixels.
///
/// Each grid cell becomes a `cell_size` x `cell_size` block, with grid row 0
/// at the top of the image. Non-finite cells use the missing-data colour.
///
/// # Arguments
/// - `data`: 2D grid of values (row-major order)
/// - `width`: Number of columns
/// - `height`: Number of rows
/// - `cell_size`: Pixels per grid cell along each axis
/// - `cmap`: Colormap applied to `(value - vmin) / (vmax - vmin)`
///
/// # Returns
/// RGBA pixel data (4 bytes per pixel), `width * cell_size` pixels wide
pub fn render_grid(
    data: &[f32],
    width: usize,
    height: usize,
    cell_size: usize,
    cmap: &Colormap,
    vmin: f32,
    vmax: f32,
) -> Vec<u8> {
    let cell_size = cell_size.max(1);
    let px_width = width * cell_size;
    let row_bytes = px_width * 4;
    let mut pixels = vec![0u8; row_bytes * height * cell_size];

    if row_bytes == 0 {
        return pixels;
    }

    pixels
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(py, row)| {
            let y = py / cell_size;
            for (x, block) in row.chunks_exact_mut(4 * cell_size).enumerate() {
                let value = data.get(y * width + x).copied().unwrap_or(f32::NAN);
                let rgba = cmap.map_value(value, vmin, vmax).to_rgba();
                for pixel in block.chunks_exact_mut(4) {
                    pixel.copy_from_slice(&rgba);
                }
            }
        });

    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::MISSING_COLOR;

    #[test]
    fn test_interpolate_color_midpoint() {
        let c = interpolate_color(Color::new(0, 0, 0, 255), Color::new(200, 100, 50, 255), 0.5);
        assert_eq!(c, Color::new(100, 50, 25, 255));
    }

    #[test]
    fn test_render_grid_scales_cells() {
        let cmap = Colormap::blues_r();
        let pixels = render_grid(&[0.0, 1.0], 2, 1, 3, &cmap, 0.0, 1.0);
        assert_eq!(pixels.len(), 6 * 3 * 4);

        let at = |x: usize, y: usize| {
            let i = (y * 6 + x) * 4;
            Color::new(pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3])
        };
        assert_eq!(at(0, 0), cmap.color_at(0.0));
        assert_eq!(at(2, 2), cmap.color_at(0.0));
        assert_eq!(at(3, 0), cmap.color_at(1.0));
        assert_eq!(at(5, 2), cmap.color_at(1.0));
    }

    #[test]
    fn test_render_grid_nan_is_missing_color() {
        let cmap = Colormap::bupu_r();
        let pixels = render_grid(&[f32::NAN], 1, 1, 1, &cmap, 0.0, 1.0);
        assert_eq!(pixels, MISSING_COLOR.to_rgba().to_vec());
    }

    #[test]
    fn test_render_grid_empty() {
        let cmap = Colormap::blues_r();
        assert!(render_grid(&[], 0, 0, 2, &cmap, 0.0, 1.0).is_empty());
    }
}
