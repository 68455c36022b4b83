//! Text drawing for figure titles and colour bar labels.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use tracing::warn;

use crate::error::{RenderError, RenderResult};
use crate::gradient::Color;

/// DejaVu Sans, bundled so figures carry text without any configuration.
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// The bundled figure font.
pub fn bundled_font() -> RenderResult<Font<'static>> {
    Font::try_from_bytes(FONT_DATA)
        .ok_or_else(|| RenderError::Font("bundled font is not a usable TrueType font".to_string()))
}

/// Load a TrueType font from disk.
pub fn load_font(path: impl AsRef<Path>) -> RenderResult<Font<'static>> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| RenderError::Font(format!("failed to read {}: {}", path.display(), e)))?;
    Font::try_from_vec(data)
        .ok_or_else(|| RenderError::Font(format!("{} is not a usable TrueType font", path.display())))
}

/// Font for figure text: the configured one if it loads, else the bundled one.
pub fn resolve_font(path: Option<&Path>) -> Option<Font<'static>> {
    if let Some(path) = path {
        match load_font(path) {
            Ok(font) => return Some(font),
            Err(e) => warn!(error = %e, "Failed to load configured font, using bundled font"),
        }
    }

    match bundled_font() {
        Ok(font) => Some(font),
        Err(e) => {
            warn!(error = %e, "No usable font, figures will have no text");
            None
        }
    }
}

/// Pixel size of `text` at `size`.
pub fn measure(font: &Font<'_>, size: f32, text: &str) -> (u32, u32) {
    let (w, h) = text_size(Scale::uniform(size), font, text);
    (w.max(0) as u32, h.max(0) as u32)
}

/// Draw `text` with its top-left corner at `(x, y)`.
pub fn draw_label(
    img: &mut RgbaImage,
    font: &Font<'_>,
    size: f32,
    color: Color,
    x: i32,
    y: i32,
    text: &str,
) {
    draw_text_mut(img, Rgba(color.to_rgba()), x, y, Scale::uniform(size), font, text);
}

/// Format a colour bar tick value.
pub fn format_tick(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    // -0.00 reads badly next to a zero tick
    if text == "-0.00" {
        "0.00".to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0.00");
        assert_eq!(format_tick(0.2), "0.20");
        assert_eq!(format_tick(1.0), "1.00");
        assert_eq!(format_tick(-0.001), "0.00");
    }

    #[test]
    fn test_missing_font_is_an_error() {
        let result = load_font("/nonexistent/font.ttf");
        assert!(matches!(result, Err(RenderError::Font(_))));
    }

    #[test]
    fn test_bundled_font_loads() {
        let font = bundled_font().unwrap();
        let (w, h) = measure(&font, 18.0, "sic_mean - 2023/07/25");
        assert!(w > 0 && h > 0);
    }

    #[test]
    fn test_resolve_font_falls_back_to_bundled() {
        assert!(resolve_font(None).is_some());
        assert!(resolve_font(Some(Path::new("/nonexistent/font.ttf"))).is_some());
    }

    #[test]
    fn test_garbage_font_is_an_error() {
        let dir = test_utils::temp_test_dir();
        let path = dir.path().join("bad.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(load_font(&path).is_err());
    }
}
