//! Tests for PNG encoding functionality.
//!
//! Encoded images are decoded again with the `image` crate to check that
//! both the indexed and RGBA paths produce valid, pixel-exact output.

use renderer::png::{create_png, create_png_auto, create_png_indexed};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

// ============================================================================
// Helper functions
// ============================================================================

/// Banded pixels with a handful of colours, like a colour-mapped field.
fn banded_pixels(width: usize, height: usize, bands: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let band = ((x + y) * bands / (width + height)) as u8;
            pixels.extend_from_slice(&[band * 25, 80 + band * 10, 255 - band * 20, 255]);
        }
    }
    pixels
}

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .expect("valid PNG")
        .to_rgba8()
}

fn color_type(png: &[u8]) -> u8 {
    // IHDR data starts after signature (8), length (4) and type (4)
    png[8 + 4 + 4 + 9]
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_create_png_simple() {
    let pixels = [
        255, 0, 0, 255, //
        0, 255, 0, 255, //
        0, 255, 0, 255, //
        255, 0, 0, 255, //
    ];

    let png = create_png_auto(&pixels, 2, 2).unwrap();
    assert_eq!(&png[0..8], &PNG_SIGNATURE);
    assert_eq!(color_type(&png), 3);
    assert_eq!(decode(&png).into_raw(), pixels.to_vec());
}

#[test]
fn test_create_png_rgba_round_trip() {
    let pixels = banded_pixels(7, 5, 4);
    let png = create_png(&pixels, 7, 5).unwrap();

    assert_eq!(color_type(&png), 6);
    let decoded = decode(&png);
    assert_eq!(decoded.dimensions(), (7, 5));
    assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn test_indexed_with_transparency() {
    let pixels = [255, 0, 0, 255, 0, 0, 0, 0];
    let png = create_png_auto(&pixels, 2, 1).unwrap();

    let decoded = decode(&png);
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(1, 0).0[3], 0);
}

#[test]
fn test_rgba_fallback_many_colors() {
    let mut pixels = Vec::with_capacity(300 * 4);
    for i in 0..300u32 {
        pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
    }

    let png = create_png_auto(&pixels, 300, 1).unwrap();
    assert_eq!(color_type(&png), 6);
    assert_eq!(decode(&png).into_raw(), pixels);
}

#[test]
fn test_large_image_parallel_extraction() {
    // 200x150 is above the parallel threshold
    let pixels = banded_pixels(200, 150, 9);
    let indexed = create_png_auto(&pixels, 200, 150).unwrap();
    let rgba = create_png(&pixels, 200, 150).unwrap();

    assert_eq!(color_type(&indexed), 3);
    assert!(indexed.len() < rgba.len());
    assert_eq!(decode(&indexed).into_raw(), pixels);
}

#[test]
fn test_explicit_indexed() {
    let palette = [(10, 20, 30, 255), (200, 210, 220, 255)];
    let png = create_png_indexed(3, 1, &palette, &[0, 1, 0]).unwrap();

    let decoded = decode(&png);
    assert_eq!(decoded.get_pixel(1, 0).0, [200, 210, 220, 255]);
    assert_eq!(decoded.get_pixel(2, 0).0, [10, 20, 30, 255]);
}

#[test]
fn test_explicit_indexed_rejects_empty_palette() {
    assert!(create_png_indexed(1, 1, &[], &[0]).is_err());
}

#[test]
fn test_single_pixel() {
    let png = create_png_auto(&[105, 105, 105, 255], 1, 1).unwrap();
    assert_eq!(decode(&png).get_pixel(0, 0).0, [105, 105, 105, 255]);
}
