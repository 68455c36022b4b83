//! Tests for figure composition.
//!
//! Most of these render without a font so pixel checks are not disturbed by
//! text; the text tests use the bundled font.

use renderer::colormap::MISSING_COLOR;
use renderer::figure::FigureLayout;
use renderer::{bundled_font, render_figure, Color, Colormap, FigureSpec};

fn spec(colormap: Colormap, vmax: f32, cell_size: u32) -> FigureSpec {
    FigureSpec {
        title: "sic_mean - 2023/07/25".to_string(),
        colormap,
        vmin: 0.0,
        vmax,
        cell_size,
    }
}

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png).expect("valid PNG").to_rgba8()
}

fn pixel(img: &image::RgbaImage, x: u32, y: u32) -> Color {
    let [r, g, b, a] = img.get_pixel(x, y).0;
    Color::new(r, g, b, a)
}

#[test]
fn test_figure_dimensions_follow_layout() {
    let data = vec![0.5f32; 6 * 4];
    let spec = spec(Colormap::blues_r(), 1.0, 3);
    let png = render_figure(&data, 6, 4, &spec, None).unwrap();

    let layout = FigureLayout::new(6, 4, 3);
    let img = decode(&png);
    assert_eq!(img.dimensions(), (layout.canvas_width, layout.canvas_height));
}

#[test]
fn test_map_cells_use_colormap() {
    // Row 0 is drawn at the top of the map
    let data = [0.0f32, 1.0, f32::NAN, 0.5];
    let cmap = Colormap::blues_r();
    let spec = spec(cmap.clone(), 1.0, 2);
    let img = decode(&render_figure(&data, 2, 2, &spec, None).unwrap());

    let layout = FigureLayout::new(2, 2, 2);
    let (x0, y0) = (layout.map_x, layout.map_y);

    assert_eq!(pixel(&img, x0, y0), cmap.color_at(0.0));
    assert_eq!(pixel(&img, x0 + 3, y0 + 1), cmap.color_at(1.0));
    assert_eq!(pixel(&img, x0 + 1, y0 + 2), MISSING_COLOR);
    assert_eq!(pixel(&img, x0 + 2, y0 + 3), cmap.color_at(0.5));
}

#[test]
fn test_stddev_scaled_to_vmax() {
    let data = [0.0f32, 0.25];
    let cmap = Colormap::bupu_r();
    let spec = spec(cmap.clone(), 0.25, 1);
    let img = decode(&render_figure(&data, 2, 1, &spec, None).unwrap());

    let layout = FigureLayout::new(2, 1, 1);
    assert_eq!(pixel(&img, layout.map_x + 1, layout.map_y), cmap.color_at(1.0));
}

#[test]
fn test_colorbar_runs_from_vmax_at_top() {
    let data = vec![0.0f32; 20 * 20];
    let cmap = Colormap::blues_r();
    let spec = spec(cmap.clone(), 1.0, 1);
    let img = decode(&render_figure(&data, 20, 20, &spec, None).unwrap());

    let layout = FigureLayout::new(20, 20, 1);
    let x = layout.bar_x + 2;
    assert_eq!(pixel(&img, x, layout.map_y), cmap.color_at(1.0));
    assert_eq!(
        pixel(&img, x, layout.map_y + layout.map_height - 1),
        cmap.color_at(0.0)
    );
}

#[test]
fn test_background_is_white() {
    let data = [0.3f32];
    let spec = spec(Colormap::blues_r(), 1.0, 1);
    let img = decode(&render_figure(&data, 1, 1, &spec, None).unwrap());
    assert_eq!(pixel(&img, 0, 0), Color::WHITE);
}

#[test]
fn test_all_missing_field_renders() {
    let data = vec![f32::NAN; 9];
    let spec = spec(Colormap::bupu_r(), f32::NAN, 1);
    let png = render_figure(&data, 3, 3, &spec, None).unwrap();

    let layout = FigureLayout::new(3, 3, 1);
    let img = decode(&png);
    assert_eq!(pixel(&img, layout.map_x + 1, layout.map_y + 1), MISSING_COLOR);
}

fn non_white(img: &image::RgbaImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
    ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
        .filter(|&(x, y)| pixel(img, x, y) != Color::WHITE)
        .count()
}

// ============================================================================
// Text
// ============================================================================

#[test]
fn test_title_drawn_with_bundled_font() {
    let font = bundled_font().unwrap();
    let data = vec![0.5f32; 40 * 40];
    let spec = spec(Colormap::blues_r(), 1.0, 2);
    let img = decode(&render_figure(&data, 40, 40, &spec, Some(&font)).unwrap());

    let layout = FigureLayout::new(40, 40, 2);
    // Everything above the map frame is the title band
    let title_pixels = non_white(&img, 0..img.width(), 0..layout.map_y - 1);
    assert!(title_pixels > 50, "title band has {} inked pixels", title_pixels);
}

#[test]
fn test_title_band_blank_without_font() {
    let data = vec![0.5f32; 40 * 40];
    let spec = spec(Colormap::blues_r(), 1.0, 2);
    let img = decode(&render_figure(&data, 40, 40, &spec, None).unwrap());

    let layout = FigureLayout::new(40, 40, 2);
    assert_eq!(non_white(&img, 0..img.width(), 0..layout.map_y - 1), 0);
}

#[test]
fn test_tick_labels_drawn_with_bundled_font() {
    let font = bundled_font().unwrap();
    let data = vec![0.5f32; 40 * 40];
    let spec = spec(Colormap::bupu_r(), 0.3, 2);
    let img = decode(&render_figure(&data, 40, 40, &spec, Some(&font)).unwrap());

    let layout = FigureLayout::new(40, 40, 2);
    // Labels start to the right of the colour bar and its tick marks
    let label_x = layout.bar_x + 24;
    let label_pixels = non_white(
        &img,
        label_x..img.width(),
        layout.map_y..layout.map_y + layout.map_height,
    );
    assert!(label_pixels > 50, "tick label column has {} inked pixels", label_pixels);
}

#[test]
fn test_narrow_map_widens_canvas_for_title() {
    let font = bundled_font().unwrap();
    let data = [0.2f32, 0.1, 0.0, 0.3];
    let spec = spec(Colormap::blues_r(), 1.0, 2);
    let img = decode(&render_figure(&data, 2, 2, &spec, Some(&font)).unwrap());

    let layout = FigureLayout::new(2, 2, 2);
    assert!(img.width() > layout.canvas_width);
    assert_eq!(img.height(), layout.canvas_height);
    // The map itself is unchanged by the wider canvas
    assert_eq!(
        pixel(&img, layout.map_x, layout.map_y),
        Colormap::blues_r().color_at(0.2)
    );
}
