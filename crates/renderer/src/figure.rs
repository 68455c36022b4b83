//! Composition of a single forecast figure.
//!
//! ```text
//! +--------------------------------------+
//! |              title                   |
//! | +----------------+  +--+             |
//! | |                |  |  |- 1.00       |
//! | |      map       |  |  |- ...        |
//! | |                |  |  |- 0.00       |
//! | +----------------+  +--+             |
//! +--------------------------------------+
//! ```

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use rusttype::Font;

use crate::colormap::{effective_range, Colormap};
use crate::error::{RenderError, RenderResult};
use crate::gradient::{render_grid, Color};
use crate::png::create_png_auto;
use crate::text::{draw_label, format_tick, measure};

const MARGIN: u32 = 12;
const TITLE_HEIGHT: u32 = 30;
const TITLE_FONT_SIZE: f32 = 18.0;
const BAR_GAP: u32 = 14;
const BAR_WIDTH: u32 = 16;
const TICK_LENGTH: u32 = 4;
const TICK_LABEL_WIDTH: u32 = 44;
const TICK_FONT_SIZE: f32 = 12.0;

/// Number of labelled ticks on the colour bar, including both ends.
pub const TICK_COUNT: usize = 6;

/// What to draw for one field.
#[derive(Debug, Clone)]
pub struct FigureSpec {
    pub title: String,
    pub colormap: Colormap,
    pub vmin: f32,
    pub vmax: f32,
    /// Pixels per grid cell along each axis.
    pub cell_size: u32,
}

/// Pixel geometry of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub map_x: u32,
    pub map_y: u32,
    pub map_width: u32,
    pub map_height: u32,
    pub bar_x: u32,
}

impl FigureLayout {
    pub fn new(grid_width: usize, grid_height: usize, cell_size: u32) -> Self {
        let cell_size = cell_size.max(1);
        let map_width = grid_width as u32 * cell_size;
        let map_height = grid_height as u32 * cell_size;
        let map_x = MARGIN;
        let map_y = MARGIN + TITLE_HEIGHT;
        let bar_x = map_x + map_width + BAR_GAP;

        Self {
            canvas_width: bar_x + BAR_WIDTH + TICK_LENGTH + TICK_LABEL_WIDTH + MARGIN,
            canvas_height: map_y + map_height + MARGIN,
            map_x,
            map_y,
            map_width,
            map_height,
            bar_x,
        }
    }

    /// Widen the canvas so a title of `title_width` pixels fits between the margins.
    pub fn fit_title(mut self, title_width: u32) -> Self {
        self.canvas_width = self.canvas_width.max(title_width + 2 * MARGIN);
        self
    }

    /// Vertical pixel position of a colour bar fraction (0 at the bottom).
    fn bar_y(&self, fraction: f32) -> f32 {
        let span = self.map_height.saturating_sub(1) as f32;
        self.map_y as f32 + (1.0 - fraction) * span
    }
}

/// Render a row-major field as a titled PNG figure with a colour bar.
///
/// Text is drawn only when a font is available.
pub fn render_figure(
    data: &[f32],
    width: usize,
    height: usize,
    spec: &FigureSpec,
    font: Option<&Font<'_>>,
) -> RenderResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidGrid(format!(
            "cannot render an empty {}x{} grid",
            width, height
        )));
    }
    if data.len() != width * height {
        return Err(RenderError::InvalidGrid(format!(
            "expected {} values for {}x{} grid, got {}",
            width * height,
            width,
            height,
            data.len()
        )));
    }

    let mut layout = FigureLayout::new(width, height, spec.cell_size);
    if let Some(font) = font {
        let (title_width, _) = measure(font, TITLE_FONT_SIZE, &spec.title);
        layout = layout.fit_title(title_width);
    }
    let mut canvas = RgbaImage::from_pixel(
        layout.canvas_width,
        layout.canvas_height,
        Rgba(Color::WHITE.to_rgba()),
    );

    let map_pixels = render_grid(
        data,
        width,
        height,
        spec.cell_size.max(1) as usize,
        &spec.colormap,
        spec.vmin,
        spec.vmax,
    );
    let map = RgbaImage::from_raw(layout.map_width, layout.map_height, map_pixels)
        .ok_or_else(|| RenderError::InvalidGrid("map buffer size mismatch".to_string()))?;
    imageops::replace(&mut canvas, &map, layout.map_x as i64, layout.map_y as i64);

    draw_colorbar(&mut canvas, &layout, &spec.colormap);
    draw_frames(&mut canvas, &layout);
    draw_ticks(&mut canvas, &layout, spec, font);

    if let Some(font) = font {
        draw_title(&mut canvas, &layout, &spec.title, font);
    }

    create_png_auto(
        canvas.as_raw(),
        layout.canvas_width as usize,
        layout.canvas_height as usize,
    )
}

/// Values at which the colour bar carries a tick.
pub fn tick_values(vmin: f32, vmax: f32) -> Vec<f32> {
    let range = effective_range(vmin, vmax);
    (0..TICK_COUNT)
        .map(|i| vmin + range * i as f32 / (TICK_COUNT - 1) as f32)
        .collect()
}

fn draw_colorbar(canvas: &mut RgbaImage, layout: &FigureLayout, cmap: &Colormap) {
    let span = layout.map_height.saturating_sub(1).max(1) as f32;
    for row in 0..layout.map_height {
        let fraction = 1.0 - row as f32 / span;
        let color = Rgba(cmap.color_at(fraction).to_rgba());
        draw_filled_rect_mut(
            canvas,
            Rect::at(layout.bar_x as i32, (layout.map_y + row) as i32).of_size(BAR_WIDTH, 1),
            color,
        );
    }
}

fn draw_frames(canvas: &mut RgbaImage, layout: &FigureLayout) {
    let black = Rgba(Color::BLACK.to_rgba());
    // Frames sit one pixel outside the map and bar so no data is covered.
    draw_hollow_rect_mut(
        canvas,
        Rect::at(layout.map_x as i32 - 1, layout.map_y as i32 - 1)
            .of_size(layout.map_width + 2, layout.map_height + 2),
        black,
    );
    draw_hollow_rect_mut(
        canvas,
        Rect::at(layout.bar_x as i32 - 1, layout.map_y as i32 - 1)
            .of_size(BAR_WIDTH + 2, layout.map_height + 2),
        black,
    );
}

fn draw_ticks(
    canvas: &mut RgbaImage,
    layout: &FigureLayout,
    spec: &FigureSpec,
    font: Option<&Font<'_>>,
) {
    let black = Rgba(Color::BLACK.to_rgba());
    let tick_start = (layout.bar_x + BAR_WIDTH + 1) as f32;
    let tick_end = tick_start + TICK_LENGTH as f32;

    for (i, value) in tick_values(spec.vmin, spec.vmax).into_iter().enumerate() {
        let fraction = i as f32 / (TICK_COUNT - 1) as f32;
        let y = layout.bar_y(fraction).round();
        draw_line_segment_mut(canvas, (tick_start, y), (tick_end, y), black);

        if let Some(font) = font {
            let label = format_tick(value);
            let (_, h) = measure(font, TICK_FONT_SIZE, &label);
            draw_label(
                canvas,
                font,
                TICK_FONT_SIZE,
                Color::BLACK,
                tick_end as i32 + 3,
                y as i32 - h as i32 / 2,
                &label,
            );
        }
    }
}

fn draw_title(canvas: &mut RgbaImage, layout: &FigureLayout, title: &str, font: &Font<'_>) {
    let (w, h) = measure(font, TITLE_FONT_SIZE, title);
    // Centred over the map, but kept inside the canvas margins
    let max_x = (layout.canvas_width as i32 - MARGIN as i32 - w as i32).max(MARGIN as i32);
    let x = (layout.map_x as i32 + (layout.map_width as i32 - w as i32) / 2).clamp(MARGIN as i32, max_x);
    let y = MARGIN as i32 + (TITLE_HEIGHT as i32 - h as i32) / 2;
    draw_label(canvas, font, TITLE_FONT_SIZE, Color::BLACK, x, y.max(0), title);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_scales_with_cell_size() {
        let small = FigureLayout::new(10, 5, 1);
        let large = FigureLayout::new(10, 5, 4);
        assert_eq!(small.map_width, 10);
        assert_eq!(large.map_width, 40);
        assert_eq!(large.map_height, 20);
        assert_eq!(large.canvas_width - small.canvas_width, 30);
        assert_eq!(large.canvas_height - small.canvas_height, 15);
    }

    #[test]
    fn test_layout_zero_cell_size_is_one() {
        assert_eq!(FigureLayout::new(3, 3, 0), FigureLayout::new(3, 3, 1));
    }

    #[test]
    fn test_fit_title_only_widens() {
        let layout = FigureLayout::new(200, 10, 1);
        assert_eq!(layout.fit_title(10), layout);

        let narrow = FigureLayout::new(2, 2, 1).fit_title(300);
        assert_eq!(narrow.canvas_width, 300 + 2 * MARGIN);
        assert_eq!(narrow.canvas_height, FigureLayout::new(2, 2, 1).canvas_height);
    }

    #[test]
    fn test_tick_values() {
        let ticks = tick_values(0.0, 1.0);
        assert_eq!(ticks.len(), TICK_COUNT);
        assert_eq!(ticks[0], 0.0);
        assert!((ticks[5] - 1.0).abs() < 1e-6);
        assert!((ticks[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_tick_values_degenerate_range() {
        let ticks = tick_values(0.0, 0.0);
        assert!((ticks[5] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_render_rejects_bad_grid() {
        let spec = FigureSpec {
            title: "sic_mean - 2023/07/25".into(),
            colormap: Colormap::blues_r(),
            vmin: 0.0,
            vmax: 1.0,
            cell_size: 1,
        };
        assert!(render_figure(&[0.0; 3], 2, 2, &spec, None).is_err());
        assert!(render_figure(&[], 0, 0, &spec, None).is_err());
    }
}
