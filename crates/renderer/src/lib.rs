//! Figure rendering for gridded forecast fields.
//!
//! Turns a 2D field into a PNG figure:
//! - Colormap lookup with a dedicated colour for missing cells
//! - A titled figure with a vertical colour bar, using a bundled font
//! - Hand-rolled PNG encoding (indexed when the palette fits)

pub mod colormap;
pub mod error;
pub mod figure;
pub mod gradient;
pub mod png;
pub mod text;

pub use colormap::Colormap;
pub use error::{RenderError, RenderResult};
pub use figure::{render_figure, FigureSpec};
pub use gradient::Color;
pub use text::{bundled_font, load_font, resolve_font};
