//! Error types for figure rendering.

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
