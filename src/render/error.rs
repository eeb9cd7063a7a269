use thiserror::Error;

use super::canvas::CanvasError;

/// Errors that abort a render pass.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("canvas error: {0}")]
    Canvas(#[from] CanvasError),
}
