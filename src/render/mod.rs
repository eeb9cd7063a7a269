//! Markdown tree to canvas operations.
//!
//! The [`Renderer`] keeps a stack of [`ContainerState`] frames, one per open
//! container node, so that text deep inside lists, quotes, links or tables
//! picks up the right style and margin.

mod anchors;
mod blocks;
pub mod canvas;
mod error;
pub mod image;
mod inline;
mod lists;
mod renderer;
pub mod stack;
pub mod style;
pub mod table;
mod tables;

pub use anchors::{AnchorRegistry, has_url_scheme, heading_key};
pub use canvas::{
    Align, Border, Canvas, CanvasError, Cell, CellBreak, HAlign, ImageOptions, Margins, PathMode,
    VAlign,
};
pub use error::RenderError;
pub use self::image::{ALTERNATIVE_DPI_MULTIPLIER, FsLocator, ImageLocator, ResolvedImage, resolve_image};
pub use renderer::{
    BULLET_EMS, INDENT_EMS, ITEM_TEXT_EMS, RenderOptions, RenderReport, Renderer, SkippedImage,
};
pub use stack::{ContainerKind, ContainerStack, ContainerState};
pub use style::{FontFamily, FontFlags, Rgb, Style, StyleSheet};
pub use table::TableLayout;

use crate::document::Node;

/// Render `document` onto `canvas` with filesystem image lookup.
///
/// # Errors
/// Returns the first canvas error encountered.
pub fn render<C: Canvas>(
    canvas: &mut C,
    document: &Node,
    options: RenderOptions,
) -> Result<RenderReport, RenderError> {
    Renderer::new(canvas, options).render(document)
}
