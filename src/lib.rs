// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. canvas::PageCanvas)
    clippy::module_name_repetitions
)]

//! # Pagemark
//!
//! Renders markdown into paginated page layouts.
//!
//! A markdown source is parsed into a [`document::Node`] tree, which a
//! [`render::Renderer`] walks depth-first. Each enter/leave event becomes
//! drawing operations on a [`render::Canvas`]: styled text runs, bordered
//! cells, filled paths, images and links.
//!
//! ## Modules
//!
//! - [`document`]: the input tree and the markdown parser adapter
//! - [`render`]: styles, the container stack and the node handlers
//! - [`canvas`]: an in-memory paginating canvas with JSON output
//! - [`config`]: saved default flags
//! - [`watcher`]: file watching for live re-rendering
//! - [`perf`]: timing scopes and the render trace log

pub mod canvas;
pub mod config;
pub mod document;
pub mod perf;
pub mod render;
pub mod watcher;

use canvas::{Orientation, PageCanvas, PageSize, RenderedDocument};
use render::{RenderError, RenderOptions, RenderReport, Renderer};

/// Parse `markdown` and render it onto a fresh [`PageCanvas`].
///
/// # Errors
/// Returns the first canvas error encountered.
pub fn render_markdown(
    markdown: &str,
    page_size: PageSize,
    orientation: Orientation,
    options: RenderOptions,
) -> Result<(RenderedDocument, RenderReport), RenderError> {
    let tree = document::parse(markdown);
    let mut canvas = PageCanvas::new(page_size, orientation);
    let report = Renderer::new(&mut canvas, options).render(&tree)?;
    Ok((canvas.finish(), report))
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::canvas::{PageCanvas, RenderedDocument};
    pub use crate::document::{Node, NodeKind, parse};
    pub use crate::render::{Canvas, RenderOptions, Renderer, StyleSheet};
}
