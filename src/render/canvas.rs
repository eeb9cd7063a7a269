//! The drawing surface the renderer emits into.
//!
//! The renderer only ever talks to a [`Canvas`]; pagination, font metrics
//! and the output format are the canvas's business.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::style::{Rgb, Style};

/// Errors reported by a canvas. Any of these aborts the render.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("canvas output error: {0}")]
    Output(String),
}

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub const fn uniform(margin: f64) -> Self {
        Self {
            left: margin,
            top: margin,
            right: margin,
            bottom: margin,
        }
    }
}

/// Which cell edges get a border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Border {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl Border {
    pub const NONE: Self = Self {
        left: false,
        top: false,
        right: false,
        bottom: false,
    };
    pub const ALL: Self = Self {
        left: true,
        top: true,
        right: true,
        bottom: true,
    };
    pub const LEFT_RIGHT: Self = Self {
        left: true,
        top: false,
        right: true,
        bottom: false,
    };
    pub const TOP: Self = Self {
        left: false,
        top: true,
        right: false,
        bottom: false,
    };

    pub const fn is_none(self) -> bool {
        !(self.left || self.top || self.right || self.bottom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Text alignment inside a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Align {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl Align {
    pub const fn new(horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Where the cursor goes after a cell is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellBreak {
    /// Stay on the line, to the right of the cell.
    #[default]
    Right,
    /// Start of the next line at the left margin.
    NextLine,
    /// Directly below the cell.
    Below,
}

/// A table-style cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell<'a> {
    /// Zero or less extends the cell to the right margin.
    pub width: f64,
    pub height: f64,
    pub text: &'a str,
    pub border: Border,
    pub after: CellBreak,
    pub align: Align,
    pub fill: bool,
}

impl<'a> Cell<'a> {
    pub const fn new(width: f64, height: f64, text: &'a str) -> Self {
        Self {
            width,
            height,
            text,
            border: Border::NONE,
            after: CellBreak::Right,
            align: Align::new(HAlign::Left, VAlign::Middle),
            fill: false,
        }
    }

    #[must_use]
    pub const fn border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    #[must_use]
    pub const fn after(mut self, after: CellBreak) -> Self {
        self.after = after;
        self
    }

    #[must_use]
    pub const fn align(mut self, horizontal: HAlign, vertical: VAlign) -> Self {
        self.align = Align::new(horizontal, vertical);
        self
    }

    #[must_use]
    pub const fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }
}

/// How a path is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    Stroke,
    Fill,
    FillStroke,
}

/// Options for embedding an image.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImageOptions {
    /// Scale the image's native DPI by this factor (smaller on the page).
    pub multiply_dpi: Option<f64>,
    /// Place on the current text line instead of on its own line.
    pub inline: bool,
}

/// A paginating drawing surface.
///
/// Queries never fail. Emitting operations return [`CanvasError`] when the
/// underlying output can no longer be written.
pub trait Canvas {
    /// Handle for a registered link target.
    type LinkId: Copy + Eq + std::fmt::Debug;

    fn left_margin(&self) -> f64;
    fn set_left_margin(&mut self, margin: f64);
    fn margins(&self) -> Margins;

    fn xy(&self) -> (f64, f64);
    fn set_x(&mut self, x: f64);

    /// Page width and height in points.
    fn page_size(&self) -> (f64, f64);
    /// 1-based number of the current page.
    fn page_number(&self) -> usize;

    /// Select font, flags, size and colors for subsequent text and cells.
    fn set_style(&mut self, style: &Style);
    /// Width of `text` in the current font.
    fn string_width(&self, text: &str) -> f64;

    /// Flow `text` from the cursor, wrapping at the right margin.
    /// `\n` starts a new line of `height` at the left margin.
    fn write(&mut self, height: f64, text: &str) -> Result<(), CanvasError>;
    /// Like [`write`](Self::write), clickable to an external URL.
    fn write_link(&mut self, height: f64, text: &str, url: &str) -> Result<(), CanvasError>;
    /// Like [`write`](Self::write), clickable to a registered link target.
    fn write_internal_link(
        &mut self,
        height: f64,
        text: &str,
        link: Self::LinkId,
    ) -> Result<(), CanvasError>;

    fn cell(&mut self, cell: &Cell<'_>) -> Result<(), CanvasError>;
    /// One filled-or-not cell per line of `text`, lines kept verbatim.
    fn multi_cell(
        &mut self,
        width: f64,
        height: f64,
        text: &str,
        fill: bool,
    ) -> Result<(), CanvasError>;
    /// Move to the next line; `None` uses the height of the last output.
    fn ln(&mut self, height: Option<f64>) -> Result<(), CanvasError>;

    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn draw_path(&mut self, mode: PathMode) -> Result<(), CanvasError>;
    fn set_line_width(&mut self, width: f64);
    fn set_draw_color(&mut self, color: Rgb);
    fn set_fill_color(&mut self, color: Rgb);

    /// Allocate a link target, to be bound later with [`set_link`](Self::set_link).
    fn add_link(&mut self) -> Self::LinkId;
    /// Bind `link` to `page` at `y` (`None` for the current cursor line).
    fn set_link(&mut self, link: Self::LinkId, y: Option<f64>, page: usize);

    /// Embed the image at `path` at the cursor, sized by the canvas.
    fn image(&mut self, path: &Path, options: ImageOptions) -> Result<(), CanvasError>;
}
