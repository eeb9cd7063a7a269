//! The recorded display list.
//!
//! Every operation carries the resolved style and colors it was drawn with,
//! so the list can be replayed by any backend without the canvas state.

use std::path::PathBuf;

use serde::Serialize;

use crate::render::{Align, Border, PathMode, Rgb, Style};

/// Handle of a registered link target (index into [`RenderedDocument::links`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LinkId(pub usize);

/// Where a clickable run points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "lowercase")]
pub enum LinkRef {
    External(String),
    Internal(LinkId),
}

/// A link target; unbound targets have no page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LinkTarget {
    pub page: Option<usize>,
    pub y: Option<f64>,
}

/// A run of text on one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOp {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellOp {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub style: Style,
    pub border: Border,
    pub align: Align,
    pub fill: bool,
    pub fill_color: Rgb,
    pub draw_color: Rgb,
    pub line_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum PathSegment {
    Move { x: f64, y: f64 },
    Line { x: f64, y: f64 },
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathOp {
    pub segments: Vec<PathSegment>,
    pub mode: PathMode,
    pub fill_color: Rgb,
    pub draw_color: Rgb,
    pub line_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOp {
    pub path: PathBuf,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DrawOp {
    Text(TextOp),
    Cell(CellOp),
    Path(PathOp),
    Image(ImageOp),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    /// 1-based.
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub const fn new(number: usize) -> Self {
        Self {
            number,
            ops: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Cell(cell) => Some(cell),
            _ => None,
        })
    }
}

/// Everything a render produced, ready for serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub page_width: f64,
    pub page_height: f64,
    pub pages: Vec<Page>,
    pub links: Vec<LinkTarget>,
}

impl RenderedDocument {
    /// All text runs in drawing order, across pages.
    pub fn texts(&self) -> impl Iterator<Item = &TextOp> {
        self.pages.iter().flat_map(Page::texts)
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellOp> {
        self.pages.iter().flat_map(Page::cells)
    }

    pub fn ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.pages.iter().flat_map(|page| page.ops.iter())
    }

    /// Concatenated text of all runs and cells, one space between items.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for op in self.ops() {
            let text = match op {
                DrawOp::Text(text) => text.text.trim(),
                DrawOp::Cell(cell) => cell.text.trim(),
                DrawOp::Path(_) | DrawOp::Image(_) => continue,
            };
            if text.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(text);
        }
        out
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
