//! An in-memory paginating [`Canvas`].
//!
//! [`PageCanvas`] lays text out with approximate font metrics, breaks pages
//! at the bottom margin and records every drawing operation per page. The
//! result is a [`RenderedDocument`] that serializes to JSON.

mod output;
mod page;

use std::path::Path;

use unicode_width::UnicodeWidthStr;

use crate::render::{
    Border, Canvas, CanvasError, Cell, CellBreak, FontFamily, FontFlags, ImageOptions, Margins,
    PathMode, Rgb, Style,
};

pub use output::{
    CellOp, DrawOp, ImageOp, LinkId, LinkRef, LinkTarget, Page, PathOp, PathSegment,
    RenderedDocument, TextOp,
};
pub use page::{DEFAULT_MARGIN, Orientation, PageSize};

/// Native resolution assumed for embedded images.
const IMAGE_DPI: f64 = 72.0;

/// Approximate advance of one terminal column of text, as a fraction of the
/// font size.
const fn advance_factor(family: FontFamily) -> f64 {
    match family {
        FontFamily::Sans | FontFamily::Serif => 0.5,
        FontFamily::Mono => 0.6,
    }
}

/// Width of `text` set in `style`.
pub fn text_width(style: &Style, text: &str) -> f64 {
    let bold = if style.flags.contains(FontFlags::BOLD) {
        1.05
    } else {
        1.0
    };
    text.width() as f64 * style.size * advance_factor(style.family) * bold
}

/// Paginating canvas that records drawing operations.
#[derive(Debug, Clone)]
pub struct PageCanvas {
    page_width: f64,
    page_height: f64,
    margins: Margins,
    x: f64,
    y: f64,
    style: Style,
    draw_color: Rgb,
    fill_color: Rgb,
    line_width: f64,
    /// Height of the last line or cell, for `ln(None)`.
    last_height: f64,
    path: Vec<PathSegment>,
    pages: Vec<Page>,
    links: Vec<LinkTarget>,
}

impl Default for PageCanvas {
    fn default() -> Self {
        Self::new(PageSize::default(), Orientation::default())
    }
}

impl PageCanvas {
    pub fn new(size: PageSize, orientation: Orientation) -> Self {
        let (page_width, page_height) = orientation.apply(size);
        Self::with_dimensions(page_width, page_height, Margins::uniform(DEFAULT_MARGIN))
    }

    /// A canvas with explicit page dimensions and margins, in points.
    pub fn with_dimensions(page_width: f64, page_height: f64, margins: Margins) -> Self {
        let style = Style::default();
        Self {
            page_width,
            page_height,
            margins,
            x: margins.left,
            y: margins.top,
            style,
            draw_color: Rgb::BLACK,
            fill_color: style.fill_color,
            line_width: 1.0,
            last_height: style.line_height(),
            path: Vec::new(),
            pages: vec![Page::new(1)],
            links: Vec::new(),
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub const fn line_width(&self) -> f64 {
        self.line_width
    }

    pub const fn draw_color(&self) -> Rgb {
        self.draw_color
    }

    pub const fn fill_color(&self) -> Rgb {
        self.fill_color
    }

    pub fn link_target(&self, link: LinkId) -> Option<LinkTarget> {
        self.links.get(link.0).copied()
    }

    /// Consume the canvas and return what was drawn.
    pub fn finish(self) -> RenderedDocument {
        RenderedDocument {
            page_width: self.page_width,
            page_height: self.page_height,
            pages: self.pages,
            links: self.links,
        }
    }

    fn right_edge(&self) -> f64 {
        self.page_width - self.margins.right
    }

    fn new_line(&mut self, height: f64) {
        self.x = self.margins.left;
        self.y += height;
        self.last_height = height;
    }

    /// Start a new page if `height` more points would cross the bottom margin.
    ///
    /// Content taller than a whole page is placed at the top and allowed to
    /// overflow rather than breaking forever.
    fn reserve(&mut self, height: f64) {
        let limit = self.page_height - self.margins.bottom;
        if self.y + height > limit && self.y > self.margins.top {
            let number = self.pages.len() + 1;
            tracing::debug!(page = number, "page break");
            self.pages.push(Page::new(number));
            self.y = self.margins.top;
        }
    }

    fn push_op(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn flush_run(&mut self, start: f64, height: f64, run: &mut String, link: Option<&LinkRef>) {
        if run.is_empty() {
            return;
        }
        let text = std::mem::take(run);
        self.push_op(DrawOp::Text(TextOp {
            x: start,
            y: self.y,
            width: self.x - start,
            height,
            text,
            style: self.style,
            link: link.cloned(),
        }));
    }

    /// Flow one line's worth of `text` (no `\n`) word by word.
    fn flow(&mut self, height: f64, text: &str, link: Option<&LinkRef>) {
        let mut run = String::new();
        let mut start = self.x;
        for word in text.split_inclusive(' ') {
            let width = text_width(&self.style, word);
            let at_line_start = self.x <= self.margins.left + f64::EPSILON;
            if self.x + width > self.right_edge() && !at_line_start {
                self.flush_run(start, height, &mut run, link);
                self.new_line(height);
                start = self.x;
                if word.trim().is_empty() {
                    continue;
                }
            }
            if run.is_empty() {
                self.reserve(height);
                start = self.x;
            }
            run.push_str(word);
            self.x += width;
        }
        self.flush_run(start, height, &mut run, link);
        self.last_height = height;
    }

    fn write_with(&mut self, height: f64, text: &str, link: Option<&LinkRef>) {
        for (index, segment) in text.split('\n').enumerate() {
            if index > 0 {
                self.new_line(height);
            }
            if !segment.is_empty() {
                self.flow(height, segment, link);
            }
        }
    }
}

impl Canvas for PageCanvas {
    type LinkId = LinkId;

    fn left_margin(&self) -> f64 {
        self.margins.left
    }

    fn set_left_margin(&mut self, margin: f64) {
        self.margins.left = margin;
        if self.x < margin {
            self.x = margin;
        }
    }

    fn margins(&self) -> Margins {
        self.margins
    }

    fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    fn page_size(&self) -> (f64, f64) {
        (self.page_width, self.page_height)
    }

    fn page_number(&self) -> usize {
        self.pages.len()
    }

    fn set_style(&mut self, style: &Style) {
        self.style = *style;
        self.fill_color = style.fill_color;
    }

    fn string_width(&self, text: &str) -> f64 {
        text_width(&self.style, text)
    }

    fn write(&mut self, height: f64, text: &str) -> Result<(), CanvasError> {
        self.write_with(height, text, None);
        Ok(())
    }

    fn write_link(&mut self, height: f64, text: &str, url: &str) -> Result<(), CanvasError> {
        self.write_with(height, text, Some(&LinkRef::External(url.to_string())));
        Ok(())
    }

    fn write_internal_link(
        &mut self,
        height: f64,
        text: &str,
        link: LinkId,
    ) -> Result<(), CanvasError> {
        if link.0 >= self.links.len() {
            return Err(CanvasError::Output(format!("unknown link target {}", link.0)));
        }
        self.write_with(height, text, Some(&LinkRef::Internal(link)));
        Ok(())
    }

    fn cell(&mut self, cell: &Cell<'_>) -> Result<(), CanvasError> {
        let width = if cell.width <= 0.0 {
            self.right_edge() - self.x
        } else {
            cell.width
        };
        self.reserve(cell.height);
        let op = CellOp {
            x: self.x,
            y: self.y,
            width,
            height: cell.height,
            text: cell.text.to_string(),
            style: self.style,
            border: cell.border,
            align: cell.align,
            fill: cell.fill,
            fill_color: self.fill_color,
            draw_color: self.draw_color,
            line_width: self.line_width,
        };
        self.push_op(DrawOp::Cell(op));
        self.last_height = cell.height;
        match cell.after {
            CellBreak::Right => self.x += width,
            CellBreak::NextLine => self.new_line(cell.height),
            CellBreak::Below => self.y += cell.height,
        }
        Ok(())
    }

    fn multi_cell(
        &mut self,
        width: f64,
        height: f64,
        text: &str,
        fill: bool,
    ) -> Result<(), CanvasError> {
        let width = if width <= 0.0 {
            self.right_edge() - self.x
        } else {
            width
        };
        let start = self.x;
        for line in text.lines() {
            self.x = start;
            self.cell(
                &Cell::new(width, height, line)
                    .border(Border::NONE)
                    .after(CellBreak::Below)
                    .fill(fill),
            )?;
        }
        self.x = self.margins.left;
        Ok(())
    }

    fn ln(&mut self, height: Option<f64>) -> Result<(), CanvasError> {
        self.new_line(height.unwrap_or(self.last_height));
        Ok(())
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.push(PathSegment::Move { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.push(PathSegment::Line { x, y });
    }

    fn close_path(&mut self) {
        self.path.push(PathSegment::Close);
    }

    fn draw_path(&mut self, mode: PathMode) -> Result<(), CanvasError> {
        if self.path.is_empty() {
            return Ok(());
        }
        let op = PathOp {
            segments: std::mem::take(&mut self.path),
            mode,
            fill_color: self.fill_color,
            draw_color: self.draw_color,
            line_width: self.line_width,
        };
        self.push_op(DrawOp::Path(op));
        Ok(())
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    fn add_link(&mut self) -> LinkId {
        self.links.push(LinkTarget::default());
        LinkId(self.links.len() - 1)
    }

    fn set_link(&mut self, link: LinkId, y: Option<f64>, page: usize) {
        let current_y = self.y;
        if let Some(target) = self.links.get_mut(link.0) {
            target.page = Some(page);
            target.y = Some(y.unwrap_or(current_y));
        }
    }

    fn image(&mut self, path: &Path, options: ImageOptions) -> Result<(), CanvasError> {
        let (pixels_wide, pixels_high) =
            image::image_dimensions(path).map_err(|source| CanvasError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        let dpi = IMAGE_DPI * options.multiply_dpi.unwrap_or(1.0);
        let width = f64::from(pixels_wide) * 72.0 / dpi;
        let height = f64::from(pixels_high) * 72.0 / dpi;

        if options.inline {
            self.reserve(height);
        } else {
            if self.x > self.margins.left + f64::EPSILON {
                self.new_line(self.last_height);
            }
            self.reserve(height);
        }
        self.push_op(DrawOp::Image(ImageOp {
            path: path.to_path_buf(),
            x: self.x,
            y: self.y,
            width,
            height,
        }));
        if options.inline {
            self.x += width;
        } else {
            self.new_line(height);
        }
        Ok(())
    }
}
