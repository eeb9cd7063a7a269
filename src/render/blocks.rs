//! Handlers for block-level nodes outside lists and tables.

use crate::document::ListKind;

use super::canvas::{Border, Canvas, Cell, CellBreak, HAlign, PathMode, VAlign};
use super::error::RenderError;
use super::image::ImageLocator;
use super::renderer::Renderer;
use super::stack::{ContainerKind, ContainerState};
use super::style::Rgb;

/// Height of the horizontal rule bar.
const RULE_THICKNESS: f64 = 3.0;
const RULE_COLOR: Rgb = Rgb(200, 200, 200);

impl<C: Canvas, L: ImageLocator> Renderer<'_, C, L> {
    pub(super) fn process_paragraph(&mut self, entering: bool) -> Result<(), RenderError> {
        self.canvas.set_style(&self.styles.normal);
        self.flags.paragraph_unprocessed = true;
        self.flags.trim_next = false;

        let margins = self.canvas.margins();
        self.tracer(
            if entering {
                "Paragraph (entering)"
            } else {
                "Paragraph (leaving)"
            },
            format!(
                "margins (left, top, right, bottom): {} {} {} {}",
                margins.left, margins.top, margins.right, margins.bottom
            ),
        );

        let top = self.stack.peek();
        if top.kind == ContainerKind::Item && top.list_kind != ListKind::NotList {
            let first = top.first_paragraph;
            if entering {
                if !first {
                    self.tracer("Not first paragraph within a list", "indent etc.");
                    self.cr()?;
                }
            } else if first {
                self.stack.peek_mut().first_paragraph = false;
            } else {
                self.cr()?;
            }
            return Ok(());
        }
        self.cr()
    }

    pub(super) fn process_heading(
        &mut self,
        level: u8,
        id: &str,
        entering: bool,
    ) -> Result<(), RenderError> {
        if entering {
            self.cr()?;
            let style = self.styles.heading(level);
            self.tracer(
                &format!("Heading ({level}, entering)"),
                format!("id={id}"),
            );
            tracing::debug!(level, id, "heading");
            self.current_heading = Some(style);
            let frame =
                ContainerState::new(ContainerKind::Heading, style, self.stack.peek().left_margin)
                    .with_anchor(id);
            self.stack.push(frame);
        } else {
            self.current_heading = None;
            self.tracer("Heading (leaving)", "");
            self.cr()?;
            self.stack.pop();
        }
        Ok(())
    }

    pub(super) fn process_block_quote(&mut self, entering: bool) -> Result<(), RenderError> {
        if entering {
            let margin = self.stack.peek().left_margin + self.indent;
            self.tracer("BlockQuote (entering)", format!("left margin {margin}"));
            self.stack.push(ContainerState::new(
                ContainerKind::BlockQuote,
                self.styles.blockquote,
                margin,
            ));
            self.canvas.set_left_margin(margin);
            Ok(())
        } else {
            self.stack.pop();
            self.restore_margin();
            self.tracer(
                "BlockQuote (leaving)",
                format!("left margin {}", self.canvas.left_margin()),
            );
            self.cr()
        }
    }

    pub(super) fn process_horizontal_rule(&mut self) -> Result<(), RenderError> {
        self.tracer("HorizontalRule", "");
        self.cr()?;

        let (x, y) = self.canvas.xy();
        let margins = self.canvas.margins();
        let (page_width, _) = self.canvas.page_size();
        let right = page_width - margins.right;
        self.tracer("... From X,Y", format!("{x},{y}"));
        self.tracer("...   To X,Y", format!("{right},{y}"));

        self.canvas.move_to(x, y);
        self.canvas.line_to(right, y);
        self.canvas.line_to(right, y + RULE_THICKNESS);
        self.canvas.line_to(x, y + RULE_THICKNESS);
        self.canvas.close_path();
        self.canvas.set_fill_color(RULE_COLOR);
        self.canvas.draw_path(PathMode::Fill)?;

        self.cr()
    }

    /// Raw HTML is shown verbatim in a bordered code-styled cell.
    pub(super) fn process_html_block(&mut self, literal: &str) -> Result<(), RenderError> {
        self.tracer("HTMLBlock", literal);
        self.cr()?;
        let style = self.styles.code;
        self.canvas.set_style(&style);
        self.canvas.cell(
            &Cell::new(0.0, style.size, literal)
                .border(Border::ALL)
                .after(CellBreak::NextLine)
                .align(HAlign::Left, VAlign::Top)
                .fill(true),
        )?;
        self.cr()
    }

    pub(super) fn process_code_block(&mut self, info: &str, literal: &str) -> Result<(), RenderError> {
        self.tracer("Codeblock", format!("info={info}"));
        let style = self.styles.code;
        self.canvas.set_style(&style);
        self.cr()?;
        self.canvas
            .multi_cell(0.0, style.line_height(), literal, true)?;
        Ok(())
    }
}
