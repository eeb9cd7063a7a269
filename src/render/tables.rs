//! Table handlers.
//!
//! Header cells measure their text and record the column widths; body rows
//! reuse those widths by column index and alternate their shading. Text runs
//! inside a cell are buffered and the cell is drawn once, when it closes.

use super::canvas::{Border, Canvas, Cell, HAlign, VAlign};
use super::error::RenderError;
use super::image::ImageLocator;
use super::renderer::Renderer;
use super::stack::{ContainerKind, ContainerState};
use super::style::Rgb;

/// Border color of header cells.
const HEADER_BORDER_COLOR: Rgb = Rgb(128, 0, 0);
const HEADER_LINE_WIDTH: f64 = 0.3;
/// Horizontal padding of a header cell around its text, in ems.
const HEADER_PADDING_EMS: f64 = 2.0;

impl<C: Canvas, L: ImageLocator> Renderer<'_, C, L> {
    pub(super) fn process_table(&mut self, entering: bool) -> Result<(), RenderError> {
        if entering {
            self.tracer("Table (entering)", "");
            self.cr()?;
            let margin = self.stack.peek().left_margin;
            self.stack.push(ContainerState::new(
                ContainerKind::Table,
                self.styles.table_header,
                margin,
            ));
            self.table.start_table();
            Ok(())
        } else {
            let total = self.table.total_width();
            self.tracer("Table (leaving)", format!("width {total}"));
            self.canvas
                .cell(&Cell::new(total, 0.0, "").border(Border::TOP))?;
            self.stack.pop();
            self.cr()
        }
    }

    pub(super) fn process_table_head(&mut self, entering: bool) {
        if entering {
            self.tracer("TableHead (entering)", "");
            let margin = self.stack.peek().left_margin;
            self.stack.push(ContainerState::new(
                ContainerKind::TableHead,
                self.styles.table_header,
                margin,
            ));
            self.table.start_head();
        } else {
            self.tracer("TableHead (leaving)", "");
            self.stack.pop();
        }
    }

    pub(super) fn process_table_body(&mut self, entering: bool) -> Result<(), RenderError> {
        if entering {
            self.tracer("TableBody (entering)", "");
            let margin = self.stack.peek().left_margin;
            self.stack.push(ContainerState::new(
                ContainerKind::TableBody,
                self.styles.table_body,
                margin,
            ));
            Ok(())
        } else {
            self.tracer("TableBody (leaving)", "");
            self.stack.pop();
            self.canvas.ln(None)?;
            Ok(())
        }
    }

    pub(super) fn process_table_row(&mut self, entering: bool) -> Result<(), RenderError> {
        if entering {
            self.tracer("TableRow (entering)", "");
            self.table.start_row();
            self.canvas.ln(None)?;
            let parent = self.stack.peek();
            let style = if parent.kind == ContainerKind::TableHead {
                self.styles.table_header
            } else {
                self.styles.table_body
            };
            let margin = parent.left_margin;
            self.stack
                .push(ContainerState::new(ContainerKind::TableRow, style, margin));
        } else {
            self.tracer("TableRow (leaving)", "");
            self.stack.pop();
            self.table.finish_row();
        }
        Ok(())
    }

    pub(super) fn process_table_cell(
        &mut self,
        header: bool,
        entering: bool,
    ) -> Result<(), RenderError> {
        if entering {
            let style = if header {
                self.canvas.set_draw_color(HEADER_BORDER_COLOR);
                self.canvas.set_line_width(HEADER_LINE_WIDTH);
                self.styles.table_header
            } else {
                self.styles.table_body
            };
            self.canvas.set_style(&style);
            let margin = self.stack.peek().left_margin;
            self.stack.push(
                ContainerState::new(ContainerKind::TableCell, style, margin).with_header(header),
            );
            self.table.start_cell();
            self.tracer(
                "TableCell (entering)",
                format!("column {} header={header}", self.table.current_column()),
            );
            return Ok(());
        }

        let frame = self.stack.pop();
        let style = frame.text_style;
        let text = self.table.take_cell_text();
        self.canvas.set_style(&style);
        let height = style.line_height();

        if frame.is_header {
            let width = self.canvas.string_width(&text) + HEADER_PADDING_EMS * self.em;
            self.tracer("TableCell (leaving, header)", format!("[{text}] width {width}"));
            self.table.record_width(width);
            self.canvas.cell(
                &Cell::new(width, height, &text)
                    .border(Border::ALL)
                    .align(HAlign::Center, VAlign::Middle)
                    .fill(true),
            )?;
        } else {
            // Rows wider than the header get columns sized to their own text.
            let width = self
                .table
                .current_width()
                .unwrap_or_else(|| self.canvas.string_width(&text) + HEADER_PADDING_EMS * self.em);
            let fill = self.table.fill();
            self.tracer(
                "TableCell (leaving, body)",
                format!("[{text}] width {width} fill={fill}"),
            );
            self.canvas.cell(
                &Cell::new(width, height, &text)
                    .border(Border::LEFT_RIGHT)
                    .align(HAlign::Left, VAlign::Middle)
                    .fill(fill),
            )?;
        }
        self.table.finish_cell();
        Ok(())
    }
}
