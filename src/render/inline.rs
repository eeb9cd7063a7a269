//! Handlers for inline nodes.

use crate::document::ListKind;

use super::anchors::{has_url_scheme, heading_key};
use super::canvas::{Canvas, CanvasError, ImageOptions};
use super::error::RenderError;
use super::image::{ImageLocator, resolve_image};
use super::renderer::{Renderer, SkippedImage};
use super::stack::{ContainerKind, ContainerState};
use super::style::FontFlags;

impl<C: Canvas, L: ImageLocator> Renderer<'_, C, L> {
    pub(super) fn process_text(&mut self, literal: &str) -> Result<(), RenderError> {
        if self.flags.in_image {
            return Ok(());
        }

        self.flags.in_text = false;
        let style = self.stack.peek().text_style;
        self.canvas.set_style(&style);
        let mut text = literal.replace('\n', " ");
        if self.flags.trim_next {
            text = text.trim_start_matches(' ').to_string();
            self.flags.trim_next = false;
        }
        self.tracer("Text", &text);

        // Cell text, links included, is drawn as one cell when the cell closes.
        if self.stack.contains(ContainerKind::TableCell) {
            self.flags.in_text = true;
            self.table.push_text(&text);
            return Ok(());
        }

        let top = self.stack.peek();
        let (kind, destination, anchor) = (top.kind, top.destination.clone(), top.anchor.clone());
        match kind {
            ContainerKind::Link => {
                let destination = destination.unwrap_or_default();
                if has_url_scheme(&destination) {
                    self.canvas
                        .write_link(style.line_height(), &text, &destination)?;
                } else {
                    let id = self.anchor(&destination);
                    self.canvas
                        .write_internal_link(style.line_height(), &text, id)?;
                }
            }
            ContainerKind::Heading => {
                self.flags.in_text = true;
                let key = heading_key(anchor.as_deref().unwrap_or_default());
                let id = self.anchor(&key);
                let page = self.canvas.page_number();
                self.canvas.set_link(id, None, page);
                self.write(&style, &text)?;
            }
            _ => {
                self.flags.in_text = !text.is_empty();
                self.write(&style, &text)?;
            }
        }

        self.break_after_bold_lead_in(&text)
    }

    /// A list paragraph whose first text is bold continues on a new line.
    fn break_after_bold_lead_in(&mut self, text: &str) -> Result<(), RenderError> {
        if !self.flags.paragraph_unprocessed
            || self.stack.peek().list_kind == ListKind::NotList
            || text.is_empty()
        {
            return Ok(());
        }
        if self.flags.strong_on {
            self.tracer("First text in list paragraph", text);
            self.flags.trim_next = true;
            self.cr()?;
        }
        self.flags.paragraph_unprocessed = false;
        Ok(())
    }

    pub(super) fn process_emph(&mut self, entering: bool) {
        self.tracer(if entering { "Emph (entering)" } else { "Emph (leaving)" }, "");
        toggle_flag(
            &mut self.stack.peek_mut().text_style.flags,
            FontFlags::ITALIC,
            entering,
            &mut self.emphasis,
        );
    }

    pub(super) fn process_strong(&mut self, entering: bool) {
        self.tracer(if entering { "Strong (entering)" } else { "Strong (leaving)" }, "");
        toggle_flag(
            &mut self.stack.peek_mut().text_style.flags,
            FontFlags::BOLD,
            entering,
            &mut self.strong,
        );
        self.flags.strong_on = entering || !self.strong.is_empty();
    }

    pub(super) fn process_link(&mut self, destination: &str, title: &str, entering: bool) {
        if entering {
            let mut style = self.styles.link;
            if let Some(heading) = self.current_heading {
                style.size = heading.size;
            }
            let frame =
                ContainerState::new(ContainerKind::Link, style, self.stack.peek().left_margin)
                    .with_destination(destination);
            self.stack.push(frame);
            self.tracer(
                "Link (entering)",
                format!("Destination[{destination}] Title[{title}]"),
            );
        } else {
            self.tracer("Link (leaving)", "");
            self.stack.pop();
        }
    }

    pub(super) fn process_image(
        &mut self,
        destination: &str,
        title: &str,
        entering: bool,
    ) -> Result<(), RenderError> {
        self.flags.in_image = entering;
        if !entering {
            self.tracer("Image (leaving)", "");
            return Ok(());
        }

        self.tracer(
            "Image (entering)",
            format!("Destination[{destination}] Title[{title}]"),
        );
        match resolve_image(
            &self.locator,
            &self.local_path_prefix,
            &self.alternative_image_prefix,
            destination,
        ) {
            Ok(resolved) => {
                let options = ImageOptions {
                    multiply_dpi: resolved.multiply_dpi,
                    inline: self.flags.in_text,
                };
                match self.canvas.image(&resolved.path, options) {
                    Err(CanvasError::Image { path, source }) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %source,
                            "can't decode image, skipping"
                        );
                        self.tracer("Image (decode error)", path.display().to_string());
                        self.skipped.push(SkippedImage {
                            destination: destination.to_string(),
                            path,
                        });
                    }
                    other => other?,
                }
            }
            Err(path) => {
                tracing::warn!(path = %path.display(), "can't open image, skipping");
                self.tracer("Image (file error) can't open", path.display().to_string());
                self.skipped.push(SkippedImage {
                    destination: destination.to_string(),
                    path,
                });
            }
        }
        Ok(())
    }

    pub(super) fn process_code(&mut self, literal: &str) -> Result<(), RenderError> {
        self.tracer("Code", literal);
        if self.stack.contains(ContainerKind::TableCell) {
            self.table.push_text(literal);
            return Ok(());
        }
        let style = self.styles.code;
        self.canvas.set_style(&style);
        self.write(&style, literal)
    }
}

/// Set `flag` when an inline container opens and clear it when it closes,
/// unless an enclosing container of the same kind had already set it.
fn toggle_flag(flags: &mut FontFlags, flag: FontFlags, entering: bool, open: &mut Vec<bool>) {
    if entering {
        open.push(!flags.contains(flag));
        flags.insert(flag);
    } else if open.pop().unwrap_or(true) {
        flags.remove(flag);
    }
}
