//! List and item handlers.
//!
//! A list frame holds the list kind and the running item counter; item
//! frames inherit the kind, carry the margin of the item text and start out
//! expecting their first paragraph.
//! Nesting depth is encoded by the stack itself.

use crate::document::ListKind;

use super::canvas::{Canvas, Cell, HAlign, VAlign};
use super::error::RenderError;
use super::image::ImageLocator;
use super::renderer::{BULLET_EMS, ITEM_TEXT_EMS, Renderer};
use super::stack::{ContainerKind, ContainerState};

impl<C: Canvas, L: ImageLocator> Renderer<'_, C, L> {
    pub(super) fn process_list(&mut self, kind: ListKind, entering: bool) -> Result<(), RenderError> {
        self.canvas.set_style(&self.styles.normal);
        if entering {
            let margin = self.stack.peek().left_margin + self.indent;
            self.tracer(
                &format!("{kind} List (entering)"),
                format!("left margin set to {margin}"),
            );
            self.canvas.set_left_margin(margin);
            self.stack.push(
                ContainerState::new(ContainerKind::List, self.styles.normal, margin)
                    .with_list_kind(kind),
            );
            Ok(())
        } else {
            self.stack.pop();
            self.restore_margin();
            self.tracer(
                &format!("{kind} List (leaving)"),
                format!("left margin re-set to {}", self.canvas.left_margin()),
            );
            if !self.stack.contains(ContainerKind::List) {
                self.cr()?;
            }
            Ok(())
        }
    }

    pub(super) fn process_item(&mut self, entering: bool) -> Result<(), RenderError> {
        if entering {
            self.cr()?;
            let list = self.stack.peek();
            let (kind, number, margin) = (list.list_kind, list.item_number + 1, list.left_margin);
            self.tracer(&format!("{kind} Item (entering) #{number}"), "");

            let marker = match kind {
                ListKind::Unordered => Some("*".to_string()),
                ListKind::Ordered => Some(format!("{number}.")),
                ListKind::Definition | ListKind::NotList => None,
            };
            if let Some(marker) = marker {
                self.canvas.cell(
                    &Cell::new(BULLET_EMS * self.em, self.styles.normal.line_height(), &marker)
                        .align(HAlign::Right, VAlign::Bottom),
                )?;
            }

            // Item text starts past the bullet column; nested blocks indent from there.
            let text_margin = margin + ITEM_TEXT_EMS * self.em;
            self.stack.push(
                ContainerState::new(ContainerKind::Item, self.styles.normal, text_margin)
                    .with_list_kind(kind)
                    .with_item_number(number)
                    .with_first_paragraph(),
            );
            self.canvas.set_left_margin(text_margin);
            self.canvas.set_x(text_margin);
            Ok(())
        } else {
            let item = self.stack.pop();
            self.tracer(&format!("{} Item (leaving)", item.list_kind), "");
            self.restore_margin();
            self.cr()?;
            self.stack.peek_mut().item_number += 1;
            Ok(())
        }
    }
}
