//! The formatting-context stack.

use crate::document::ListKind;

use super::style::Style;

/// The node kind that pushed a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Document-level frame; never popped.
    Root,
    Heading,
    List,
    Item,
    Link,
    BlockQuote,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell,
}

/// One nested formatting scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerState {
    pub kind: ContainerKind,
    /// Style for text emitted directly under this frame (a private copy).
    pub text_style: Style,
    /// Left margin in effect while the frame is active.
    pub left_margin: f64,
    pub list_kind: ListKind,
    /// Running ordinal; the *list* frame's counter advances as items close.
    pub item_number: usize,
    pub first_paragraph: bool,
    /// Link destination (link frames only).
    pub destination: Option<String>,
    /// Heading identifier (heading frames only).
    pub anchor: Option<String>,
    pub is_header: bool,
}

impl ContainerState {
    pub const fn new(kind: ContainerKind, text_style: Style, left_margin: f64) -> Self {
        Self {
            kind,
            text_style,
            left_margin,
            list_kind: ListKind::NotList,
            item_number: 0,
            first_paragraph: false,
            destination: None,
            anchor: None,
            is_header: false,
        }
    }

    #[must_use]
    pub const fn with_list_kind(mut self, list_kind: ListKind) -> Self {
        self.list_kind = list_kind;
        self
    }

    #[must_use]
    pub const fn with_item_number(mut self, item_number: usize) -> Self {
        self.item_number = item_number;
        self
    }

    #[must_use]
    pub const fn with_first_paragraph(mut self) -> Self {
        self.first_paragraph = true;
        self
    }

    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    #[must_use]
    pub const fn with_header(mut self, is_header: bool) -> Self {
        self.is_header = is_header;
        self
    }
}

/// Stack of [`ContainerState`] frames with a permanent root.
#[derive(Debug, Clone)]
pub struct ContainerStack {
    frames: Vec<ContainerState>,
}

impl ContainerStack {
    /// Create a stack holding only `root`.
    pub fn new(root: ContainerState) -> Self {
        Self { frames: vec![root] }
    }

    pub fn push(&mut self, frame: ContainerState) {
        self.frames.push(frame);
    }

    /// Remove and return the top frame.
    ///
    /// # Panics
    /// Panics when only the root frame remains; handlers pop exactly what
    /// they pushed, so this indicates unbalanced enter/leave events.
    pub fn pop(&mut self) -> ContainerState {
        assert!(self.frames.len() > 1, "attempted to pop the root frame");
        let top = self.frames.len() - 1;
        self.frames.remove(top)
    }

    pub fn peek(&self) -> &ContainerState {
        &self.frames[self.frames.len() - 1]
    }

    pub fn peek_mut(&mut self) -> &mut ContainerState {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    /// The frame directly below the top, if any.
    pub fn parent(&self) -> Option<&ContainerState> {
        self.frames.len().checked_sub(2).map(|i| &self.frames[i])
    }

    /// Number of frames including the root.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True if any frame of `kind` is on the stack.
    pub fn contains(&self, kind: ContainerKind) -> bool {
        self.frames.iter().any(|frame| frame.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::style::FontFlags;

    fn root() -> ContainerState {
        ContainerState::new(ContainerKind::Root, Style::default(), 28.0)
    }

    #[test]
    fn test_push_peek_parent() {
        let mut stack = ContainerStack::new(root());
        assert!(stack.parent().is_none());
        stack.push(
            ContainerState::new(ContainerKind::List, Style::default(), 50.0)
                .with_list_kind(ListKind::Ordered),
        );
        stack.push(ContainerState::new(ContainerKind::Item, Style::default(), 50.0));
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.peek().kind, ContainerKind::Item);
        assert_eq!(stack.parent().map(|f| f.kind), Some(ContainerKind::List));

        stack.pop();
        stack.peek_mut().item_number += 1;
        assert_eq!(stack.peek().item_number, 1);
        assert!(stack.contains(ContainerKind::List));
    }

    #[test]
    fn test_pop_returns_top_and_restores_parent() {
        let mut stack = ContainerStack::new(root());
        stack.push(ContainerState::new(
            ContainerKind::BlockQuote,
            Style::default(),
            60.0,
        ));
        let popped = stack.pop();
        assert_eq!(popped.kind, ContainerKind::BlockQuote);
        assert!((stack.peek().left_margin - 28.0).abs() < f64::EPSILON);
    }

    #[test]
    #[should_panic(expected = "root frame")]
    fn test_popping_root_panics() {
        let mut stack = ContainerStack::new(root());
        stack.pop();
    }

    #[test]
    fn test_frame_style_is_independent_copy() {
        let base = Style::default();
        let mut stack = ContainerStack::new(ContainerState::new(ContainerKind::Root, base, 0.0));
        stack.peek_mut().text_style.flags.insert(FontFlags::BOLD);
        assert!(base.flags.is_empty());
        assert!(!stack.peek().text_style.flags.is_empty());
    }
}
