//! The container-stack renderer.
//!
//! [`Renderer`] consumes the enter/leave events of a document walk and turns
//! each one into canvas operations. All cross-node state lives here: the
//! container stack, the anchor registry, the table layout state and a few
//! renderer-wide flags. One renderer serves one render pass.

use std::path::PathBuf;

use serde::Serialize;

use crate::document::{Node, NodeKind};
use crate::perf;

use super::anchors::AnchorRegistry;
use super::canvas::Canvas;
use super::error::RenderError;
use super::image::{FsLocator, ImageLocator};
use super::stack::{ContainerKind, ContainerStack, ContainerState};
use super::style::{Style, StyleSheet};
use super::table::TableLayout;

/// Nesting indent for lists and block quotes, in ems.
pub const INDENT_EMS: f64 = 3.0;
/// Width of the bullet/ordinal column of a list item, in ems.
pub const BULLET_EMS: f64 = 3.0;
/// Offset of list item text from the item's margin, in ems.
pub const ITEM_TEXT_EMS: f64 = 4.0;

/// Renderer configuration, fixed for the whole pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    pub styles: StyleSheet,
    /// Prepended to image destinations for the primary lookup.
    pub local_path_prefix: String,
    /// Prepended to image destinations when the primary lookup fails.
    pub alternative_image_prefix: String,
}

/// An image that was not drawn: no candidate path could be opened, or the
/// file it resolved to could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedImage {
    pub destination: String,
    pub path: PathBuf,
}

/// Outcome of a completed render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub skipped_images: Vec<SkippedImage>,
    /// Number of distinct link targets allocated.
    pub anchors: usize,
}

/// Transient flags shared across handlers.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct Flags {
    /// Text was just emitted on the current line (images then flow inline).
    pub in_text: bool,
    pub in_image: bool,
    /// Strip leading spaces from the next text run.
    pub trim_next: bool,
    /// The current paragraph has not emitted any text yet.
    pub paragraph_unprocessed: bool,
    pub strong_on: bool,
}

/// Walks a document and emits it onto a [`Canvas`].
pub struct Renderer<'c, C: Canvas, L: ImageLocator = FsLocator> {
    pub(super) canvas: &'c mut C,
    pub(super) styles: StyleSheet,
    pub(super) stack: ContainerStack,
    pub(super) anchors: AnchorRegistry<C::LinkId>,
    pub(super) table: TableLayout,
    pub(super) flags: Flags,
    /// Style of the heading being rendered; links inside take its size.
    pub(super) current_heading: Option<Style>,
    /// One entry per open emphasis: did it set the italic flag?
    pub(super) emphasis: Vec<bool>,
    /// One entry per open strong: did it set the bold flag?
    pub(super) strong: Vec<bool>,
    pub(super) em: f64,
    pub(super) indent: f64,
    pub(super) locator: L,
    pub(super) local_path_prefix: String,
    pub(super) alternative_image_prefix: String,
    pub(super) skipped: Vec<SkippedImage>,
}

impl<'c, C: Canvas> Renderer<'c, C> {
    /// Create a renderer that resolves images on the local filesystem.
    pub fn new(canvas: &'c mut C, options: RenderOptions) -> Self {
        Self::with_locator(canvas, options, FsLocator)
    }
}

impl<'c, C: Canvas, L: ImageLocator> Renderer<'c, C, L> {
    /// Create a renderer with a custom image locator.
    ///
    /// The em unit is measured in the body style and the root frame takes
    /// the canvas's current left margin.
    pub fn with_locator(canvas: &'c mut C, options: RenderOptions, locator: L) -> Self {
        let RenderOptions {
            styles,
            local_path_prefix,
            alternative_image_prefix,
        } = options;
        canvas.set_style(&styles.normal);
        let em = canvas.string_width("m");
        let root = ContainerState::new(ContainerKind::Root, styles.normal, canvas.left_margin());
        tracing::debug!(em, margin = root.left_margin, "renderer initialized");

        Self {
            canvas,
            styles,
            stack: ContainerStack::new(root),
            anchors: AnchorRegistry::default(),
            table: TableLayout::default(),
            flags: Flags::default(),
            current_heading: None,
            emphasis: Vec::new(),
            strong: Vec::new(),
            em,
            indent: INDENT_EMS * em,
            locator,
            local_path_prefix,
            alternative_image_prefix,
            skipped: Vec::new(),
        }
    }

    /// Render a whole document tree.
    ///
    /// # Errors
    /// Returns the first canvas error; the canvas is left as it was at that point.
    pub fn render(&mut self, document: &Node) -> Result<RenderReport, RenderError> {
        let _scope = perf::scope("render.document");
        document.walk(&mut |node: &Node, entering: bool| self.handle(node, entering))?;
        Ok(RenderReport {
            skipped_images: std::mem::take(&mut self.skipped),
            anchors: self.anchors.allocated(),
        })
    }

    /// Process a single enter/leave event.
    ///
    /// # Errors
    /// Returns an error if the canvas fails to emit output.
    pub fn handle(&mut self, node: &Node, entering: bool) -> Result<(), RenderError> {
        match node.kind() {
            NodeKind::Document | NodeKind::Strikethrough => {
                self.tracer(node.kind().name(), if entering { "entering" } else { "leaving" });
                Ok(())
            }
            NodeKind::Text(literal) => self.process_text(literal),
            NodeKind::Hardbreak => {
                self.tracer("Hardbreak", "");
                if self.stack.contains(ContainerKind::TableCell) {
                    self.table.push_text(" ");
                    return Ok(());
                }
                self.cr()
            }
            NodeKind::Emph => {
                self.process_emph(entering);
                Ok(())
            }
            NodeKind::Strong => {
                self.process_strong(entering);
                Ok(())
            }
            NodeKind::Link { destination, title } => {
                self.process_link(destination, title, entering);
                Ok(())
            }
            NodeKind::Image { destination, title } => {
                self.process_image(destination, title, entering)
            }
            NodeKind::Code(literal) => self.process_code(literal),
            NodeKind::CodeBlock { info, literal } => self.process_code_block(info, literal),
            NodeKind::Paragraph => self.process_paragraph(entering),
            NodeKind::Heading { level, id } => self.process_heading(*level, id, entering),
            NodeKind::BlockQuote => self.process_block_quote(entering),
            NodeKind::HorizontalRule => self.process_horizontal_rule(),
            NodeKind::HtmlBlock(literal) => self.process_html_block(literal),
            NodeKind::List { kind } => self.process_list(*kind, entering),
            NodeKind::Item => self.process_item(entering),
            NodeKind::Table => self.process_table(entering),
            NodeKind::TableHead => {
                self.process_table_head(entering);
                Ok(())
            }
            NodeKind::TableBody => self.process_table_body(entering),
            NodeKind::TableRow => self.process_table_row(entering),
            NodeKind::TableCell { header } => self.process_table_cell(*header, entering),
        }
    }

    /// Number of frames on the container stack, root included.
    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Width of `m` in the body style.
    pub const fn em(&self) -> f64 {
        self.em
    }

    /// Left margin increase for each nesting level.
    pub const fn indent(&self) -> f64 {
        self.indent
    }

    /// Handle for `key`, allocated on the canvas the first time it is needed.
    pub(super) fn anchor(&mut self, key: &str) -> C::LinkId {
        let Self {
            anchors, canvas, ..
        } = self;
        anchors.resolve(key, || canvas.add_link())
    }

    /// Line break at the line height of the innermost frame's style.
    pub(super) fn cr(&mut self) -> Result<(), RenderError> {
        let height = self.stack.peek().text_style.line_height();
        self.tracer("cr()", format!("LH={height}"));
        self.canvas.write(height, "\n")?;
        Ok(())
    }

    pub(super) fn write(&mut self, style: &Style, text: &str) -> Result<(), RenderError> {
        self.canvas.write(style.line_height(), text)?;
        Ok(())
    }

    /// Restore the canvas margin to the one stored in the top frame.
    pub(super) fn restore_margin(&mut self) {
        let margin = self.stack.peek().left_margin;
        self.canvas.set_left_margin(margin);
    }

    pub(super) fn tracer(&self, source: &str, detail: impl AsRef<str>) {
        let detail = detail.as_ref();
        tracing::trace!(target: "pagemark::render", depth = self.stack.depth(), "{source}: {detail}");
        perf::log_event(source, detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PageCanvas;
    use crate::document::{ListKind, parse};

    fn render_depth(markdown: &str) -> (usize, f64) {
        let tree = parse(markdown);
        let mut canvas = PageCanvas::default();
        let depth = {
            let mut renderer = Renderer::new(&mut canvas, RenderOptions::default());
            renderer.render(&tree).unwrap();
            renderer.stack_depth()
        };
        (depth, canvas.left_margin())
    }

    #[test]
    fn test_em_and_indent_from_body_style() {
        let mut canvas = PageCanvas::default();
        let renderer = Renderer::new(&mut canvas, RenderOptions::default());
        assert!((renderer.em() - 6.0).abs() < 1e-9);
        assert!((renderer.indent() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_document_renders_nothing() {
        let tree = parse("");
        let mut canvas = PageCanvas::default();
        let report = Renderer::new(&mut canvas, RenderOptions::default())
            .render(&tree)
            .unwrap();
        assert_eq!(report, RenderReport::default());
        assert_eq!(canvas.finish().ops().count(), 0);
    }

    #[test]
    fn test_stack_returns_to_root_for_sample() {
        let (depth, margin) = render_depth(
            "# T\n\n> q\n\n- a\n  1. b\n\n| h |\n|---|\n| c |\n\n[l](#t) **s** *e*\n",
        );
        assert_eq!(depth, 1);
        assert!((margin - crate::canvas::DEFAULT_MARGIN).abs() < 1e-9);
    }

    /// Render `tree` one event at a time, checking that every list, item,
    /// block quote and table leaves the canvas margin where its enter found it.
    fn nested_margins_restored(tree: &Node) -> Result<(), String> {
        let mut canvas = PageCanvas::default();
        let mut renderer = Renderer::new(&mut canvas, RenderOptions::default());
        let mut open = Vec::new();
        tree.walk(&mut |node: &Node, entering: bool| {
            let nests = matches!(
                node.kind(),
                NodeKind::List { .. } | NodeKind::Item | NodeKind::BlockQuote | NodeKind::Table
            );
            if nests && entering {
                open.push(renderer.canvas.left_margin());
            }
            renderer.handle(node, entering).map_err(|err| err.to_string())?;
            if nests && !entering {
                let before = open
                    .pop()
                    .ok_or_else(|| format!("unbalanced {}", node.kind().name()))?;
                let after = renderer.canvas.left_margin();
                if before.to_bits() != after.to_bits() {
                    return Err(format!(
                        "{} left margin {before} on enter, {after} after leave",
                        node.kind().name()
                    ));
                }
            }
            Ok(())
        })
    }

    #[test]
    fn test_item_margin_restored_after_nested_blocks() {
        for markdown in [
            "- first\n\n  > quoted\n\n  after\n",
            "- first\n  - inner\n\n  after\n",
            "1. a\n\n   | h |\n   |---|\n   | c |\n\n   b\n",
        ] {
            assert_eq!(nested_margins_restored(&parse(markdown)), Ok(()), "{markdown:?}");
        }
    }

    #[test]
    fn test_definition_items_draw_no_marker() {
        let tree = parse("Term\n\n: Details\n");
        assert!(matches!(
            tree.children()[0].kind(),
            NodeKind::List {
                kind: ListKind::Definition
            }
        ));
        let mut canvas = PageCanvas::default();
        Renderer::new(&mut canvas, RenderOptions::default())
            .render(&tree)
            .unwrap();
        assert_eq!(canvas.finish().cells().count(), 0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn paragraph() -> impl Strategy<Value = Node> {
            prop::collection::vec(("[a-z]{1,8}", 0..3u8), 1..4).prop_map(|runs| {
                let children = runs
                    .into_iter()
                    .map(|(word, wrap)| {
                        let text = Node::text(format!("{word} "));
                        match wrap {
                            1 => Node::with_children(NodeKind::Strong, vec![text]),
                            2 => Node::with_children(NodeKind::Emph, vec![text]),
                            _ => text,
                        }
                    })
                    .collect();
                Node::with_children(NodeKind::Paragraph, children)
            })
        }

        fn table() -> impl Strategy<Value = Node> {
            (1..4usize, 0..4usize).prop_map(|(columns, rows)| {
                let row = |header: bool| {
                    let cells = (0..columns)
                        .map(|i| {
                            Node::with_children(
                                NodeKind::TableCell { header },
                                vec![Node::text(format!("c{i}"))],
                            )
                        })
                        .collect();
                    Node::with_children(NodeKind::TableRow, cells)
                };
                let head = Node::with_children(NodeKind::TableHead, vec![row(true)]);
                let body =
                    Node::with_children(NodeKind::TableBody, (0..rows).map(|_| row(false)).collect());
                Node::with_children(NodeKind::Table, vec![head, body])
            })
        }

        fn block() -> impl Strategy<Value = Node> {
            let leaf = prop_oneof![
                4 => paragraph(),
                1 => table(),
                1 => Just(Node::new(NodeKind::HorizontalRule)),
            ];
            leaf.prop_recursive(4, 32, 4, |inner| {
                let kind = prop_oneof![
                    Just(ListKind::Unordered),
                    Just(ListKind::Ordered),
                    Just(ListKind::Definition),
                ];
                prop_oneof![
                    prop::collection::vec(inner.clone(), 1..3)
                        .prop_map(|children| Node::with_children(NodeKind::BlockQuote, children)),
                    (kind, prop::collection::vec(prop::collection::vec(inner, 1..3), 1..4))
                        .prop_map(|(kind, items)| {
                            let items = items
                                .into_iter()
                                .map(|children| Node::with_children(NodeKind::Item, children))
                                .collect();
                            Node::with_children(NodeKind::List { kind }, items)
                        }),
                ]
            })
        }

        fn ordinals(canvas: PageCanvas) -> Vec<String> {
            canvas
                .finish()
                .cells()
                .filter(|c| c.text.ends_with('.'))
                .map(|c| c.text.clone())
                .collect()
        }

        proptest! {
            #[test]
            fn stack_and_margin_restored(blocks in prop::collection::vec(block(), 0..5)) {
                let tree = Node::with_children(NodeKind::Document, blocks);
                let mut canvas = PageCanvas::default();
                let before = canvas.left_margin();
                let depth = {
                    let mut renderer = Renderer::new(&mut canvas, RenderOptions::default());
                    renderer.render(&tree).unwrap();
                    renderer.stack_depth()
                };
                prop_assert_eq!(depth, 1);
                prop_assert_eq!(canvas.left_margin().to_bits(), before.to_bits());
            }

            #[test]
            fn every_nested_leave_restores_margin(blocks in prop::collection::vec(block(), 0..5)) {
                let tree = Node::with_children(NodeKind::Document, blocks);
                prop_assert_eq!(nested_margins_restored(&tree), Ok(()));
            }

            #[test]
            fn ordered_items_numbered_in_order(count in 1..30usize) {
                let items = (0..count)
                    .map(|i| {
                        Node::with_children(
                            NodeKind::Item,
                            vec![Node::with_children(
                                NodeKind::Paragraph,
                                vec![Node::text(format!("item {i}"))],
                            )],
                        )
                    })
                    .collect();
                let tree = Node::with_children(
                    NodeKind::Document,
                    vec![Node::with_children(
                        NodeKind::List { kind: ListKind::Ordered },
                        items,
                    )],
                );
                let mut canvas = PageCanvas::default();
                Renderer::new(&mut canvas, RenderOptions::default())
                    .render(&tree)
                    .unwrap();
                let expected: Vec<String> = (1..=count).map(|n| format!("{n}.")).collect();
                prop_assert_eq!(ordinals(canvas), expected);
            }
        }
    }
}
