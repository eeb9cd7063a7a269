//! Markdown parsing with comrak.

use std::collections::HashMap;

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{Arena, Options, parse_document};

use super::types::{ListKind, Node, NodeKind};

/// Parse markdown source into a document tree.
///
/// # Example
///
/// ```
/// use pagemark::document::{parse, NodeKind};
///
/// let doc = parse("# Hello\n\nWorld");
/// assert!(matches!(doc.kind(), NodeKind::Document));
/// assert_eq!(doc.children().len(), 2);
/// ```
pub fn parse(source: &str) -> Node {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let mut slugs = SlugCounter::default();
    let mut document = Node::new(NodeKind::Document);
    for child in root.children() {
        convert_into(child, &mut document, &mut slugs);
    }
    document
}

fn create_options() -> Options {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.description_lists = true;

    options
}

/// Convert `node` and append the result(s) to `parent`.
///
/// Wrapper nodes without a layout meaning of their own are flattened:
/// their children are appended directly to `parent`.
fn convert_into<'a>(node: &'a AstNode<'a>, parent: &mut Node, slugs: &mut SlugCounter) {
    let kind = match &node.data.borrow().value {
        NodeValue::Paragraph => NodeKind::Paragraph,
        NodeValue::Heading(heading) => NodeKind::Heading {
            level: heading.level.clamp(1, 6),
            id: slugs.unique(&slugify(&inline_text(node))),
        },
        NodeValue::Text(t) => {
            parent.push(Node::text(t.clone()));
            return;
        }
        NodeValue::HtmlInline(html) => {
            parent.push(Node::text(html.clone()));
            return;
        }
        NodeValue::SoftBreak => {
            parent.push(Node::text("\n"));
            return;
        }
        NodeValue::LineBreak => {
            parent.push(Node::new(NodeKind::Hardbreak));
            return;
        }
        NodeValue::Code(code) => {
            parent.push(Node::new(NodeKind::Code(code.literal.clone())));
            return;
        }
        NodeValue::CodeBlock(block) => {
            parent.push(Node::new(NodeKind::CodeBlock {
                info: block.info.clone(),
                literal: block.literal.clone(),
            }));
            return;
        }
        NodeValue::HtmlBlock(block) => {
            parent.push(Node::new(NodeKind::HtmlBlock(block.literal.clone())));
            return;
        }
        NodeValue::ThematicBreak => {
            parent.push(Node::new(NodeKind::HorizontalRule));
            return;
        }
        NodeValue::Emph => NodeKind::Emph,
        NodeValue::Strong => NodeKind::Strong,
        NodeValue::Strikethrough => NodeKind::Strikethrough,
        NodeValue::Link(link) => NodeKind::Link {
            destination: link.url.clone(),
            title: link.title.clone(),
        },
        NodeValue::Image(link) => NodeKind::Image {
            destination: link.url.clone(),
            title: link.title.clone(),
        },
        NodeValue::BlockQuote => NodeKind::BlockQuote,
        NodeValue::List(list) => NodeKind::List {
            kind: match list.list_type {
                ListType::Bullet => ListKind::Unordered,
                ListType::Ordered => ListKind::Ordered,
            },
        },
        NodeValue::DescriptionList => NodeKind::List {
            kind: ListKind::Definition,
        },
        NodeValue::Item(_) | NodeValue::TaskItem(_) | NodeValue::DescriptionItem(_) => {
            NodeKind::Item
        }
        NodeValue::Table(_) => {
            parent.push(convert_table(node, slugs));
            return;
        }
        NodeValue::FrontMatter(_) => return,
        _ => {
            // Description terms/details, footnotes and the like
            for child in node.children() {
                convert_into(child, parent, slugs);
            }
            return;
        }
    };

    let mut converted = Node::new(kind);
    for child in node.children() {
        convert_into(child, &mut converted, slugs);
    }
    parent.push(converted);
}

/// Tables arrive as rows; group them into a head and a body.
fn convert_table<'a>(table_node: &'a AstNode<'a>, slugs: &mut SlugCounter) -> Node {
    let mut head = Node::new(NodeKind::TableHead);
    let mut body = Node::new(NodeKind::TableBody);

    for row_node in table_node.children() {
        let is_header_row = match row_node.data.borrow().value {
            NodeValue::TableRow(header) => header,
            _ => continue,
        };

        let mut row = Node::new(NodeKind::TableRow);
        for cell_node in row_node.children() {
            if !matches!(cell_node.data.borrow().value, NodeValue::TableCell) {
                continue;
            }
            let mut cell = Node::new(NodeKind::TableCell {
                header: is_header_row,
            });
            for child in cell_node.children() {
                convert_into(child, &mut cell, slugs);
            }
            row.push(cell);
        }

        if is_header_row {
            head.push(row);
        } else {
            body.push(row);
        }
    }

    let mut table = Node::new(NodeKind::Table);
    if !head.children().is_empty() {
        table.push(head);
    }
    if !body.children().is_empty() {
        table.push(body);
    }
    table
}

fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    inline_text_recursive(node, &mut text);
    text
}

fn inline_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(c) => text.push_str(&c.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
        _ => {
            for child in node.children() {
                inline_text_recursive(child, text);
            }
        }
    }
}

/// GitHub-style heading slug: lowercase, punctuation dropped, spaces to `-`.
pub fn slugify(text: &str) -> String {
    let mut out = String::new();
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if ch == '-' || ch == '_' {
            out.push(ch);
        } else if ch.is_whitespace() {
            out.push('-');
        }
    }
    out
}

/// Hands out unique ids for repeated heading slugs (`a`, `a-1`, `a-2`).
#[derive(Debug, Default)]
struct SlugCounter {
    seen: HashMap<String, usize>,
}

impl SlugCounter {
    fn unique(&mut self, slug: &str) -> String {
        let count = self.seen.entry(slug.to_string()).or_insert(0);
        let id = if *count == 0 {
            slug.to_string()
        } else {
            format!("{slug}-{count}")
        };
        *count += 1;
        // A generated `a-1` must not collide with a literal heading `a-1` later.
        if id != slug {
            self.seen.entry(id.clone()).or_insert(1);
        }
        id
    }
}
