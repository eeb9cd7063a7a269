//! Core document tree types.

/// Kind of list a `List` node (and its items) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Not inside any list.
    NotList,
    Unordered,
    Ordered,
    Definition,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotList => "notlist",
            Self::Unordered => "unordered",
            Self::Ordered => "ordered",
            Self::Definition => "definition",
        };
        f.write_str(name)
    }
}

/// The typed payload of a document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading { level: u8, id: String },
    Text(String),
    Hardbreak,
    Emph,
    Strong,
    Strikethrough,
    Link { destination: String, title: String },
    Image { destination: String, title: String },
    Code(String),
    CodeBlock { info: String, literal: String },
    HtmlBlock(String),
    HorizontalRule,
    BlockQuote,
    List { kind: ListKind },
    Item,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell { header: bool },
}

impl NodeKind {
    /// Containers are visited twice by [`Node::walk`], leaves only once.
    pub const fn is_container(&self) -> bool {
        !matches!(
            self,
            Self::Text(_)
                | Self::Hardbreak
                | Self::Code(_)
                | Self::CodeBlock { .. }
                | Self::HtmlBlock(_)
                | Self::HorizontalRule
        )
    }

    /// Short name used in trace output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::Paragraph => "Paragraph",
            Self::Heading { .. } => "Heading",
            Self::Text(_) => "Text",
            Self::Hardbreak => "Hardbreak",
            Self::Emph => "Emph",
            Self::Strong => "Strong",
            Self::Strikethrough => "Strikethrough",
            Self::Link { .. } => "Link",
            Self::Image { .. } => "Image",
            Self::Code(_) => "Code",
            Self::CodeBlock { .. } => "CodeBlock",
            Self::HtmlBlock(_) => "HTMLBlock",
            Self::HorizontalRule => "HorizontalRule",
            Self::BlockQuote => "BlockQuote",
            Self::List { .. } => "List",
            Self::Item => "Item",
            Self::Table => "Table",
            Self::TableHead => "TableHead",
            Self::TableBody => "TableBody",
            Self::TableRow => "TableRow",
            Self::TableCell { .. } => "TableCell",
        }
    }
}

/// A node of the parsed document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    children: Vec<Node>,
}

impl Node {
    /// Create a node without children.
    pub const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    /// Create a node with the given children.
    pub const fn with_children(kind: NodeKind, children: Vec<Self>) -> Self {
        Self { kind, children }
    }

    /// Shorthand for a text leaf.
    pub fn text(literal: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(literal.into()))
    }

    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Walk the tree depth-first in document order.
    ///
    /// Container nodes are reported entering, then their children, then
    /// leaving. Leaf nodes are reported once, entering. The first error
    /// returned by `visitor` stops the walk.
    ///
    /// # Errors
    /// Returns the first error produced by `visitor`.
    pub fn walk<E>(&self, visitor: &mut impl FnMut(&Self, bool) -> Result<(), E>) -> Result<(), E> {
        visitor(self, true)?;
        if self.kind.is_container() {
            for child in &self.children {
                child.walk(visitor)?;
            }
            visitor(self, false)?;
        }
        Ok(())
    }

    /// Concatenated text of all text leaves below this node.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node.kind() {
        NodeKind::Text(t) | NodeKind::Code(t) => out.push_str(t),
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}
