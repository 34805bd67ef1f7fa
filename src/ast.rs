use serde::{Deserialize, Serialize};

use crate::token::{Position, QuoteKind};

/// Source range of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub start: Position,
    pub end: Position,
}

/// Index of a node inside its `SyntaxTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// `&` or `.` in front of a command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationOperator {
    Ampersand,
    Dot,
}

/// Structural kind of a syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The whole document.
    ScriptBlock,
    /// `function Name { ... }`, also `filter` and `workflow`.
    FunctionDefinition { name: String },
    /// `class Name { ... }` or `enum Name { ... }`.
    TypeDefinition { name: String },
    /// `{ ... }` in expression position.
    ScriptBlockExpression,
    /// Body of a control-flow construct. Shares the enclosing scope.
    StatementBlock,
    /// `if`, `foreach`, `try` and friends, with all their clauses.
    ControlStatement { keyword: String },
    /// One or more commands joined by `|`.
    Pipeline,
    /// Command invocation; the first child is the command name.
    Command {
        invocation: Option<InvocationOperator>,
    },
    /// Pipeline element that starts with an expression.
    CommandExpression,
    /// `<variable> <op> <pipeline>`; children are target then value.
    Assignment { operator: String },
    Variable { name: String },
    /// Bare word (`quote: None`) or quoted string.
    StringConstant { quote: Option<QuoteKind> },
    Number,
    Parameter { name: String },
    Operator,
    /// `( ... )`, `$( ... )` or `@( ... )`.
    SubExpression,
    /// `@{ ... }`, contents are not parsed.
    HashLiteral,
    /// `[TypeName]`
    TypeLiteral,
}

impl NodeKind {
    /// Constructs whose body is a scope of its own.
    #[must_use]
    pub const fn opens_scope(&self) -> bool {
        matches!(
            self,
            Self::FunctionDefinition { .. } | Self::TypeDefinition { .. } | Self::ScriptBlockExpression
        )
    }
}

/// A node of the syntax tree.
///
/// Children are owned by the tree; `parent` is a plain index used for
/// navigation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub extent: Extent,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Parsed PowerShell document.
///
/// Nodes live in an arena indexed by `NodeId`; the root is always the
/// first node and is the only one without a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub(crate) fn new(source: &str) -> Self {
        let end = end_position(source);
        Self {
            source: source.to_string(),
            nodes: vec![Node {
                kind: NodeKind::ScriptBlock,
                extent: Extent {
                    start: Position::START,
                    end,
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub(crate) fn push(&mut self, kind: NodeKind, parent: NodeId, start: Position) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            extent: Extent { start, end: start },
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn set_end(&mut self, id: NodeId, end: Position) {
        self.nodes[id.0].extent.end = end;
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Look up a node.
    ///
    /// Panics if `id` belongs to another tree and is out of range.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Source text covered by the node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> &str {
        let extent = self.nodes[id.0].extent;
        self.source
            .get(extent.start.offset..extent.end.offset)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk of `id` and everything below it, in document
    /// order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Parent chain of `id`, nearest first, excluding `id` itself.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }
}

/// Iterator returned by [`SyntaxTree::descendants`].
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Iterator returned by [`SyntaxTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.parent(id);
        Some(id)
    }
}

fn end_position(source: &str) -> Position {
    let bom = usize::from(source.starts_with('\u{FEFF}'));
    let mut line = 1;
    let mut column = 1;
    for ch in source.chars().skip(bom) {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Position {
        offset: source.len(),
        line,
        column,
    }
}
