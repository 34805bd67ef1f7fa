//! Top-level scope classification.
//!
//! A node is at top level when no function, class or script block
//! expression encloses it. Control-flow bodies (`if`, `try`, loops)
//! share the enclosing scope and do not count.

use crate::ast::{NodeId, SyntaxTree};

/// True when `id` is the document root or sits in the root scope.
#[must_use]
pub fn is_top_level(tree: &SyntaxTree, id: NodeId) -> bool {
    let mut current = tree.parent(id);
    while let Some(ancestor) = current {
        let node = tree.node(ancestor);
        // the root itself is never a boundary
        if node.parent().is_none() {
            return true;
        }
        if node.kind.opens_scope() {
            return false;
        }
        current = node.parent();
    }
    true
}

/// The scope-opening ancestor closest to `id`, if any.
#[must_use]
pub fn enclosing_scope(tree: &SyntaxTree, id: NodeId) -> Option<NodeId> {
    tree.ancestors(id)
        .take_while(|&a| tree.parent(a).is_some())
        .find(|&a| tree.kind(a).opens_scope())
}
