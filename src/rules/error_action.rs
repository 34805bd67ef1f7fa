//! `$ErrorActionPreference = 'Stop'` must appear at the top level.

use std::path::Path;

use super::{DirectiveMatcher, Rule, evaluate_directive, strip_quotes};
use crate::ast::{NodeId, NodeKind, SyntaxTree};
use crate::config::RuleConfig;
use crate::diagnostic::Diagnostic;
use crate::fallback;
use crate::scope;
use crate::token::Token;

/// Tokens examined after `$ErrorActionPreference` by the token
/// fallback.
pub const ERROR_ACTION_LOOKAHEAD: usize = 8;

const VARIABLE: &str = "ErrorActionPreference";
const VARIABLE_REFERENCE: &str = "$ErrorActionPreference";
const VALUE: &str = "Stop";

/// Requires a top-level `$ErrorActionPreference = 'Stop'`.
///
/// Any quoting of `Stop` is accepted, as is the bare word. Any other
/// value counts as a missing assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorActionStopRule {
    lookahead: usize,
}

impl Default for ErrorActionStopRule {
    fn default() -> Self {
        Self {
            lookahead: ERROR_ACTION_LOOKAHEAD,
        }
    }
}

impl ErrorActionStopRule {
    pub const ID: &'static str = "ErrorActionStopRule";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the token fallback window.
    #[must_use]
    pub const fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    #[must_use]
    pub const fn lookahead(&self) -> usize {
        self.lookahead
    }

    fn assignment_matches(tree: &SyntaxTree, assignment: NodeId) -> bool {
        if !matches!(tree.kind(assignment), NodeKind::Assignment { operator } if operator == "=") {
            return false;
        }
        let [target, value] = tree.children(assignment) else {
            return false;
        };
        matches!(
            tree.kind(*target),
            NodeKind::Variable { name } if name.eq_ignore_ascii_case(VARIABLE)
        ) && strip_quotes(tree.text(*value)).eq_ignore_ascii_case(VALUE)
    }

    /// The window after the variable must open with `=` and continue
    /// with `Stop`, ignoring comments, newlines and continuations.
    fn assigns_stop(window: &[Token]) -> bool {
        let mut significant = window.iter().filter(|t| !t.is_trivia());
        if !significant.next().is_some_and(|t| t.is_operator("=")) {
            return false;
        }
        significant
            .next()
            .is_some_and(|value| strip_quotes(&value.text).eq_ignore_ascii_case(VALUE))
    }
}

impl DirectiveMatcher for ErrorActionStopRule {
    fn rule_id(&self) -> &'static str {
        Self::ID
    }

    fn missing_message(&self) -> &'static str {
        "Missing \"$ErrorActionPreference = 'Stop'\" at the top level of the script."
    }

    fn match_tree(&self, tree: &SyntaxTree, root: NodeId) -> Option<NodeId> {
        tree.descendants(root)
            .filter(|&id| matches!(tree.kind(id), NodeKind::Assignment { .. }))
            .filter(|&id| scope::is_top_level(tree, id))
            .find(|&id| Self::assignment_matches(tree, id))
    }

    fn match_tokens(&self, tokens: &[Token]) -> bool {
        fallback::root_level_anchors(tokens).any(|anchor| {
            tokens[anchor].text == VARIABLE_REFERENCE
                && Self::assigns_stop(fallback::window(tokens, anchor, self.lookahead))
        })
    }
}

impl Rule for ErrorActionStopRule {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn description(&self) -> &'static str {
        "Scripts must set $ErrorActionPreference to 'Stop' at the top level."
    }

    fn evaluate(
        &self,
        tree: &SyntaxTree,
        node: NodeId,
        _config: &RuleConfig,
        path: Option<&Path>,
    ) -> Vec<Diagnostic> {
        evaluate_directive(self, tree, node, path)
    }
}
