//! `Set-StrictMode -Version 3` must appear at the top level.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{DirectiveMatcher, Rule, evaluate_directive, strip_quotes};
use crate::ast::{NodeId, NodeKind, SyntaxTree};
use crate::config::RuleConfig;
use crate::diagnostic::Diagnostic;
use crate::fallback;
use crate::scope;
use crate::token::{Token, TokenKind};

/// Tokens examined after `Set-StrictMode` by the token fallback.
pub const STRICT_MODE_LOOKAHEAD: usize = 6;

const COMMAND: &str = "Set-StrictMode";

/// A bare or dotted version with major version 3: `3`, `3.0`, `'3.1'`,
/// `-Version:3`.
static VERSION_3: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s:'"\x{2018}-\x{201E}])3(?:\.\d+)*(?:$|[\s'"\x{2018}-\x{201E}])"#).unwrap()
});

/// Whether the argument text of a `Set-StrictMode` call selects
/// version 3.
#[must_use]
pub fn is_version_3(arguments: &str) -> bool {
    VERSION_3.is_match(arguments)
}

/// Requires a top-level `Set-StrictMode` call with version 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictModeVersionRule {
    lookahead: usize,
}

impl Default for StrictModeVersionRule {
    fn default() -> Self {
        Self {
            lookahead: STRICT_MODE_LOOKAHEAD,
        }
    }
}

impl StrictModeVersionRule {
    pub const ID: &'static str = "StrictModeVersionRule";

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

    fn command_matches(tree: &SyntaxTree, command: NodeId) -> bool {
        let Some((&name, arguments)) = tree.children(command).split_first() else {
            return false;
        };
        if !matches!(tree.kind(name), NodeKind::StringConstant { .. })
            || !strip_quotes(tree.text(name)).eq_ignore_ascii_case(COMMAND)
        {
            return false;
        }
        let arguments = arguments
            .iter()
            .map(|&arg| tree.text(arg))
            .collect::<Vec<_>>()
            .join(" ");
        is_version_3(&arguments)
    }

    /// Argument text following the command token at `anchor`, up to
    /// the end of the statement or the end of the window.
    fn token_arguments(&self, tokens: &[Token], anchor: usize) -> String {
        fallback::window(tokens, anchor, self.lookahead)
            .iter()
            .take_while(|t| !ends_statement(t))
            .filter(|t| !t.is_trivia())
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn ends_statement(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Newline | TokenKind::Semicolon | TokenKind::OpenBrace | TokenKind::CloseBrace
    ) || token.is_operator("|")
}

impl DirectiveMatcher for StrictModeVersionRule {
    fn rule_id(&self) -> &'static str {
        Self::ID
    }

    fn missing_message(&self) -> &'static str {
        "Missing 'Set-StrictMode -Version 3.0' at the top level of the script."
    }

    fn match_tree(&self, tree: &SyntaxTree, root: NodeId) -> Option<NodeId> {
        tree.descendants(root)
            .filter(|&id| matches!(tree.kind(id), NodeKind::Command { .. }))
            .filter(|&id| Self::command_matches(tree, id))
            .find(|&id| scope::is_top_level(tree, id))
    }

    fn match_tokens(&self, tokens: &[Token]) -> bool {
        fallback::root_level_anchors(tokens).any(|anchor| {
            tokens[anchor].text.eq_ignore_ascii_case(COMMAND)
                && is_version_3(&self.token_arguments(tokens, anchor))
        })
    }
}

impl Rule for StrictModeVersionRule {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn description(&self) -> &'static str {
        "Scripts must enable 'Set-StrictMode -Version 3.0' at the top level."
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
