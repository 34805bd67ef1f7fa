//! Directive rules.
//!
//! Each rule looks for one mandated top-level statement. Detection runs
//! over the syntax tree first; when that fails and the script's path is
//! known, a second, independent pass scans a fresh token stream of the
//! file. A rule reports at most one diagnostic per document.

use std::path::Path;

use log::{debug, trace};

use crate::ast::{NodeId, SyntaxTree};
use crate::config::RuleConfig;
use crate::diagnostic::{Diagnostic, Severity};
use crate::fallback;
use crate::token::Token;

pub mod error_action;
pub mod strict_mode;

pub use error_action::{ERROR_ACTION_LOOKAHEAD, ErrorActionStopRule};
pub use strict_mode::{STRICT_MODE_LOOKAHEAD, StrictModeVersionRule};

/// A rule the host can run against a parsed document.
pub trait Rule: Send + Sync {
    /// Stable identifier reported in diagnostics.
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Judge the document rooted at `node`.
    ///
    /// Returns an empty vector when the rule is satisfied or does not
    /// apply, and a single diagnostic otherwise. `path` enables the
    /// token fallback.
    fn evaluate(
        &self,
        tree: &SyntaxTree,
        node: NodeId,
        config: &RuleConfig,
        path: Option<&Path>,
    ) -> Vec<Diagnostic>;
}

/// The two detection strategies of a directive rule.
pub trait DirectiveMatcher {
    fn rule_id(&self) -> &'static str;

    /// Diagnostic text. Always starts with `Missing`.
    fn missing_message(&self) -> &'static str;

    /// First top-level node under `root` that satisfies the directive.
    fn match_tree(&self, tree: &SyntaxTree, root: NodeId) -> Option<NodeId>;

    /// Whether a root-level occurrence of the directive appears in
    /// `tokens`.
    fn match_tokens(&self, tokens: &[Token]) -> bool;
}

/// Try the syntax tree, then the token fallback, then report.
///
/// Only whole documents are judged: a `node` with a parent yields no
/// diagnostics.
pub fn evaluate_directive<M>(
    matcher: &M,
    tree: &SyntaxTree,
    node: NodeId,
    path: Option<&Path>,
) -> Vec<Diagnostic>
where
    M: DirectiveMatcher + ?Sized,
{
    if tree.parent(node).is_some() {
        return Vec::new();
    }

    if let Some(found) = matcher.match_tree(tree, node) {
        let start = tree.node(found).extent.start;
        trace!(
            "{}: directive found at line {}, column {}",
            matcher.rule_id(),
            start.line,
            start.column
        );
        return Vec::new();
    }

    if let Some(path) = path {
        debug!(
            "{}: not found in syntax tree, scanning tokens of {}",
            matcher.rule_id(),
            path.display()
        );
        if fallback::scan_file(path, |tokens| matcher.match_tokens(tokens)) {
            trace!("{}: directive found by token fallback", matcher.rule_id());
            return Vec::new();
        }
    }

    vec![
        Diagnostic::new(
            matcher.rule_id(),
            Severity::Warning,
            matcher.missing_message(),
            tree.node(node).extent,
        )
        .with_path(path),
    ]
}

const SINGLE_QUOTES: [char; 5] = ['\'', '\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}'];
const DOUBLE_QUOTES: [char; 4] = ['"', '\u{201C}', '\u{201D}', '\u{201E}'];

/// Trim `text` and remove one layer of single or double quotes.
///
/// Typographic quotes pair with their ASCII counterparts, so `‘Stop'`
/// strips like `'Stop'`.
#[must_use]
pub fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    let mut chars = text.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return text;
    };
    for class in [&SINGLE_QUOTES[..], &DOUBLE_QUOTES[..]] {
        if class.contains(&first) && class.contains(&last) {
            return &text[first.len_utf8()..text.len() - last.len_utf8()];
        }
    }
    text
}

/// Every built-in rule with its default settings.
#[must_use]
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(StrictModeVersionRule::default()),
        Box::new(ErrorActionStopRule::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;

    #[test]
    fn strip_one_layer() {
        assert_eq!(strip_quotes("'Stop'"), "Stop");
        assert_eq!(strip_quotes("\"Stop\""), "Stop");
        assert_eq!(strip_quotes("  Stop  "), "Stop");
        assert_eq!(strip_quotes("''Stop''"), "'Stop'");
    }

    #[test]
    fn strip_typographic_quotes() {
        assert_eq!(strip_quotes("\u{2018}Stop\u{2019}"), "Stop");
        assert_eq!(strip_quotes("\u{201C}Stop\u{201D}"), "Stop");
        assert_eq!(strip_quotes("'Stop\u{2019}"), "Stop");
        assert_eq!(strip_quotes("\u{2018}Stop\u{201D}"), "\u{2018}Stop\u{201D}");
    }

    #[test]
    fn mismatched_quotes_are_kept() {
        assert_eq!(strip_quotes("'Stop\""), "'Stop\"");
        assert_eq!(strip_quotes("'"), "'");
        assert_eq!(strip_quotes("''"), "");
    }

    #[test]
    fn builtin_rule_ids() {
        let ids: Vec<_> = builtin_rules().iter().map(|r| r.id()).collect();
        assert_eq!(ids, ["StrictModeVersionRule", "ErrorActionStopRule"]);
    }

    #[test]
    fn builtin_rules_flag_empty_script() {
        let tree = parse_str("").expect("parse");
        for rule in builtin_rules() {
            let diags = rule.evaluate(&tree, tree.root(), &RuleConfig::default(), None);
            assert_eq!(diags.len(), 1, "{}", rule.id());
            assert!(diags[0].message.starts_with("Missing"));
            assert_eq!(diags[0].rule_id, rule.id());
            assert!(!rule.description().is_empty());
        }
    }

    #[test]
    fn sub_tree_is_not_judged() {
        let tree = parse_str("Write-Host hi").expect("parse");
        let child = tree.children(tree.root())[0];
        for rule in builtin_rules() {
            let diags = rule.evaluate(&tree, child, &RuleConfig::default(), None);
            assert!(diags.is_empty());
        }
    }
}
