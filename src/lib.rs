//! PowerShell lexer, parser, and top-level directive rules.
//!
//! Two rules check that a script opts into strict behaviour at its
//! top level:
//!
//! * [`StrictModeVersionRule`]: `Set-StrictMode -Version 3.0`
//! * [`ErrorActionStopRule`]: `$ErrorActionPreference = 'Stop'`
//!
//! Each rule inspects the syntax tree first and, when given the script's
//! path, falls back to scanning a fresh token stream of the file. A rule
//! returns no diagnostics when satisfied and exactly one otherwise.
//!
//! # Quick start
//!
//! ```
//! use psdirective::{Rule, RuleConfig, StrictModeVersionRule, parse_str};
//!
//! let tree = parse_str("Set-StrictMode -Version 3.0\nWrite-Host 'hi'\n").unwrap();
//! let rule = StrictModeVersionRule::default();
//! let diagnostics = rule.evaluate(&tree, tree.root(), &RuleConfig::default(), None);
//! assert!(diagnostics.is_empty());
//!
//! let tree = parse_str("Write-Host 'hi'\n").unwrap();
//! let diagnostics = rule.evaluate(&tree, tree.root(), &RuleConfig::default(), None);
//! assert!(diagnostics[0].message.starts_with("Missing"));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod fallback;
pub mod lexer;
pub mod parser;
pub mod rules;
pub mod scope;
pub mod token;

pub use ast::{Extent, InvocationOperator, Node, NodeId, NodeKind, SyntaxTree};
pub use config::{ConfigError, RuleConfig};
pub use diagnostic::{Diagnostic, Severity, SuggestedCorrection};
pub use lexer::{LexError, LexErrorKind, tokenize};
pub use parser::{ParseError, ParseErrorKind, parse};
pub use rules::{
    DirectiveMatcher, ERROR_ACTION_LOOKAHEAD, ErrorActionStopRule, Rule, STRICT_MODE_LOOKAHEAD,
    StrictModeVersionRule, builtin_rules, evaluate_directive,
};
pub use token::{Position, QuoteKind, Span, Token, TokenKind};

/// Failure from [`parse_str`]: the source did not lex or did not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// Tokenize and parse a PowerShell source string in one step.
pub fn parse_str(input: &str) -> Result<SyntaxTree, Error> {
    let tokens = tokenize(input)?;
    Ok(parse(input, &tokens)?)
}
