#![allow(dead_code)]

use std::io::Write;

use psdirective::{Diagnostic, Rule, RuleConfig, SyntaxTree, parse_str};
use tempfile::NamedTempFile;

pub fn parse(source: &str) -> SyntaxTree {
    parse_str(source).unwrap_or_else(|e| panic!("failed to parse: {e}\n--- source ---\n{source}"))
}

/// Evaluate `rule` on an in-memory script (no token fallback).
pub fn check(rule: &dyn Rule, source: &str) -> Vec<Diagnostic> {
    let tree = parse(source);
    rule.evaluate(&tree, tree.root(), &RuleConfig::default(), None)
}

/// Write `source` to a temporary `.ps1` file and evaluate `rule` with
/// its path, enabling the token fallback.
pub fn check_file(rule: &dyn Rule, source: &str) -> Vec<Diagnostic> {
    let file = script_file(source);
    let tree = parse(source);
    rule.evaluate(&tree, tree.root(), &RuleConfig::default(), Some(file.path()))
}

pub fn script_file(source: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".ps1")
        .tempfile()
        .expect("temp file");
    file.write_all(source.as_bytes()).expect("write script");
    file
}

pub fn assert_missing(diagnostics: &[Diagnostic]) {
    assert_eq!(diagnostics.len(), 1, "expected one diagnostic: {diagnostics:?}");
    assert!(
        diagnostics[0].message.starts_with("Missing"),
        "unexpected message: {}",
        diagnostics[0].message
    );
}
