//! Parser structure and error tests.

mod common;

use common::parse;
use pretty_assertions::assert_eq;
use psdirective::{Error, NodeId, NodeKind, ParseErrorKind, SyntaxTree, parse_str, scope};

fn find(tree: &SyntaxTree, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
    tree.descendants(tree.root())
        .filter(|&id| pred(tree.kind(id)))
        .collect()
}

fn assignments(tree: &SyntaxTree) -> Vec<NodeId> {
    find(tree, |k| matches!(k, NodeKind::Assignment { .. }))
}

// -----------------------------------------------------------
// Tree shape.
// -----------------------------------------------------------

#[test]
fn parse_empty_script() {
    let tree = parse("");
    assert_eq!(tree.len(), 1);
    assert!(tree.children(tree.root()).is_empty());
    assert!(tree.parent(tree.root()).is_none());
}

#[test]
fn parse_comments_only() {
    let tree = parse("# one\n<# two #>\n");
    assert!(tree.children(tree.root()).is_empty());
}

#[test]
fn root_extent_covers_whole_source() {
    let source = "Write-Host a\n\n# trailing\n";
    let tree = parse(source);
    let extent = tree.node(tree.root()).extent;
    assert_eq!(extent.start.line, 1);
    assert_eq!(extent.start.column, 1);
    assert_eq!(extent.end.offset, source.len());
    assert_eq!(tree.text(tree.root()), source);
}

#[test]
fn statements_split_on_semicolons() {
    let tree = parse("a; b;c");
    assert_eq!(tree.children(tree.root()).len(), 3);
}

#[test]
fn param_block_and_attribute() {
    let tree = parse("[CmdletBinding()]\nparam(\n    [string]$Name = 'x'\n)\nWrite-Host $Name\n");
    assert_eq!(tree.children(tree.root()).len(), 3);
    assert_eq!(find(&tree, |k| *k == NodeKind::TypeLiteral).len(), 2);
}

#[test]
fn assignment_from_pipeline() {
    let tree = parse("$items = Get-ChildItem | Where-Object { $_.Length -gt 0 }");
    let assignment = assignments(&tree)[0];
    let [target, value] = tree.children(assignment) else {
        panic!("assignment should have two children");
    };
    assert_eq!(tree.text(*target), "$items");
    assert_eq!(tree.kind(*value), &NodeKind::Pipeline);
    assert_eq!(tree.children(*value).len(), 2);
}

#[test]
fn chained_assignment() {
    let tree = parse("$a = $b = 'Stop'");
    assert_eq!(assignments(&tree).len(), 2);
}

#[test]
fn scoped_assignment_target() {
    let tree = parse("$script:ErrorActionPreference = 'Stop'");
    let target = tree.children(assignments(&tree)[0])[0];
    assert_eq!(
        tree.kind(target),
        &NodeKind::Variable {
            name: "script:ErrorActionPreference".to_string()
        }
    );
}

#[test]
fn nested_function_scopes() {
    let tree = parse("function Outer {\n    function Inner {\n        x\n    }\n}\ny");
    let functions = find(&tree, |k| matches!(k, NodeKind::FunctionDefinition { .. }));
    assert_eq!(functions.len(), 2);
    assert_eq!(tree.parent(functions[1]), Some(functions[0]));

    let commands = find(&tree, |k| matches!(k, NodeKind::Command { .. }));
    assert_eq!(scope::enclosing_scope(&tree, commands[0]), Some(functions[1]));
    assert!(!scope::is_top_level(&tree, commands[0]));
    assert!(scope::is_top_level(&tree, commands[1]));
}

#[test]
fn loops_are_not_scopes() {
    let tree = parse("foreach ($f in $files) {\n    while ($true) { $x = 1 }\n}");
    let assignment = assignments(&tree)[0];
    assert!(scope::is_top_level(&tree, assignment));
}

#[test]
fn switch_clauses_share_the_enclosing_scope() {
    let tree = parse("switch -Regex ($v) {\n    '^a' { $x = 1 }\n    { $_ -gt 2 } { $y = 2 }\n    default { $z = 3 }\n}");
    let found = assignments(&tree);
    assert_eq!(found.len(), 3);
    assert!(found.iter().all(|&id| scope::is_top_level(&tree, id)));

    let control = find(&tree, |k| matches!(k, NodeKind::ControlStatement { .. }));
    assert_eq!(control.len(), 1);
    // the switch body plus one block per clause
    assert_eq!(find(&tree, |k| *k == NodeKind::StatementBlock).len(), 4);
    // a script block condition is still its own scope
    assert_eq!(find(&tree, |k| *k == NodeKind::ScriptBlockExpression).len(), 1);
}

#[test]
fn labelled_loop_is_a_control_statement() {
    let tree = parse(":outer foreach ($i in 1..3) {\n    $x = $i\n    break outer\n}\nnext");
    let control = find(&tree, |k| matches!(k, NodeKind::ControlStatement { .. }));
    assert_eq!(control.len(), 1);
    assert_eq!(
        tree.kind(control[0]),
        &NodeKind::ControlStatement {
            keyword: "foreach".to_string()
        }
    );
    assert!(tree.text(control[0]).starts_with(":outer"));
    assert!(scope::is_top_level(&tree, assignments(&tree)[0]));
    assert_eq!(tree.children(tree.root()).len(), 2);
}

#[test]
fn label_before_a_command_is_a_plain_word() {
    let tree = parse(":label Write-Host hi");
    assert!(find(&tree, |k| matches!(k, NodeKind::ControlStatement { .. })).is_empty());
}

#[test]
fn pipeline_continues_on_leading_pipe_line() {
    let tree = parse("Get-Process\n| Where-Object CPU\n    # filter\n| Out-Null\nSet-StrictMode -Version 3\n");
    assert_eq!(tree.children(tree.root()).len(), 2);
    let pipeline = tree.children(tree.root())[0];
    assert_eq!(tree.children(pipeline).len(), 3);
}

#[test]
fn chain_operator_on_next_line() {
    let tree = parse("Test-Path x\n&& Write-Host yes\n|| Write-Host no");
    assert_eq!(tree.children(tree.root()).len(), 1);
}

#[test]
fn dot_sourced_command() {
    let tree = parse(". $PSScriptRoot\\helpers.ps1");
    let commands = find(&tree, |k| matches!(k, NodeKind::Command { .. }));
    assert_eq!(commands.len(), 1);
}

#[test]
fn ancestors_walk_to_root() {
    let tree = parse("function f {\n    if ($a) { g }\n}");
    let command = find(&tree, |k| matches!(k, NodeKind::Command { .. }))[0];
    let kinds: Vec<_> = tree
        .ancestors(command)
        .map(|id| std::mem::discriminant(tree.kind(id)))
        .collect();
    assert_eq!(kinds.len(), 5);
    assert_eq!(
        kinds.last().copied(),
        Some(std::mem::discriminant(&NodeKind::ScriptBlock))
    );
}

// -----------------------------------------------------------
// Parser errors.
// -----------------------------------------------------------

#[test]
fn parse_str_lex_error() {
    let err = parse_str("'unclosed").unwrap_err();
    assert!(matches!(err, Error::Lex(_)));
}

#[test]
fn parse_str_parse_error() {
    let err = parse_str("function f {\n    x\n").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn parse_error_unclosed_paren() {
    let Error::Parse(err) = parse_str("Write-Host (1 + 2").unwrap_err() else {
        panic!("expected parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::ExpectedCloseParen { found: None });
}

#[test]
fn parse_error_mismatched_closer() {
    let Error::Parse(err) = parse_str("Write-Host (1 }").unwrap_err() else {
        panic!("expected parse error");
    };
    assert_eq!(
        err.kind,
        ParseErrorKind::ExpectedCloseParen {
            found: Some("}".to_string())
        }
    );
}

#[test]
fn parse_error_if_without_body() {
    let Error::Parse(err) = parse_str("if ($a)\n").unwrap_err() else {
        panic!("expected parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::ExpectedOpenBrace { found: None });
}

#[test]
fn parse_error_unclosed_switch() {
    let Error::Parse(err) = parse_str("switch ($v) {\n    1 { a }\n").unwrap_err() else {
        panic!("expected parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::ExpectedCloseBrace { found: None });
}

#[test]
fn parse_error_leading_pipe_without_command() {
    let Error::Parse(err) = parse_str("| Out-Null").unwrap_err() else {
        panic!("expected parse error");
    };
    assert_eq!(
        err.kind,
        ParseErrorKind::ExpectedExpression {
            found: Some("|".to_string())
        }
    );
}

#[test]
fn parse_error_unclosed_type_literal() {
    let Error::Parse(err) = parse_str("[string").unwrap_err() else {
        panic!("expected parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::ExpectedCloseBracket);
}

#[test]
fn parse_error_display() {
    let err = parse_str("class {\n}").unwrap_err();
    assert_eq!(
        err.to_string(),
        "expected a name after 'class', got '{' at line 1, column 7"
    );
}
