use std::fmt;

use crate::ast::{InvocationOperator, NodeId, NodeKind, SyntaxTree};
use crate::token::{Position, Token, TokenKind};

/// Keywords that introduce a control-flow statement with a body block.
const CONTROL_KEYWORDS: [&str; 8] = [
    "if", "foreach", "for", "while", "do", "switch", "try", "trap",
];

/// Control keywords that may carry a `:label`.
const LOOP_KEYWORDS: [&str; 5] = ["foreach", "for", "while", "do", "switch"];

const ASSIGNMENT_OPERATORS: [&str; 6] = ["=", "+=", "-=", "*=", "/=", "%="];

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Expected `{`, found something else or EOF.
    ExpectedOpenBrace { found: Option<String> },
    /// Expected `}`, found something else or EOF.
    ExpectedCloseBrace { found: Option<String> },
    /// Expected `)`, found something else or EOF.
    ExpectedCloseParen { found: Option<String> },
    /// `[` never closed.
    ExpectedCloseBracket,
    /// Keyword such as `function` not followed by a name.
    ExpectedName {
        keyword: String,
        found: Option<String>,
    },
    /// Nothing where a command or value was required.
    ExpectedExpression { found: Option<String> },
    /// Token that cannot appear here.
    UnexpectedToken(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedOpenBrace { found: None } => {
                write!(f, "expected '{{'")
            }
            Self::ExpectedOpenBrace { found: Some(t) } => {
                write!(f, "expected '{{', got '{t}'")
            }
            Self::ExpectedCloseBrace { found: None } => {
                write!(f, "expected '}}'")
            }
            Self::ExpectedCloseBrace { found: Some(t) } => {
                write!(f, "expected '}}', got '{t}'")
            }
            Self::ExpectedCloseParen { found: None } => {
                write!(f, "expected ')'")
            }
            Self::ExpectedCloseParen { found: Some(t) } => {
                write!(f, "expected ')', got '{t}'")
            }
            Self::ExpectedCloseBracket => {
                write!(f, "expected ']'")
            }
            Self::ExpectedName {
                keyword,
                found: None,
            } => {
                write!(f, "expected a name after '{keyword}'")
            }
            Self::ExpectedName {
                keyword,
                found: Some(t),
            } => {
                write!(f, "expected a name after '{keyword}', got '{t}'")
            }
            Self::ExpectedExpression { found: None } => {
                write!(f, "expected an expression")
            }
            Self::ExpectedExpression { found: Some(t) } => {
                write!(f, "expected an expression, got '{t}'")
            }
            Self::UnexpectedToken(t) => {
                write!(f, "unexpected token '{t}'")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", position.line, position.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
}

/// Parse a token stream into a `SyntaxTree`.
///
/// `source` must be the text the tokens were produced from; nodes
/// refer back into it for their source text.
///
/// # Errors
///
/// Returns `ParseError` on unbalanced braces, parentheses or brackets,
/// nameless function or class definitions, and missing assignment
/// values.
pub fn parse(source: &str, tokens: &[Token]) -> Result<SyntaxTree, ParseError> {
    let mut parser = Parser::new(source, tokens);
    let root = parser.tree.root();
    parser.parse_statements(root, None)?;
    Ok(parser.tree)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    Brace,
    Paren,
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    tree: SyntaxTree,
    last_end: Position,
}

impl<'a> Parser<'a> {
    fn new(source: &str, tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            tree: SyntaxTree::new(source),
            last_end: Position::START,
        }
    }

    fn parse_statements(&mut self, parent: NodeId, closer: Option<Closer>) -> Result<(), ParseError> {
        loop {
            self.skip_separators();

            let Some(token) = self.peek() else {
                return match closer {
                    None => Ok(()),
                    Some(Closer::Brace) => Err(self.error(ParseErrorKind::ExpectedCloseBrace {
                        found: None,
                    })),
                    Some(Closer::Paren) => Err(self.error(ParseErrorKind::ExpectedCloseParen {
                        found: None,
                    })),
                };
            };

            match (&token.kind, closer) {
                (TokenKind::CloseBrace, Some(Closer::Brace))
                | (TokenKind::CloseParen, Some(Closer::Paren)) => {
                    self.bump();
                    return Ok(());
                }
                (TokenKind::CloseParen, Some(Closer::Brace)) => {
                    return Err(self.error(ParseErrorKind::ExpectedCloseBrace {
                        found: Some(token.text.clone()),
                    }));
                }
                (TokenKind::CloseBrace, Some(Closer::Paren)) => {
                    return Err(self.error(ParseErrorKind::ExpectedCloseParen {
                        found: Some(token.text.clone()),
                    }));
                }
                (TokenKind::CloseBrace | TokenKind::CloseParen | TokenKind::CloseBracket, _) => {
                    return Err(self.error(ParseErrorKind::UnexpectedToken(token.text.clone())));
                }
                _ => self.parse_statement(parent)?,
            }
        }
    }

    fn parse_statement(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let Some(token) = self.peek() else {
            return Ok(());
        };

        match &token.kind {
            TokenKind::Word => {
                let keyword = token.text.to_ascii_lowercase();
                match keyword.as_str() {
                    "function" | "filter" | "workflow" => return self.parse_function(parent),
                    "class" | "enum" => return self.parse_type_definition(parent),
                    k if CONTROL_KEYWORDS.contains(&k) => return self.parse_control(parent),
                    k if k.starts_with(':') && self.labels_loop() => {
                        return self.parse_control(parent);
                    }
                    _ => {}
                }
            }
            TokenKind::Variable { .. } => {
                if let Some(operator) = self.assignment_operator() {
                    return self.parse_assignment(parent, operator);
                }
            }
            _ => {}
        }

        self.parse_pipeline(parent)
    }

    /// The assignment operator following the variable at the current
    /// position, if any.
    fn assignment_operator(&self) -> Option<String> {
        self.tokens[self.pos + 1..]
            .iter()
            .find(|t| t.kind != TokenKind::LineContinuation)
            .filter(|t| {
                t.kind == TokenKind::Operator && ASSIGNMENT_OPERATORS.contains(&t.text.as_str())
            })
            .map(|t| t.text.clone())
    }

    /// Whether the `:label` word at the current position names a loop.
    fn labels_loop(&self) -> bool {
        self.tokens[self.pos + 1..]
            .iter()
            .find(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::LineContinuation))
            .is_some_and(|t| {
                t.kind == TokenKind::Word
                    && LOOP_KEYWORDS.contains(&t.text.to_ascii_lowercase().as_str())
            })
    }

    fn parse_assignment(&mut self, parent: NodeId, operator: String) -> Result<(), ParseError> {
        let id = self.open(NodeKind::Assignment { operator }, parent);

        let tokens = self.tokens;
        if let TokenKind::Variable { name } = &tokens[self.pos].kind {
            self.leaf(NodeKind::Variable { name: name.clone() }, id);
        }
        self.skip_inline_trivia();
        self.bump(); // operator
        // the value may start on the next line
        self.skip_newlines();

        match self.peek() {
            Some(token) if !Self::ends_command(token) => {}
            found => {
                return Err(self.error(ParseErrorKind::ExpectedExpression {
                    found: found.map(|t| t.text.clone()),
                }));
            }
        }
        self.parse_statement(id)?;

        self.close(id);
        Ok(())
    }

    fn parse_pipeline(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let id = self.open(NodeKind::Pipeline, parent);

        loop {
            self.parse_command(id)?;
            // a pipeline may also continue on a line starting with `|`
            let saved = self.pos;
            self.skip_newlines();
            match self.peek() {
                Some(t) if t.is_operator("|") || t.is_operator("&&") || t.is_operator("||") => {
                    self.bump();
                    self.skip_newlines();
                }
                _ => {
                    self.pos = saved;
                    break;
                }
            }
        }

        self.close(id);
        Ok(())
    }

    fn parse_command(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let token = match self.peek() {
            Some(t) if !Self::ends_command(t) => t,
            found => {
                return Err(self.error(ParseErrorKind::ExpectedExpression {
                    found: found.map(|t| t.text.clone()),
                }));
            }
        };

        let invocation = if token.is_operator("&") {
            Some(InvocationOperator::Ampersand)
        } else if token.is_operator(".") {
            Some(InvocationOperator::Dot)
        } else {
            None
        };
        let kind = if invocation.is_some() || token.kind == TokenKind::Word {
            NodeKind::Command { invocation }
        } else {
            NodeKind::CommandExpression
        };

        let id = self.open(kind, parent);
        if invocation.is_some() {
            self.bump();
        }

        let mut elements = 0;
        loop {
            self.skip_inline_trivia();
            match self.peek() {
                Some(t) if !Self::ends_command(t) => {
                    self.parse_element(id)?;
                    elements += 1;
                }
                found => {
                    if elements == 0 {
                        return Err(self.error(ParseErrorKind::ExpectedExpression {
                            found: found.map(|t| t.text.clone()),
                        }));
                    }
                    break;
                }
            }
        }

        self.close(id);
        Ok(())
    }

    fn parse_element(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error(ParseErrorKind::ExpectedExpression { found: None }));
        };

        match &token.kind {
            TokenKind::Word => self.leaf(NodeKind::StringConstant { quote: None }, parent),
            TokenKind::StringLiteral { quote } => self.leaf(
                NodeKind::StringConstant {
                    quote: Some(*quote),
                },
                parent,
            ),
            TokenKind::Number => self.leaf(NodeKind::Number, parent),
            TokenKind::Parameter => {
                let name = token
                    .text
                    .trim_start_matches('-')
                    .trim_end_matches(':')
                    .to_string();
                self.leaf(NodeKind::Parameter { name }, parent);
            }
            TokenKind::Variable { name } => {
                self.leaf(NodeKind::Variable { name: name.clone() }, parent);
            }
            TokenKind::Operator => self.leaf(NodeKind::Operator, parent),
            TokenKind::OpenBrace => {
                let id = self.open(NodeKind::ScriptBlockExpression, parent);
                self.bump();
                self.parse_statements(id, Some(Closer::Brace))?;
                self.close(id);
            }
            TokenKind::OpenParen => {
                let id = self.open(NodeKind::SubExpression, parent);
                self.bump();
                self.parse_statements(id, Some(Closer::Paren))?;
                self.close(id);
            }
            TokenKind::OpenHash => self.parse_hash_literal(parent)?,
            TokenKind::OpenBracket => self.parse_type_literal(parent)?,
            _ => {
                return Err(self.error(ParseErrorKind::UnexpectedToken(token.text.clone())));
            }
        }
        Ok(())
    }

    fn parse_hash_literal(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let id = self.open(NodeKind::HashLiteral, parent);
        self.bump();

        let mut depth = 1usize;
        while depth > 0 {
            let Some(token) = self.bump() else {
                return Err(self.error(ParseErrorKind::ExpectedCloseBrace { found: None }));
            };
            match token.kind {
                TokenKind::OpenBrace | TokenKind::OpenHash => depth += 1,
                TokenKind::CloseBrace => depth -= 1,
                _ => {}
            }
        }

        self.close(id);
        Ok(())
    }

    fn parse_type_literal(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let id = self.open(NodeKind::TypeLiteral, parent);
        self.bump();

        let mut depth = 1usize;
        while depth > 0 {
            let Some(token) = self.bump() else {
                return Err(self.error(ParseErrorKind::ExpectedCloseBracket));
            };
            match token.kind {
                TokenKind::OpenBracket => depth += 1,
                TokenKind::CloseBracket => depth -= 1,
                _ => {}
            }
        }

        self.close(id);
        Ok(())
    }

    fn parse_function(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let (start, name) = self.definition_header()?;
        let id = self.open_at(NodeKind::FunctionDefinition { name }, parent, start);

        self.skip_inline_trivia();
        if self.peek().is_some_and(|t| t.kind == TokenKind::OpenParen) {
            self.parse_element(id)?;
        }
        self.expect_open_brace()?;
        self.parse_statements(id, Some(Closer::Brace))?;

        self.close(id);
        Ok(())
    }

    fn parse_type_definition(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let (start, name) = self.definition_header()?;
        let id = self.open_at(NodeKind::TypeDefinition { name }, parent, start);

        // base types and interfaces: `class A : B, IC {`
        while let Some(token) = self.peek() {
            if matches!(token.kind, TokenKind::OpenBrace | TokenKind::CloseBrace) {
                break;
            }
            self.bump();
        }
        self.expect_open_brace()?;
        self.parse_statements(id, Some(Closer::Brace))?;

        self.close(id);
        Ok(())
    }

    /// Consume `<keyword> <name>` and return the keyword position and
    /// the name.
    fn definition_header(&mut self) -> Result<(Position, String), ParseError> {
        let tokens = self.tokens;
        let keyword = &tokens[self.pos];
        let start = keyword.span.start;
        self.bump();
        self.skip_inline_trivia();

        match self.peek() {
            Some(token) if token.kind == TokenKind::Word => {
                self.bump();
                Ok((start, token.text.clone()))
            }
            found => Err(self.error(ParseErrorKind::ExpectedName {
                keyword: keyword.text.to_ascii_lowercase(),
                found: found.map(|t| t.text.clone()),
            })),
        }
    }

    fn parse_control(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let start = self.peek().map_or(self.last_end, |t| t.span.start);
        if self.peek().is_some_and(|t| t.text.starts_with(':')) {
            self.bump(); // loop label
            self.skip_inline_trivia();
        }

        let tokens = self.tokens;
        let mut keyword = tokens[self.pos].text.to_ascii_lowercase();
        let id = self.open_at(
            NodeKind::ControlStatement {
                keyword: keyword.clone(),
            },
            parent,
            start,
        );

        loop {
            self.bump(); // clause keyword
            self.parse_clause_header(id)?;
            self.expect_open_brace()?;
            let block = self.open_at(NodeKind::StatementBlock, id, self.last_end_of_brace());
            if keyword == "switch" {
                self.parse_switch_clauses(block)?;
            } else {
                self.parse_statements(block, Some(Closer::Brace))?;
            }
            self.close(block);

            let saved = self.pos;
            self.skip_newlines();
            let next = match self.peek() {
                Some(t) if t.kind == TokenKind::Word => t.text.to_ascii_lowercase(),
                _ => {
                    self.pos = saved;
                    break;
                }
            };

            match (keyword.as_str(), next.as_str()) {
                ("if" | "elseif", "elseif" | "else") | ("try" | "catch", "catch" | "finally") => {
                    keyword = next;
                }
                ("do", "while" | "until") => {
                    self.bump();
                    self.skip_inline_trivia();
                    while let Some(t) = self.peek() {
                        if Self::ends_command(t) {
                            break;
                        }
                        self.parse_element(id)?;
                        self.skip_inline_trivia();
                    }
                    break;
                }
                _ => {
                    self.pos = saved;
                    break;
                }
            }
        }

        self.close(id);
        Ok(())
    }

    /// `switch` bodies: `<condition> { <statements> }` pairs up to the
    /// closing brace. Clause bodies stay in the enclosing scope.
    fn parse_switch_clauses(&mut self, parent: NodeId) -> Result<(), ParseError> {
        loop {
            self.skip_separators();
            match self.peek() {
                None => {
                    return Err(self.error(ParseErrorKind::ExpectedCloseBrace { found: None }));
                }
                Some(t) if t.kind == TokenKind::CloseBrace => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {}
            }

            self.parse_element(parent)?; // condition
            self.expect_open_brace()?;
            let clause = self.open_at(NodeKind::StatementBlock, parent, self.last_end_of_brace());
            self.parse_statements(clause, Some(Closer::Brace))?;
            self.close(clause);
        }
    }

    /// Conditions, switch parameters, catch types and loop headers:
    /// everything between a clause keyword and its body.
    fn parse_clause_header(&mut self, parent: NodeId) -> Result<(), ParseError> {
        loop {
            self.skip_newlines();
            match self.peek() {
                Some(t) if t.kind == TokenKind::OpenBrace => return Ok(()),
                Some(t)
                    if matches!(
                        t.kind,
                        TokenKind::CloseBrace | TokenKind::CloseParen | TokenKind::Semicolon
                    ) =>
                {
                    return Err(self.error(ParseErrorKind::ExpectedOpenBrace {
                        found: Some(t.text.clone()),
                    }));
                }
                Some(_) => self.parse_element(parent)?,
                None => {
                    return Err(self.error(ParseErrorKind::ExpectedOpenBrace { found: None }));
                }
            }
        }
    }

    /// Start of the `{` just consumed by `expect_open_brace`.
    fn last_end_of_brace(&self) -> Position {
        self.tokens
            .get(self.pos.wrapping_sub(1))
            .map_or(self.last_end, |t| t.span.start)
    }

    fn expect_open_brace(&mut self) -> Result<(), ParseError> {
        self.skip_newlines();
        match self.peek() {
            Some(token) if token.kind == TokenKind::OpenBrace => {
                self.bump();
                Ok(())
            }
            found => Err(self.error(ParseErrorKind::ExpectedOpenBrace {
                found: found.map(|t| t.text.clone()),
            })),
        }
    }

    /// Tokens that end a command: statement separators, pipes and
    /// closing delimiters.
    fn ends_command(token: &Token) -> bool {
        match token.kind {
            TokenKind::Newline
            | TokenKind::Semicolon
            | TokenKind::CloseBrace
            | TokenKind::CloseParen => true,
            TokenKind::Operator => matches!(token.text.as_str(), "|" | "&&" | "||"),
            _ => false,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        self.last_end = token.span.end;
        Some(token)
    }

    fn open(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let start = self.peek().map_or(self.last_end, |t| t.span.start);
        self.open_at(kind, parent, start)
    }

    fn open_at(&mut self, kind: NodeKind, parent: NodeId, start: Position) -> NodeId {
        self.tree.push(kind, parent, start)
    }

    fn close(&mut self, id: NodeId) {
        self.tree.set_end(id, self.last_end);
    }

    fn leaf(&mut self, kind: NodeKind, parent: NodeId) {
        let id = self.open(kind, parent);
        self.bump();
        self.close(id);
    }

    fn skip_while(&mut self, pred: impl Fn(&TokenKind) -> bool) {
        while self.peek().is_some_and(|t| pred(&t.kind)) {
            self.pos += 1;
        }
    }

    fn skip_inline_trivia(&mut self) {
        self.skip_while(|k| matches!(k, TokenKind::Comment | TokenKind::LineContinuation));
    }

    fn skip_newlines(&mut self) {
        self.skip_while(TokenKind::is_trivia);
    }

    fn skip_separators(&mut self) {
        self.skip_while(|k| k.is_trivia() || *k == TokenKind::Semicolon);
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        let position = self.peek().map_or_else(
            || self.tokens.last().map_or(Position::START, |t| t.span.end),
            |t| t.span.start,
        );
        ParseError { kind, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_input(input: &str) -> Result<SyntaxTree, ParseError> {
        let tokens = tokenize(input).expect("tokenize failed");
        parse(input, &tokens)
    }

    fn kinds_of(tree: &SyntaxTree, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        tree.descendants(tree.root())
            .filter(|&id| pred(tree.kind(id)))
            .collect()
    }

    #[test]
    fn simple_command() {
        let tree = parse_input("Set-StrictMode -Version 3.0\n").expect("parse failed");
        let commands = kinds_of(&tree, |k| matches!(k, NodeKind::Command { .. }));
        assert_eq!(commands.len(), 1);
        let elements = tree.children(commands[0]);
        assert_eq!(elements.len(), 3);
        assert_eq!(tree.text(elements[0]), "Set-StrictMode");
        assert_eq!(
            tree.kind(elements[1]),
            &NodeKind::Parameter {
                name: "Version".to_string()
            }
        );
        assert_eq!(tree.text(elements[2]), "3.0");
        assert_eq!(tree.text(commands[0]), "Set-StrictMode -Version 3.0");
    }

    #[test]
    fn assignment_children() {
        let tree = parse_input("$ErrorActionPreference = 'Stop' # why\n").expect("parse failed");
        let assignments = kinds_of(&tree, |k| matches!(k, NodeKind::Assignment { .. }));
        assert_eq!(assignments.len(), 1);
        let parts = tree.children(assignments[0]);
        assert_eq!(parts.len(), 2);
        assert_eq!(
            tree.kind(parts[0]),
            &NodeKind::Variable {
                name: "ErrorActionPreference".to_string()
            }
        );
        assert_eq!(tree.text(parts[1]), "'Stop'");
    }

    #[test]
    fn assignment_value_on_next_line() {
        let tree = parse_input("$x =\n    'Stop'").expect("parse failed");
        let assignment = kinds_of(&tree, |k| matches!(k, NodeKind::Assignment { .. }))[0];
        assert_eq!(tree.text(tree.children(assignment)[1]), "'Stop'");
    }

    #[test]
    fn compound_assignment_operator() {
        let tree = parse_input("$n += 1").expect("parse failed");
        let assignment = kinds_of(&tree, |k| matches!(k, NodeKind::Assignment { .. }))[0];
        assert_eq!(
            tree.kind(assignment),
            &NodeKind::Assignment {
                operator: "+=".to_string()
            }
        );
    }

    #[test]
    fn function_definition_contains_body() {
        let tree = parse_input("function Get-Thing($a) {\n    Write-Output $a\n}\nGet-Thing 1")
            .expect("parse failed");
        let functions = kinds_of(&tree, |k| matches!(k, NodeKind::FunctionDefinition { .. }));
        assert_eq!(functions.len(), 1);
        assert_eq!(
            tree.kind(functions[0]),
            &NodeKind::FunctionDefinition {
                name: "Get-Thing".to_string()
            }
        );
        let commands = kinds_of(&tree, |k| matches!(k, NodeKind::Command { .. }));
        assert_eq!(commands.len(), 2);
        assert!(tree.ancestors(commands[0]).any(|a| a == functions[0]));
        assert!(!tree.ancestors(commands[1]).any(|a| a == functions[0]));
    }

    #[test]
    fn if_else_chain() {
        let tree = parse_input("if ($a) {\n  x\n}\nelseif ($b) { y }\nelse { z }\nafter")
            .expect("parse failed");
        let control = kinds_of(&tree, |k| matches!(k, NodeKind::ControlStatement { .. }));
        assert_eq!(control.len(), 1);
        let blocks = kinds_of(&tree, |k| *k == NodeKind::StatementBlock);
        assert_eq!(blocks.len(), 3);
        assert_eq!(tree.children(tree.root()).len(), 2);
    }

    #[test]
    fn try_catch_finally() {
        let tree =
            parse_input("try { a } catch [System.Exception] { b } finally { c }").expect("parse failed");
        let blocks = kinds_of(&tree, |k| *k == NodeKind::StatementBlock);
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            kinds_of(&tree, |k| *k == NodeKind::TypeLiteral).len(),
            1
        );
    }

    #[test]
    fn labelled_do_until() {
        let tree = parse_input(":outer do { a } until ($done)\nnext").expect("parse failed");
        assert_eq!(tree.children(tree.root()).len(), 2);
        assert_eq!(
            tree.kind(tree.children(tree.root())[0]),
            &NodeKind::ControlStatement {
                keyword: "do".to_string()
            }
        );
    }

    #[test]
    fn do_while() {
        let tree = parse_input("do { $i++ } while ($i -lt 3)\nnext").expect("parse failed");
        assert_eq!(tree.children(tree.root()).len(), 2);
    }

    #[test]
    fn script_block_expression() {
        let tree = parse_input("Invoke-Command { Get-Date }").expect("parse failed");
        let blocks = kinds_of(&tree, |k| *k == NodeKind::ScriptBlockExpression);
        assert_eq!(blocks.len(), 1);
        assert_eq!(tree.text(blocks[0]), "{ Get-Date }");
    }

    #[test]
    fn pipeline_with_multiple_commands() {
        let tree = parse_input("Get-Item x |\n  Select-Object Name").expect("parse failed");
        let pipelines = kinds_of(&tree, |k| *k == NodeKind::Pipeline);
        assert_eq!(pipelines.len(), 1);
        assert_eq!(tree.children(pipelines[0]).len(), 2);
    }

    #[test]
    fn invocation_operator() {
        let tree = parse_input("& 'Set-StrictMode' 3").expect("parse failed");
        let command = kinds_of(&tree, |k| matches!(k, NodeKind::Command { .. }))[0];
        assert_eq!(
            tree.kind(command),
            &NodeKind::Command {
                invocation: Some(InvocationOperator::Ampersand)
            }
        );
        assert_eq!(tree.text(tree.children(command)[0]), "'Set-StrictMode'");
    }

    #[test]
    fn hash_literal_is_opaque() {
        let tree = parse_input("$h = @{ a = 1; b = @{ c = 2 } }").expect("parse failed");
        assert_eq!(
            kinds_of(&tree, |k| matches!(k, NodeKind::Assignment { .. })).len(),
            1
        );
        assert_eq!(kinds_of(&tree, |k| *k == NodeKind::HashLiteral).len(), 1);
    }

    #[test]
    fn class_definition() {
        let tree = parse_input("class Foo : Base {\n  [string]$Name = 'x'\n  Run() { }\n}")
            .expect("parse failed");
        let types = kinds_of(&tree, |k| matches!(k, NodeKind::TypeDefinition { .. }));
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn unclosed_brace() {
        let err = parse_input("function f {\n  x\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedCloseBrace { found: None });
    }

    #[test]
    fn stray_close_brace() {
        let err = parse_input("x }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken("}".to_string()));
    }

    #[test]
    fn function_without_name() {
        let err = parse_input("function { }").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::ExpectedName { .. }));
    }

    #[test]
    fn assignment_without_value() {
        let err = parse_input("$x =").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedExpression { found: None });
    }
}
