use std::fmt;

use crate::token::{Position, QuoteKind, Span, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Quoted string with no closing quote.
    UnterminatedString,
    /// Here-string whose closing `'@` / `"@` line never appears.
    UnterminatedHereString,
    /// `<#` without a matching `#>`.
    UnterminatedBlockComment,
    /// `${` without a matching `}`.
    UnterminatedVariable,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => {
                write!(f, "unterminated string literal")
            }
            Self::UnterminatedHereString => {
                write!(f, "unterminated here-string")
            }
            Self::UnterminatedBlockComment => {
                write!(f, "unterminated block comment, expected '#>'")
            }
            Self::UnterminatedVariable => {
                write!(f, "unterminated braced variable, expected '}}'")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", position.line, position.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

/// Tokenize a PowerShell source string into a sequence of tokens.
///
/// Comments, newlines and line continuations are kept in the stream;
/// spaces and tabs are dropped.
///
/// # Errors
///
/// Returns `LexError` on unterminated strings, here-strings, block
/// comments, or braced variables.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}

const fn is_word_terminator(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\t'
            | b'\r'
            | b'\n'
            | 0x0C
            | b'{'
            | b'}'
            | b'('
            | b')'
            | b';'
            | b','
            | b'|'
            | b'&'
            | b'"'
            | b'\''
            | b'['
            | b']'
    )
}

const fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        let bytes = input.as_bytes();
        let start = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        };
        Self {
            input: bytes,
            pos: start,
            line: 1,
            col: 1,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            let start = self.position();

            match ch {
                b' ' | b'\t' | 0x0C => {
                    self.advance();
                }
                b'\n' => {
                    self.advance();
                    tokens.push(self.token(TokenKind::Newline, start));
                }
                b'\r' => {
                    self.advance();
                    if self.peek() == Some(b'\n') {
                        self.advance();
                    }
                    tokens.push(self.token(TokenKind::Newline, start));
                }
                b'#' => {
                    self.skip_line();
                    tokens.push(self.token(TokenKind::Comment, start));
                }
                b'<' if self.peek_at(1) == Some(b'#') => {
                    tokens.push(self.read_block_comment(start)?);
                }
                b'`' if matches!(self.peek_at(1), Some(b'\n' | b'\r')) => {
                    self.advance(); // skip backtick
                    if self.peek() == Some(b'\r') {
                        self.advance();
                    }
                    if self.peek() == Some(b'\n') {
                        self.advance();
                    }
                    tokens.push(self.token(TokenKind::LineContinuation, start));
                }
                b';' => tokens.push(self.single(TokenKind::Semicolon, start)),
                b'{' => tokens.push(self.single(TokenKind::OpenBrace, start)),
                b'}' => tokens.push(self.single(TokenKind::CloseBrace, start)),
                b'(' => tokens.push(self.single(TokenKind::OpenParen, start)),
                b')' => tokens.push(self.single(TokenKind::CloseParen, start)),
                b'[' => tokens.push(self.single(TokenKind::OpenBracket, start)),
                b']' => tokens.push(self.single(TokenKind::CloseBracket, start)),
                b'@' => tokens.push(self.read_at_sign(start)?),
                b'$' => tokens.push(self.read_dollar(start)?),
                b'\'' => tokens.push(self.read_single_quoted(start)?),
                b'"' => tokens.push(self.read_double_quoted(start)?),
                b'-' => tokens.push(self.read_dash(start)),
                b'0'..=b'9' => tokens.push(self.read_number(start)),
                b'.' => tokens.push(self.read_dot(start)),
                b':' if self.peek_at(1) == Some(b':') => {
                    self.advance();
                    self.advance();
                    tokens.push(self.token(TokenKind::Operator, start));
                }
                b'=' | b'!' | b',' => tokens.push(self.single(TokenKind::Operator, start)),
                b'+' | b'*' | b'/' | b'%' => tokens.push(self.read_arithmetic(start)),
                b'|' | b'&' => {
                    self.advance();
                    if self.peek() == Some(ch) {
                        self.advance();
                    }
                    tokens.push(self.token(TokenKind::Operator, start));
                }
                b'>' => {
                    self.advance();
                    if self.peek() == Some(b'>') {
                        self.advance();
                    }
                    tokens.push(self.token(TokenKind::Operator, start));
                }
                b'<' => tokens.push(self.single(TokenKind::Operator, start)),
                0xE2 if self.quote() == Some(b'\'') => tokens.push(self.read_single_quoted(start)?),
                0xE2 if self.quote() == Some(b'"') => tokens.push(self.read_double_quoted(start)?),
                _ => tokens.push(self.read_word(start)),
            }
        }

        Ok(tokens)
    }

    const fn position(&self) -> Position {
        Position {
            offset: self.pos,
            line: self.line,
            column: self.col,
        }
    }

    fn token(&self, kind: TokenKind, start: Position) -> Token {
        Token {
            kind,
            text: String::from_utf8_lossy(&self.input[start.offset..self.pos]).into_owned(),
            span: Span {
                start,
                end: self.position(),
            },
        }
    }

    fn single(&mut self, kind: TokenKind, start: Position) -> Token {
        self.advance();
        self.token(kind, start)
    }

    const fn error(kind: LexErrorKind, position: Position) -> LexError {
        LexError { kind, position }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(&b) = self.input.get(self.pos) {
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else if b & 0xC0 != 0x80 {
                // UTF-8 continuation bytes share the column of their
                // lead byte.
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn advance_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    fn skip_line(&mut self) {
        self.advance_while(|b| b != b'\n' && b != b'\r');
    }

    fn read_block_comment(&mut self, start: Position) -> Result<Token, LexError> {
        self.advance(); // <
        self.advance(); // #
        loop {
            match self.peek() {
                None => {
                    return Err(Self::error(LexErrorKind::UnterminatedBlockComment, start));
                }
                Some(b'#') if self.peek_at(1) == Some(b'>') => {
                    self.advance();
                    self.advance();
                    return Ok(self.token(TokenKind::Comment, start));
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn read_at_sign(&mut self, start: Position) -> Result<Token, LexError> {
        match self.peek_at(1) {
            Some(b'(') => {
                self.advance();
                self.advance();
                Ok(self.token(TokenKind::OpenParen, start))
            }
            Some(b'{') => {
                self.advance();
                self.advance();
                Ok(self.token(TokenKind::OpenHash, start))
            }
            Some(q @ (b'\'' | b'"')) if self.here_string_opens() => {
                self.read_here_string(start, q)
            }
            _ => Ok(self.read_word(start)),
        }
    }

    /// `@'` or `@"` only opens a here-string when nothing but blanks
    /// follows it on the same line.
    fn here_string_opens(&self) -> bool {
        self.input[self.pos + 2..]
            .iter()
            .find(|&&b| b != b' ' && b != b'\t')
            .is_none_or(|&b| b == b'\n' || b == b'\r')
    }

    fn read_here_string(&mut self, start: Position, quote: u8) -> Result<Token, LexError> {
        self.advance(); // @
        self.advance(); // quote
        self.skip_line();
        let closer = [quote, b'@'];

        loop {
            // at a line break: step over it and test the next line
            match self.peek() {
                None => {
                    return Err(Self::error(LexErrorKind::UnterminatedHereString, start));
                }
                Some(b'\r') => {
                    self.advance();
                    if self.peek() == Some(b'\n') {
                        self.advance();
                    }
                }
                Some(_) => self.advance(),
            }
            if self.input[self.pos..].starts_with(&closer) {
                self.advance();
                self.advance();
                let quote = if quote == b'\'' {
                    QuoteKind::HereSingle
                } else {
                    QuoteKind::HereDouble
                };
                return Ok(self.token(TokenKind::StringLiteral { quote }, start));
            }
            self.skip_line();
        }
    }

    fn read_dollar(&mut self, start: Position) -> Result<Token, LexError> {
        match self.peek_at(1) {
            Some(b'(') => {
                self.advance();
                self.advance();
                Ok(self.token(TokenKind::OpenParen, start))
            }
            Some(b'{') => {
                self.advance();
                self.advance();
                let name_start = self.pos;
                loop {
                    match self.peek() {
                        None => {
                            return Err(Self::error(LexErrorKind::UnterminatedVariable, start));
                        }
                        Some(b'}') => break,
                        Some(b'`') => {
                            self.advance();
                            self.advance();
                        }
                        Some(_) => self.advance(),
                    }
                }
                let name = String::from_utf8_lossy(&self.input[name_start..self.pos]).into_owned();
                self.advance(); // }
                Ok(self.token(TokenKind::Variable { name }, start))
            }
            Some(b'?' | b'$' | b'^') => {
                self.advance();
                self.advance();
                let name = String::from_utf8_lossy(&self.input[start.offset + 1..self.pos])
                    .into_owned();
                Ok(self.token(TokenKind::Variable { name }, start))
            }
            Some(b) if is_ident_byte(b) => {
                self.advance(); // $
                self.advance_while(is_ident_byte);
                // scope or drive qualifier: $global:name, $env:PATH
                if self.peek() == Some(b':') && self.peek_at(1).is_some_and(is_ident_byte) {
                    self.advance();
                    self.advance_while(is_ident_byte);
                }
                let name = String::from_utf8_lossy(&self.input[start.offset + 1..self.pos])
                    .into_owned();
                Ok(self.token(TokenKind::Variable { name }, start))
            }
            _ => Ok(self.read_word(start)),
        }
    }

    /// Quote class at the current position: `'` for the ASCII and
    /// typographic single quotes, `"` for the double ones.
    fn quote(&self) -> Option<u8> {
        match self.input.get(self.pos..)? {
            [b'\'', ..] | [0xE2, 0x80, 0x98..=0x9B, ..] => Some(b'\''),
            [b'"', ..] | [0xE2, 0x80, 0x9C..=0x9E, ..] => Some(b'"'),
            _ => None,
        }
    }

    fn skip_quote(&mut self) {
        let len = if self.peek() == Some(0xE2) { 3 } else { 1 };
        for _ in 0..len {
            self.advance();
        }
    }

    fn read_single_quoted(&mut self, start: Position) -> Result<Token, LexError> {
        self.skip_quote(); // opening quote
        loop {
            match self.quote() {
                Some(b'\'') => {
                    self.skip_quote();
                    // '' is an escaped quote
                    if self.quote() == Some(b'\'') {
                        self.skip_quote();
                    } else {
                        break;
                    }
                }
                _ if self.peek().is_none() => {
                    return Err(Self::error(LexErrorKind::UnterminatedString, start));
                }
                _ => self.advance(),
            }
        }
        Ok(self.token(
            TokenKind::StringLiteral {
                quote: QuoteKind::Single,
            },
            start,
        ))
    }

    fn read_double_quoted(&mut self, start: Position) -> Result<Token, LexError> {
        self.skip_quote(); // opening quote
        loop {
            match (self.peek(), self.quote()) {
                (None, _) => return Err(Self::error(LexErrorKind::UnterminatedString, start)),
                (Some(b'`'), _) => {
                    self.advance();
                    self.advance();
                }
                (_, Some(b'"')) => {
                    self.skip_quote();
                    if self.quote() == Some(b'"') {
                        self.skip_quote();
                    } else {
                        break;
                    }
                }
                _ => self.advance(),
            }
        }
        Ok(self.token(
            TokenKind::StringLiteral {
                quote: QuoteKind::Double,
            },
            start,
        ))
    }

    fn read_dash(&mut self, start: Position) -> Token {
        match self.peek_at(1) {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'?' => {
                self.advance(); // -
                self.advance_while(|b| is_ident_byte(b) || b == b'?');
                if self.peek() == Some(b':') && self.peek_at(1) != Some(b':') {
                    self.advance();
                }
                self.token(TokenKind::Parameter, start)
            }
            Some(b'0'..=b'9') => {
                self.advance();
                self.read_number(start)
            }
            Some(b'=' | b'-') => {
                self.advance();
                self.advance();
                self.token(TokenKind::Operator, start)
            }
            _ => self.single(TokenKind::Operator, start),
        }
    }

    fn read_number(&mut self, start: Position) -> Token {
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X')) {
            self.advance();
            self.advance();
            self.advance_while(|b| b.is_ascii_hexdigit());
        } else {
            self.advance_while(|b| b.is_ascii_digit());
            if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
                self.advance();
                self.advance_while(|b| b.is_ascii_digit());
            }
        }
        self.skip_number_suffix();

        // 3rd, 1.2.3, 10px: not numbers after all
        if self.peek().is_some_and(|b| !is_word_terminator(b)) {
            return self.continue_word(start);
        }
        self.token(TokenKind::Number, start)
    }

    fn skip_number_suffix(&mut self) {
        let multiplier = matches!(
            self.peek().map(|b| b.to_ascii_lowercase()),
            Some(b'k' | b'm' | b'g' | b't' | b'p')
        ) && matches!(self.peek_at(1), Some(b'b' | b'B'));
        if multiplier {
            self.advance();
            self.advance();
        } else if matches!(
            self.peek().map(|b| b.to_ascii_lowercase()),
            Some(b'l' | b'd')
        ) && self.peek_at(1).is_none_or(is_word_terminator)
        {
            self.advance();
        }
    }

    fn read_dot(&mut self, start: Position) -> Token {
        match self.peek_at(1) {
            Some(b'.') => {
                self.advance();
                self.advance();
                self.token(TokenKind::Operator, start)
            }
            // dot-sourcing operator
            None | Some(b' ' | b'\t' | b'\r' | b'\n') => self.single(TokenKind::Operator, start),
            Some(b'0'..=b'9') => self.read_number(start),
            _ => self.read_word(start),
        }
    }

    fn read_arithmetic(&mut self, start: Position) -> Token {
        let ch = self.peek();
        self.advance();
        if self.peek() == Some(b'=') || (ch == Some(b'+') && self.peek() == Some(b'+')) {
            self.advance();
        }
        self.token(TokenKind::Operator, start)
    }

    fn read_word(&mut self, start: Position) -> Token {
        // always consume the first byte so that the lexer makes progress
        self.advance();
        self.continue_word(start)
    }

    fn continue_word(&mut self, start: Position) -> Token {
        while let Some(b) = self.peek() {
            if b == b'`' {
                // escaped character, but never a line continuation
                if matches!(self.peek_at(1), None | Some(b'\n' | b'\r')) {
                    break;
                }
                self.advance();
                self.advance();
            } else if is_word_terminator(b) {
                break;
            } else {
                self.advance();
            }
        }
        self.token(TokenKind::Word, start)
    }
}
