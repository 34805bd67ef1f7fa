use serde::{Deserialize, Serialize};

/// A point in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset from the start of the input.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The first byte of a document.
    pub const START: Self = Self {
        offset: 0,
        line: 1,
        column: 1,
    };
}

/// Half-open source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Quoting style of a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteKind {
    /// `'...'`
    Single,
    /// `"..."`
    Double,
    /// `@' ... '@`
    HereSingle,
    /// `@" ... "@`
    HereDouble,
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `# ...` or `<# ... #>`.
    Comment,
    /// Line separator.
    Newline,
    /// Backtick immediately followed by a newline.
    LineContinuation,
    /// Bare word: command names, unquoted arguments, keywords.
    Word,
    /// `-Name` or `-Name:`.
    Parameter,
    /// `$name`, `$scope:name`, `${...}`.
    Variable { name: String },
    /// Integer or decimal literal.
    Number,
    /// Quoted string, text includes the quotes.
    StringLiteral { quote: QuoteKind },
    /// Assignment, pipe, invocation and other operator glyphs.
    Operator,
    /// `;`
    Semicolon,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `(`, `$(` or `@(`.
    OpenParen,
    /// `)`
    CloseParen,
    /// `@{`
    OpenHash,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
}

impl TokenKind {
    /// Comments, newlines and line continuations carry no syntax of
    /// their own.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Comment | Self::Newline | Self::LineContinuation)
    }
}

/// A single token with its kind, raw source text, and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// True for an operator token whose text is exactly `op`.
    #[must_use]
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }
}
