//! Token-stream fallback.
//!
//! When a rule finds nothing in the syntax tree it may re-read the
//! script from disk and scan a fresh token stream instead. The re-lex
//! is independent of whatever produced the tree. Failures here never
//! reach the caller: they are logged and count as "not found".

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::lexer::{LexError, tokenize};
use crate::token::{Token, TokenKind};

/// Why the fallback could not produce a token stream.
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot tokenize {}: {source}", path.display())]
    Lex {
        path: PathBuf,
        #[source]
        source: LexError,
    },
}

/// Read and tokenize the file at `path`.
pub fn load_tokens(path: &Path) -> Result<Vec<Token>, FallbackError> {
    let source = fs::read_to_string(path).map_err(|source| FallbackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tokenize(&source).map_err(|source| FallbackError::Lex {
        path: path.to_path_buf(),
        source,
    })
}

/// Run `matcher` over a fresh token stream of `path`.
///
/// Returns false without calling `matcher` when the path is not an
/// existing file or cannot be read or tokenized.
pub fn scan_file(path: &Path, matcher: impl FnOnce(&[Token]) -> bool) -> bool {
    if !path.is_file() {
        debug!("token fallback skipped: {} is not a file", path.display());
        return false;
    }
    match load_tokens(path) {
        Ok(tokens) => matcher(&tokens),
        Err(err) => {
            debug!("token fallback skipped: {err}");
            false
        }
    }
}

/// Indices of the non-trivia tokens that sit outside every brace
/// pair, in document order.
pub fn root_level_anchors(tokens: &[Token]) -> impl Iterator<Item = usize> + '_ {
    let mut depth = 0usize;
    tokens.iter().enumerate().filter_map(move |(index, token)| {
        let at_root = depth == 0;
        match token.kind {
            TokenKind::OpenBrace | TokenKind::OpenHash => depth += 1,
            TokenKind::CloseBrace => depth = depth.saturating_sub(1),
            _ => {}
        }
        (at_root && !token.is_trivia()).then_some(index)
    })
}

/// Up to `size` tokens following `anchor`.
#[must_use]
pub fn window(tokens: &[Token], anchor: usize, size: usize) -> &[Token] {
    let start = (anchor + 1).min(tokens.len());
    let end = start.saturating_add(size).min(tokens.len());
    &tokens[start..end]
}
