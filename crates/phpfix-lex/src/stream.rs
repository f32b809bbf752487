//! Mutable, randomly-indexable token stream for one PHP source unit.
//!
//! The stream owns the token sequence for a file and is the only shared
//! mutable state during a fixer pass. Mutations are index-based; rules that
//! insert tokens must process declarations tail-to-head so earlier indices
//! stay stable.

use std::ops::Range;

use crate::lexer::{tokenize, LexResult};
use crate::token::{Token, TokenKind};

/// Modifier keywords that may sit between a docblock and a `function` keyword.
pub const MEMBER_MODIFIERS: &[&str] = &[
    "public", "protected", "private", "static", "abstract", "final", "readonly",
];

/// An ordered, mutable sequence of lexical tokens for one source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Tokenize PHP source into a stream.
    pub fn from_source(source: &str) -> LexResult<Self> {
        Ok(TokenStream {
            tokens: tokenize(source)?,
        })
    }

    /// Wrap an existing token sequence.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        TokenStream { tokens }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns whether the stream holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `idx`, if in bounds.
    pub fn get(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(idx)
    }

    /// All tokens, in order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Serialize the stream back to source text.
    pub fn to_source(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Insert a single token before `idx`.
    pub fn insert(&mut self, idx: usize, token: Token) {
        self.tokens.insert(idx, token);
    }

    /// Insert a token sequence before `idx`, preserving its order.
    pub fn insert_all(&mut self, idx: usize, tokens: Vec<Token>) {
        self.tokens.splice(idx..idx, tokens);
    }

    /// Remove the tokens in `range`.
    pub fn remove_range(&mut self, range: Range<usize>) {
        self.tokens.drain(range);
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Index of the next non-trivia token strictly after `idx`.
    pub fn next_meaningful(&self, idx: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(idx + 1)
            .find(|(_, t)| !t.is_trivia())
            .map(|(i, _)| i)
    }

    /// Index of the previous non-trivia token strictly before `idx`.
    pub fn prev_meaningful(&self, idx: usize) -> Option<usize> {
        self.tokens[..idx]
            .iter()
            .rposition(|t| !t.is_trivia())
    }

    /// Index of the close bracket matching the open bracket at `open_idx`.
    ///
    /// Handles nesting; string and comment contents are single tokens and
    /// cannot confuse the scan.
    pub fn matching_close(&self, open_idx: usize) -> Option<usize> {
        let open_kind = self.get(open_idx)?.kind;
        let close_kind = open_kind.closing()?;
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(open_idx) {
            if token.kind.closing() == Some(close_kind) {
                depth += 1;
            } else if token.kind == close_kind {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// Index of the open bracket matching the close bracket at `close_idx`.
    pub fn matching_open(&self, close_idx: usize) -> Option<usize> {
        let close_kind = self.get(close_idx)?.kind;
        if !close_kind.is_close_bracket() {
            return None;
        }
        let mut depth = 0usize;
        for i in (0..=close_idx).rev() {
            let kind = self.tokens[i].kind;
            if kind == close_kind {
                depth += 1;
            } else if kind.closing() == Some(close_kind) {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Function discovery
    // ------------------------------------------------------------------

    /// Ascending indices of `function` / `fn` keywords that introduce a
    /// declaration.
    ///
    /// Excludes `use function` imports and member accesses spelled with a
    /// keyword name (`->fn`, `::fn`).
    pub fn function_keyword_indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if !token.is_any_keyword(&["function", "fn"]) {
                continue;
            }
            if let Some(prev) = self.prev_meaningful(i) {
                let p = &self.tokens[prev];
                if p.is_keyword("use")
                    || matches!(p.kind, TokenKind::Arrow | TokenKind::DoubleColon)
                    || (p.kind == TokenKind::Op && p.text == "?->")
                {
                    continue;
                }
            }
            // A declaration continues with a name, a by-ref `&`, or `(`.
            let continues = self.next_meaningful(i).is_some_and(|n| {
                matches!(
                    self.tokens[n].kind,
                    TokenKind::Identifier | TokenKind::Ampersand | TokenKind::LParen
                )
            });
            if continues {
                out.push(i);
            }
        }
        out
    }

    /// Fast pre-check: does the stream contain any function declaration?
    pub fn has_functions(&self) -> bool {
        !self.function_keyword_indices().is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
