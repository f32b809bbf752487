//! Hand-rolled PHP lexer.
//!
//! Produces a flat token sequence that round-trips: concatenating the text
//! of every token reproduces the input exactly. The lexer understands PHP
//! open/close tags and inline HTML, all comment forms (including doc
//! comments and PHP 8 `#[...]` attributes), string literals including
//! heredoc/nowdoc, numbers, variables, identifiers, and operators by
//! longest match.
//!
//! Double-quoted string interpolation is kept as raw text; the fixer never
//! needs to look inside a string.

use memchr::memmem;
use thiserror::Error;

use crate::token::{Token, TokenKind};

// ============================================================================
// Error Types
// ============================================================================

/// Error from tokenizing PHP source.
#[derive(Debug, Error)]
pub enum LexError {
    /// String literal with no closing delimiter.
    #[error("unterminated string literal starting at byte {offset}")]
    UnterminatedString { offset: usize },

    /// Block comment with no closing `*/`.
    #[error("unterminated block comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },

    /// Heredoc/nowdoc with a malformed opener or no closing marker.
    #[error("unterminated or malformed heredoc starting at byte {offset}")]
    UnterminatedHeredoc { offset: usize },
}

/// Result type for lexing operations.
pub type LexResult<T> = Result<T, LexError>;

// ============================================================================
// Entry Point
// ============================================================================

/// Tokenize PHP source into a flat token sequence.
///
/// # Example
///
/// ```
/// use phpfix_lex::tokenize;
///
/// let tokens = tokenize("<?php function foo() {}").unwrap();
/// let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(rebuilt, "<?php function foo() {}");
/// ```
pub fn tokenize(source: &str) -> LexResult<Vec<Token>> {
    Lexer::new(source).run()
}

// ============================================================================
// Lexer
// ============================================================================

/// Three-character operators, matched before shorter ones.
const OPS3: &[&str] = &[
    "===", "!==", "<=>", "**=", "...", "<<=", ">>=", "??=", "?->",
];

/// Two-character operators.
const OPS2: &[&str] = &[
    "==", "!=", "<>", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", ".=", "%=",
    "&=", "|=", "^=", "**", "<<", ">>", "??", "->", "=>", "::",
];

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> LexResult<Vec<Token>> {
        while self.pos < self.src.len() {
            self.lex_inline_html();
            if self.pos >= self.src.len() {
                break;
            }
            self.lex_open_tag();
            self.lex_php()?;
        }
        Ok(self.tokens)
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn push(&mut self, kind: TokenKind, end: usize) {
        self.tokens.push(Token::new(kind, &self.src[self.pos..end]));
        self.pos = end;
    }

    /// Consume raw text up to the next open tag (or end of input).
    fn lex_inline_html(&mut self) {
        let end = match memmem::find(&self.bytes()[self.pos..], b"<?") {
            Some(rel) => self.pos + rel,
            None => self.src.len(),
        };
        if end > self.pos {
            self.push(TokenKind::InlineHtml, end);
        }
    }

    /// Consume `<?php`, `<?=` or the short `<?` tag.
    fn lex_open_tag(&mut self) {
        let rest = self.rest().as_bytes();
        let end = if rest.len() >= 5 && rest[2..5].eq_ignore_ascii_case(b"php") {
            self.pos + 5
        } else if rest.len() >= 3 && rest[2] == b'=' {
            self.pos + 3
        } else {
            self.pos + 2
        };
        self.push(TokenKind::OpenTag, end);
    }

    /// Lex PHP code until a close tag or end of input.
    fn lex_php(&mut self) -> LexResult<()> {
        while self.pos < self.src.len() {
            let rest = self.rest();
            let b = rest.as_bytes()[0];

            if rest.starts_with("?>") && !rest.starts_with("?->") {
                self.push(TokenKind::CloseTag, self.pos + 2);
                return Ok(());
            }
            if b.is_ascii_whitespace() {
                self.lex_whitespace();
            } else if rest.starts_with("//") {
                self.lex_line_comment();
            } else if rest.starts_with("/*") {
                self.lex_block_comment()?;
            } else if rest.starts_with("#[") {
                self.push(TokenKind::AttributeStart, self.pos + 2);
            } else if b == b'#' {
                self.lex_line_comment();
            } else if b == b'\'' || b == b'"' || b == b'`' {
                self.lex_string(b)?;
            } else if rest.starts_with("<<<") {
                self.lex_heredoc()?;
            } else if b == b'$' && rest.len() > 1 && is_ident_start(rest.as_bytes()[1]) {
                self.lex_variable();
            } else if b.is_ascii_digit()
                || (b == b'.' && rest.len() > 1 && rest.as_bytes()[1].is_ascii_digit())
            {
                self.lex_number();
            } else if is_ident_start(b) {
                self.lex_identifier();
            } else {
                self.lex_operator();
            }
        }
        Ok(())
    }

    fn lex_whitespace(&mut self) {
        let bytes = self.bytes();
        let mut end = self.pos;
        while end < bytes.len() && bytes[end].is_ascii_whitespace() {
            end += 1;
        }
        self.push(TokenKind::Whitespace, end);
    }

    /// `//` or `#` comment: runs to the newline or a close tag, exclusive.
    fn lex_line_comment(&mut self) {
        let bytes = self.bytes();
        let mut end = self.pos;
        while end < bytes.len() {
            if bytes[end] == b'\n' {
                break;
            }
            if bytes[end] == b'?' && end + 1 < bytes.len() && bytes[end + 1] == b'>' {
                break;
            }
            end += 1;
        }
        self.push(TokenKind::LineComment, end);
    }

    fn lex_block_comment(&mut self) -> LexResult<()> {
        let offset = self.pos;
        let close = memmem::find(&self.bytes()[self.pos + 2..], b"*/")
            .ok_or(LexError::UnterminatedComment { offset })?;
        let end = self.pos + 2 + close + 2;
        let text = &self.src[self.pos..end];
        // `/**/` is an ordinary comment; a doc comment needs content after `/**`.
        let kind = if text.starts_with("/**") && text.len() > 4 {
            TokenKind::DocComment
        } else {
            TokenKind::BlockComment
        };
        self.push(kind, end);
        Ok(())
    }

    /// Quoted string with `\` escapes. Interpolation is kept as raw text.
    fn lex_string(&mut self, delim: u8) -> LexResult<()> {
        let offset = self.pos;
        let bytes = self.bytes();
        let mut i = self.pos + 1;
        while i < bytes.len() {
            if bytes[i] == b'\\' {
                i += 2;
            } else if bytes[i] == delim {
                self.push(TokenKind::String, i + 1);
                return Ok(());
            } else {
                i += 1;
            }
        }
        Err(LexError::UnterminatedString { offset })
    }

    /// `<<<LABEL ... LABEL` heredoc, `<<<'LABEL'` nowdoc.
    ///
    /// The closing marker may be indented (PHP 7.3 flexible syntax); the
    /// indentation is included in the string token.
    fn lex_heredoc(&mut self) -> LexResult<()> {
        let offset = self.pos;
        let bytes = self.bytes();
        let mut i = self.pos + 3;
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        let quote = if i < bytes.len() && (bytes[i] == b'\'' || bytes[i] == b'"') {
            let q = bytes[i];
            i += 1;
            Some(q)
        } else {
            None
        };
        let label_start = i;
        while i < bytes.len() && is_ident_cont(bytes[i]) {
            i += 1;
        }
        if i == label_start {
            return Err(LexError::UnterminatedHeredoc { offset });
        }
        let label = &bytes[label_start..i];
        if let Some(q) = quote {
            if i >= bytes.len() || bytes[i] != q {
                return Err(LexError::UnterminatedHeredoc { offset });
            }
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'\r' {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'\n' {
            return Err(LexError::UnterminatedHeredoc { offset });
        }
        i += 1;

        // Scan line starts for the closing label.
        while i < bytes.len() {
            let line_start = i;
            let mut j = line_start;
            while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t') {
                j += 1;
            }
            if bytes[j..].starts_with(label) {
                let after = j + label.len();
                if after >= bytes.len() || !is_ident_cont(bytes[after]) {
                    self.push(TokenKind::String, after);
                    return Ok(());
                }
            }
            match memchr::memchr(b'\n', &bytes[i..]) {
                Some(rel) => i += rel + 1,
                None => break,
            }
        }
        Err(LexError::UnterminatedHeredoc { offset })
    }

    fn lex_variable(&mut self) {
        let bytes = self.bytes();
        let mut end = self.pos + 2;
        while end < bytes.len() && is_ident_cont(bytes[end]) {
            end += 1;
        }
        self.push(TokenKind::Variable, end);
    }

    fn lex_number(&mut self) {
        let bytes = self.bytes();
        let rest = self.rest().as_bytes();
        let mut end = self.pos;
        if rest.len() >= 2
            && rest[0] == b'0'
            && matches!(rest[1], b'x' | b'X' | b'b' | b'B' | b'o' | b'O')
        {
            end += 2;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
        } else {
            while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
                end += 1;
            }
            if end < bytes.len()
                && bytes[end] == b'.'
                && end + 1 < bytes.len()
                && bytes[end + 1].is_ascii_digit()
            {
                end += 1;
                while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
                    end += 1;
                }
            }
            if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
                let mut exp = end + 1;
                if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
                    exp += 1;
                }
                if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                    end = exp;
                    while end < bytes.len() && bytes[end].is_ascii_digit() {
                        end += 1;
                    }
                }
            }
        }
        self.push(TokenKind::Number, end);
    }

    fn lex_identifier(&mut self) {
        let bytes = self.bytes();
        let mut end = self.pos + 1;
        while end < bytes.len() && is_ident_cont(bytes[end]) {
            end += 1;
        }
        self.push(TokenKind::Identifier, end);
    }

    fn lex_operator(&mut self) {
        let rest = self.rest();
        for op in OPS3 {
            if rest.starts_with(op) {
                self.push(TokenKind::Op, self.pos + 3);
                return;
            }
        }
        for op in OPS2 {
            if rest.starts_with(op) {
                let kind = match *op {
                    "->" => TokenKind::Arrow,
                    "=>" => TokenKind::DoubleArrow,
                    "::" => TokenKind::DoubleColon,
                    _ => TokenKind::Op,
                };
                self.push(kind, self.pos + 2);
                return;
            }
        }
        let kind = match rest.as_bytes()[0] {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b';' => TokenKind::Semicolon,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b'?' => TokenKind::Question,
            b'|' => TokenKind::Pipe,
            b'&' => TokenKind::Ampersand,
            b'\\' => TokenKind::Backslash,
            _ => TokenKind::Op,
        };
        self.push(kind, self.pos + 1);
    }
}

/// First byte of an identifier: ASCII letter, `_`, or any non-ASCII byte
/// (PHP allows bytes >= 0x80 in names).
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

/// Continuation byte of an identifier.
fn is_ident_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

// ============================================================================
// Tests
// ============================================================================
