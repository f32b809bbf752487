//! Docblock location and `@return` annotation extraction.
//!
//! A docblock is the nearest `/** ... */` comment attached to a declaration.
//! "Attached" tolerates the tokens PHP allows between a docblock and the
//! `function` keyword: whitespace, plain comments, member modifiers and
//! PHP 8 attribute groups. Anything else detaches the comment.

use std::sync::OnceLock;

use regex::Regex;

use phpfix_lex::{TokenKind, TokenStream, MEMBER_MODIFIERS};

/// A single `@return` entry extracted from a docblock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnAnnotation {
    /// Raw type-expression text following the tag (may be empty for a bare
    /// `@return`).
    pub type_text: String,
}

/// Locate the docblock attached to the declaration at `decl_idx`.
///
/// Scans backwards over whitespace, plain comments, modifier keywords
/// (`public`, `static`, `final`, ...) and attribute groups. Returns the
/// token index of the nearest `DocComment`, or `None` when the scan hits
/// anything else first.
pub fn find_doc_comment(stream: &TokenStream, decl_idx: usize) -> Option<usize> {
    let mut i = decl_idx;
    while i > 0 {
        i -= 1;
        let token = stream.get(i)?;
        match token.kind {
            TokenKind::DocComment => return Some(i),
            TokenKind::Whitespace
            | TokenKind::LineComment
            | TokenKind::BlockComment => continue,
            TokenKind::Identifier if token.is_any_keyword(MEMBER_MODIFIERS) => continue,
            TokenKind::RBracket => {
                // Possibly the end of an attribute group; jump over it.
                let open = stream.matching_open(i)?;
                if stream.get(open)?.kind == TokenKind::AttributeStart {
                    i = open;
                    continue;
                }
                return None;
            }
            _ => return None,
        }
    }
    None
}

fn return_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(?:/\*\*)?[ \t]*\**[ \t]*@return\b").expect("static pattern")
    })
}

/// Extract every `@return` entry from a docblock body.
///
/// The tag must start a docblock line (after the leading `*` decoration);
/// inline `{@return}` text does not count. The type expression is the run
/// of non-whitespace after the tag, except that whitespace nested inside
/// `<>`, `()`, `{}` or `[]` is kept so `array<int, string>` survives.
/// Trailing description text is ignored.
pub fn return_annotations(doc_text: &str) -> Vec<ReturnAnnotation> {
    return_tag_regex()
        .find_iter(doc_text)
        .map(|m| ReturnAnnotation {
            type_text: scan_type_expression(&doc_text[m.end()..]),
        })
        .collect()
}

/// Scan a type expression from the text following an `@return` tag.
fn scan_type_expression(rest: &str) -> String {
    let rest = rest.trim_start_matches([' ', '\t']);
    let mut depth = 0usize;
    let mut end = 0;
    for (i, ch) in rest.char_indices() {
        match ch {
            '<' | '(' | '{' | '[' => depth += 1,
            '>' | ')' | '}' | ']' => depth = depth.saturating_sub(1),
            '*' if rest[i..].starts_with("*/") => break,
            c if c.is_whitespace() && depth == 0 => break,
            _ => {}
        }
        end = i + ch.len_utf8();
    }
    rest[..end].trim_end_matches("*/").trim().to_string()
}

// ============================================================================
// Tests
// ============================================================================
