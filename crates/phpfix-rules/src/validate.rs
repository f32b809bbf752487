//! Return-type declaration syntax oracle.
//!
//! The last line of defense before mutation: render the exact candidate
//! text into a minimal synthetic declaration and check that PHP would
//! accept it. The check runs on the exact text that will be inserted,
//! never an approximation, and any failure is a hard decline.
//!
//! The oracle tokenizes `<?php function ret(): <type> {}` with the real
//! lexer and then parses the return-type position against the declaration
//! grammar, applying the target-version gates from [`PhpVersion`].

use phpfix_lex::{tokenize, PhpVersion, Token, TokenKind};

/// PHP reserved words that can never serve as a type name.
///
/// Type keywords (`array`, `callable`, `static`, ...) are absent on
/// purpose; they are validated by the grammar rules instead.
const RESERVED_NON_TYPES: &[&str] = &[
    "abstract", "and", "as", "break", "case", "catch", "class", "clone", "const", "continue",
    "declare", "default", "do", "echo", "else", "elseif", "empty", "enddeclare", "endfor",
    "endforeach", "endif", "endswitch", "endwhile", "exit", "extends", "final", "finally", "fn",
    "for", "foreach", "function", "global", "goto", "if", "implements", "include",
    "include_once", "instanceof", "insteadof", "interface", "isset", "list", "match",
    "namespace", "new", "or", "print", "private", "protected", "public", "readonly", "require",
    "require_once", "return", "switch", "throw", "trait", "try", "unset", "use", "var", "while",
    "xor", "yield",
];

/// Types that must stand alone: never nullable, never a union member.
const STANDALONE_ONLY: &[&str] = &["void", "never", "mixed"];

/// Returns whether `type_text` is a valid return-type declaration for the
/// target PHP version.
///
/// # Example
///
/// ```
/// use phpfix_lex::PhpVersion;
/// use phpfix_rules::validate::validate_return_type;
///
/// assert!(validate_return_type("?Foo", PhpVersion::V7_1));
/// assert!(!validate_return_type("?Foo", PhpVersion::V7_0));
/// assert!(!validate_return_type("not a type", PhpVersion::Permissive));
/// ```
pub fn validate_return_type(type_text: &str, version: PhpVersion) -> bool {
    let snippet = format!("<?php function ret(): {} {{}}", type_text);
    let Ok(tokens) = tokenize(&snippet) else {
        return false;
    };

    // Isolate the tokens between the `:` and the body `{`.
    let colon = match tokens.iter().position(|t| t.kind == TokenKind::Colon) {
        Some(i) => i,
        None => return false,
    };
    let brace = match tokens.iter().rposition(|t| t.kind == TokenKind::LBrace) {
        Some(i) if i > colon => i,
        _ => return false,
    };
    let decl: Vec<&Token> = tokens[colon + 1..brace]
        .iter()
        .filter(|t| !t.is_trivia())
        .collect();

    parse_declaration(&decl, version)
}

/// Parse the token sequence of a return-type declaration.
fn parse_declaration(tokens: &[&Token], version: PhpVersion) -> bool {
    let mut pos = 0usize;

    let nullable = tokens.first().is_some_and(|t| t.kind == TokenKind::Question);
    if nullable {
        if !version.has_nullable_types() {
            return false;
        }
        pos += 1;
    }

    let mut atomics: Vec<String> = Vec::new();
    loop {
        let Some(name) = parse_atomic(tokens, &mut pos) else {
            return false;
        };
        atomics.push(name);
        match tokens.get(pos) {
            None => break,
            Some(t) if t.kind == TokenKind::Pipe => {
                pos += 1;
            }
            Some(_) => return false,
        }
    }

    let is_union = atomics.len() > 1;
    if is_union && (nullable || !version.has_union_types()) {
        return false;
    }

    // Duplicate members are a parse error in PHP.
    for (i, a) in atomics.iter().enumerate() {
        if atomics[..i].iter().any(|b| b.eq_ignore_ascii_case(a)) {
            return false;
        }
    }

    atomics
        .iter()
        .all(|name| atomic_is_valid(name, nullable, is_union, version))
}

/// Parse one optionally `\`-qualified name starting at `pos`, advancing it.
fn parse_atomic(tokens: &[&Token], pos: &mut usize) -> Option<String> {
    let mut name = String::new();
    if tokens.get(*pos)?.kind == TokenKind::Backslash {
        name.push('\\');
        *pos += 1;
    }
    loop {
        let t = tokens.get(*pos)?;
        if t.kind != TokenKind::Identifier {
            return None;
        }
        name.push_str(&t.text);
        *pos += 1;
        match tokens.get(*pos) {
            Some(t) if t.kind == TokenKind::Backslash => {
                name.push('\\');
                *pos += 1;
            }
            _ => return Some(name),
        }
    }
}

/// Version and position checks for one atomic type name.
fn atomic_is_valid(name: &str, nullable: bool, in_union: bool, version: PhpVersion) -> bool {
    let bare = name.strip_prefix('\\').unwrap_or(name);
    let segments: Vec<&str> = bare.split('\\').collect();

    // Reserved words are invalid anywhere in a qualified name.
    if segments
        .iter()
        .any(|s| RESERVED_NON_TYPES.iter().any(|r| s.eq_ignore_ascii_case(r)))
    {
        return false;
    }
    if segments.len() > 1 {
        // Qualified class path; nothing version-specific left to check.
        return true;
    }

    let lower = bare.to_ascii_lowercase();
    if STANDALONE_ONLY.contains(&lower.as_str()) && (nullable || in_union) {
        return false;
    }
    match lower.as_str() {
        "void" => version.has_void_return(),
        "never" => version.has_never_type(),
        "mixed" => version.has_mixed_type(),
        "iterable" => version.has_iterable_type(),
        "object" => version.has_object_type(),
        "static" => version.has_static_return() && !in_union,
        "null" | "false" | "true" => {
            if in_union {
                version.has_union_types()
            } else {
                !nullable && version.has_standalone_null_false_true()
            }
        }
        _ => true,
    }
}

// ============================================================================
// Tests
// ============================================================================
