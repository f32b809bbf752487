//! The `phpdoc-to-return-type` rule.
//!
//! Promotes a docblock `@return` annotation into a native return type
//! declaration when that is provably safe:
//!
//! 1. **Filter**: the declaration must have a usable name (not a
//!    constructor-family magic method), an attached docblock, and exactly
//!    one `@return` entry that parses into a type expression.
//! 2. **Resolve**: common-type reduction first (nullable-aware), union
//!    expansion second when the target version supports unions; the fixed
//!    skip list rejects undeclarable resolved types.
//! 3. **Validate**: the exact rendered text must pass the return-type
//!    syntax oracle for the target version.
//! 4. **Mutate**: splice `: <type>` after the last `)` preceding the body,
//!    unless a return type is already present.
//!
//! Declarations are processed tail-to-head (descending token index) so an
//! insertion never shifts the indices of declarations still to be visited.
//! This ordering is a correctness requirement, not a style choice.

use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

use phpfix_lex::{PhpVersion, Token, TokenKind, TokenStream};

use crate::docblock::{find_doc_comment, return_annotations};
use crate::rule::{Decline, FixerRule, RuleReport};
use crate::typeexpr::{is_skipped_type, TypeExpression};
use crate::validate::validate_return_type;

/// Magic methods with language-mandated signatures; never typed.
pub const EXCLUDED_METHODS: &[&str] = &["__construct", "__destruct", "__clone"];

/// Run-order priority.
///
/// Runs after the docblock normalization rules (which align tag spelling
/// and type text) and before rules that expect an explicit return
/// declaration or fully-qualified signature names to exist.
pub const PRIORITY: i32 = 13;

// ============================================================================
// Configuration
// ============================================================================

/// How the skip list applies to union members.
///
/// The skip list always applies to a single resolved common type. For
/// unions the safe reading is ambiguous, so it is an explicit choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnionSkipPolicy {
    /// Any skip-listed member other than `null` declines the whole union.
    ///
    /// `null` is exempt: it is only meaningless standing alone, while
    /// `int|string|null` is an ordinary declarable union.
    #[default]
    PerMember,
    /// Members pass through unchecked; only a union that *reduces* to a
    /// skip-listed common type declines.
    WholeUnionOnly,
}

impl UnionSkipPolicy {
    /// Stable string form used by CLI flags and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnionSkipPolicy::PerMember => "per-member",
            UnionSkipPolicy::WholeUnionOnly => "whole-union",
        }
    }
}

impl std::fmt::Display for UnionSkipPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error from parsing a [`UnionSkipPolicy`] flag value.
#[derive(Debug, Error)]
#[error("invalid union skip policy '{input}' (expected 'per-member' or 'whole-union')")]
pub struct PolicyParseError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for UnionSkipPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-member" => Ok(UnionSkipPolicy::PerMember),
            "whole-union" => Ok(UnionSkipPolicy::WholeUnionOnly),
            _ => Err(PolicyParseError {
                input: s.to_string(),
            }),
        }
    }
}

/// Configuration for [`PhpdocToReturnType`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnTypeConfig {
    /// Target PHP version; gates nullable/union/etc. declarations.
    pub php_version: PhpVersion,
    /// Skip-list handling on the union path.
    pub union_skip_policy: UnionSkipPolicy,
}

// ============================================================================
// The Rule
// ============================================================================

/// Adds return type declarations derived from docblock `@return` tags.
#[derive(Debug, Clone, Default)]
pub struct PhpdocToReturnType {
    config: ReturnTypeConfig,
}

/// The type to declare for one declaration; exists only transiently.
enum ResolvedType {
    Single { name: String, nullable: bool },
    Union(Vec<String>),
}

impl ResolvedType {
    fn render(&self) -> String {
        match self {
            ResolvedType::Single { name, nullable } => {
                if *nullable {
                    format!("?{}", name)
                } else {
                    name.clone()
                }
            }
            ResolvedType::Union(members) => members.join("|"),
        }
    }

    /// The token sequence composing the declaration text.
    fn tokens(&self) -> Vec<Token> {
        match self {
            ResolvedType::Single { name, nullable } => {
                let mut out = Vec::new();
                if *nullable {
                    out.push(Token::question());
                }
                push_name_tokens(&mut out, name);
                out
            }
            ResolvedType::Union(members) => {
                let mut out = Vec::new();
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        out.push(Token::pipe());
                    }
                    push_name_tokens(&mut out, member);
                }
                out
            }
        }
    }
}

fn push_name_tokens(out: &mut Vec<Token>, name: &str) {
    let bare = match name.strip_prefix('\\') {
        Some(rest) => {
            out.push(Token::backslash());
            rest
        }
        None => name,
    };
    for (i, segment) in bare.split('\\').enumerate() {
        if i > 0 {
            out.push(Token::backslash());
        }
        out.push(Token::identifier(segment));
    }
}

impl PhpdocToReturnType {
    /// Create the rule with the given configuration.
    pub fn new(config: ReturnTypeConfig) -> Self {
        PhpdocToReturnType { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ReturnTypeConfig {
        &self.config
    }

    /// Process one declaration; `Ok` means the stream was mutated.
    fn process(&self, stream: &mut TokenStream, decl_idx: usize) -> Result<(), Decline> {
        // ---- Candidate Filter -------------------------------------------
        let mut cursor = stream
            .next_meaningful(decl_idx)
            .ok_or(Decline::MalformedDeclaration)?;
        if stream.get(cursor).is_some_and(|t| t.kind == TokenKind::Ampersand) {
            cursor = stream
                .next_meaningful(cursor)
                .ok_or(Decline::MalformedDeclaration)?;
        }
        let name_token = stream.get(cursor).ok_or(Decline::MalformedDeclaration)?;
        if name_token.kind == TokenKind::Identifier {
            if name_token.is_any_keyword(EXCLUDED_METHODS) {
                return Err(Decline::ExcludedName);
            }
            cursor = stream
                .next_meaningful(cursor)
                .ok_or(Decline::MalformedDeclaration)?;
        }

        let doc_idx = find_doc_comment(stream, decl_idx).ok_or(Decline::MissingDocblock)?;
        let doc_text = stream
            .get(doc_idx)
            .ok_or(Decline::MissingDocblock)?
            .text
            .clone();
        let mut annotations = return_annotations(&doc_text);
        if annotations.len() != 1 {
            return Err(Decline::AmbiguousAnnotation);
        }
        let annotation = annotations.remove(0);
        let expr =
            TypeExpression::parse(&annotation.type_text).ok_or(Decline::UnparsableType)?;

        // ---- Type Resolver ----------------------------------------------
        let resolved = self.resolve(&expr)?;

        // ---- Safety Validator -------------------------------------------
        let rendered = resolved.render();
        if !validate_return_type(&rendered, self.config.php_version) {
            return Err(Decline::UnsafeSyntax);
        }

        // ---- Mutator ----------------------------------------------------
        // `cursor` sits on the parameter-list `(` for named and anonymous
        // functions alike.
        if stream.get(cursor).map(|t| t.kind) != Some(TokenKind::LParen) {
            return Err(Decline::MalformedDeclaration);
        }
        let close = stream
            .matching_close(cursor)
            .ok_or(Decline::MalformedDeclaration)?;
        let body = self.find_body_start(stream, close)?;

        // Idempotence guard: a `:` between the parameter-list close and the
        // body start is an existing return-type declaration.
        for k in close + 1..body {
            if stream.get(k).is_some_and(|t| t.kind == TokenKind::Colon) {
                return Err(Decline::AlreadyTyped);
            }
        }

        // Anchor: the last `)` before the body (the use-clause close for
        // closures, the parameter-list close otherwise).
        let mut anchor = close;
        for k in (close..body).rev() {
            if stream.get(k).is_some_and(|t| t.kind == TokenKind::RParen) {
                anchor = k;
                break;
            }
        }

        let mut splice = vec![Token::colon(), Token::whitespace(" ")];
        splice.extend(resolved.tokens());
        stream.insert_all(anchor + 1, splice);
        debug!(declared = %rendered, "return type added");
        Ok(())
    }

    /// Resolve a type expression to a declarable type, or decline.
    fn resolve(&self, expr: &TypeExpression) -> Result<ResolvedType, Decline> {
        if let Some(info) = expr.common_type(true) {
            if is_skipped_type(&info.common_type) {
                return Err(Decline::PolicyExcludedType);
            }
            return Ok(ResolvedType::Single {
                name: info.common_type,
                nullable: info.is_nullable,
            });
        }
        if !self.config.php_version.has_union_types() {
            return Err(Decline::UnsafeSyntax);
        }
        let members = expr.union_types().ok_or(Decline::UnparsableType)?;
        if self.config.union_skip_policy == UnionSkipPolicy::PerMember
            && members
                .iter()
                .any(|m| m != "null" && is_skipped_type(m))
        {
            return Err(Decline::PolicyExcludedType);
        }
        Ok(ResolvedType::Union(members))
    }

    /// First `{`, `;` or `=>` after the signature, skipping a closure
    /// `use (...)` clause and any tokens of an existing return type.
    fn find_body_start(
        &self,
        stream: &TokenStream,
        param_close: usize,
    ) -> Result<usize, Decline> {
        let mut i = param_close;
        loop {
            i = stream
                .next_meaningful(i)
                .ok_or(Decline::MalformedDeclaration)?;
            let token = stream.get(i).ok_or(Decline::MalformedDeclaration)?;
            match token.kind {
                TokenKind::LBrace | TokenKind::Semicolon | TokenKind::DoubleArrow => {
                    return Ok(i)
                }
                TokenKind::Identifier if token.is_keyword("use") => {
                    let open = stream
                        .next_meaningful(i)
                        .ok_or(Decline::MalformedDeclaration)?;
                    if stream.get(open).map(|t| t.kind) != Some(TokenKind::LParen) {
                        return Err(Decline::MalformedDeclaration);
                    }
                    i = stream
                        .matching_close(open)
                        .ok_or(Decline::MalformedDeclaration)?;
                }
                // Tokens of an existing return type (`: ?Foo\Bar|int`).
                TokenKind::Colon
                | TokenKind::Question
                | TokenKind::Identifier
                | TokenKind::Backslash
                | TokenKind::Pipe => {}
                _ => return Err(Decline::MalformedDeclaration),
            }
        }
    }
}

impl FixerRule for PhpdocToReturnType {
    fn name(&self) -> &'static str {
        "phpdoc-to-return-type"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn is_candidate(&self, stream: &TokenStream) -> bool {
        stream.has_functions()
    }

    fn apply(&self, stream: &mut TokenStream) -> RuleReport {
        let mut report = RuleReport::new();
        // Tail-to-head: insertions never shift unvisited declarations.
        for &decl_idx in stream.function_keyword_indices().iter().rev() {
            match self.process(stream, decl_idx) {
                Ok(()) => report.mutations += 1,
                Err(decline) => {
                    debug!(%decline, index = decl_idx, "declaration skipped");
                    report.declines.push(decline);
                }
            }
        }
        info!(
            mutations = report.mutations,
            declines = report.declines.len(),
            "phpdoc-to-return-type pass complete"
        );
        report
    }
}

// ============================================================================
// Tests
// ============================================================================
