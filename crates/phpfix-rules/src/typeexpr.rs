//! Type-expression algebra for docblock annotations.
//!
//! A [`TypeExpression`] is the structured form of an annotation's type
//! text. Two reductions are offered, tried in this order by the rule:
//!
//! 1. **Common type** ([`TypeExpression::common_type`]): collapse to one
//!    effective declarable type plus a nullability flag. A narrower
//!    declaration is always preferable, so this takes priority: `Foo|null`
//!    becomes nullable `Foo`, never a two-member union.
//! 2. **Union expansion** ([`TypeExpression::union_types`]): the ordered
//!    distinct member types when no single common type exists.
//!
//! Members are normalized before comparison: `T[]` collapses to `array`,
//! `Name<...>` drops its generic arguments, `callable(...)` drops its
//! signature, and docblock aliases (`integer`, `boolean`, `double`) fold
//! into their declarable spellings.

/// Types that must never be declared as a return type even when the
/// annotation reduces cleanly.
///
/// `resource` is an opaque runtime handle with no declarable type; a bare
/// `null` carries no information in return position.
pub const SKIPPED_TYPES: &[&str] = &["resource", "null"];

/// PHP native types, lowercased during normalization.
const NATIVE_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "parent", "resource", "self", "static", "string", "true", "void",
];

/// Docblock spellings folded into their declarable equivalents.
const TYPE_ALIASES: &[(&str, &str)] = &[
    ("integer", "int"),
    ("boolean", "bool"),
    ("double", "float"),
    ("real", "float"),
    ("callback", "callable"),
];

/// Exactly one effective type, optionally nullable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonTypeInfo {
    /// The single declarable type name.
    pub common_type: String,
    /// Whether a `null` variant collapsed into the nullability flag.
    pub is_nullable: bool,
}

/// Structured parse of an annotation's raw type text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpression {
    /// Top-level members, split on `|`, in annotation order.
    members: Vec<String>,
    /// Whether the annotation used the leading-`?` shorthand.
    explicit_nullable: bool,
}

impl TypeExpression {
    /// Parse raw annotation text into a type expression.
    ///
    /// Returns `None` for empty input, empty members (`int|`), or
    /// top-level intersection syntax, which this fixer does not declare.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut text = raw.trim();
        let explicit_nullable = if let Some(rest) = text.strip_prefix('?') {
            text = rest.trim_start();
            true
        } else {
            false
        };
        if text.is_empty() {
            return None;
        }

        let mut members = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (i, ch) in text.char_indices() {
            match ch {
                '<' | '(' | '{' | '[' => depth += 1,
                '>' | ')' | '}' | ']' => depth = depth.saturating_sub(1),
                '|' if depth == 0 => {
                    members.push(text[start..i].trim().to_string());
                    start = i + 1;
                }
                '&' if depth == 0 => return None,
                _ => {}
            }
        }
        members.push(text[start..].trim().to_string());
        if members.iter().any(String::is_empty) {
            return None;
        }
        Some(TypeExpression {
            members,
            explicit_nullable,
        })
    }

    /// Top-level members in annotation order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Attempt the common-type reduction.
    ///
    /// With `nullable_aware`, a `null` member accompanying at least one
    /// other member collapses into the nullability flag instead of
    /// blocking the reduction. A lone `null` stays a (skip-listed) common
    /// type.
    pub fn common_type(&self, nullable_aware: bool) -> Option<CommonTypeInfo> {
        let mut is_nullable = self.explicit_nullable;
        let mut effective: Vec<String> = Vec::new();
        for member in &self.members {
            let normalized = normalize_member(member)?;
            if nullable_aware && normalized == "null" && self.members.len() > 1 {
                is_nullable = true;
                continue;
            }
            if !effective.contains(&normalized) {
                effective.push(normalized);
            }
        }
        if effective.len() == 1 {
            Some(CommonTypeInfo {
                common_type: effective.remove(0),
                is_nullable,
            })
        } else {
            None
        }
    }

    /// Attempt the union expansion: ordered distinct members, at least two.
    ///
    /// Nullability stays unrepresented: a `null` member remains a member.
    /// The leading-`?` shorthand never expands to a union.
    pub fn union_types(&self) -> Option<Vec<String>> {
        if self.explicit_nullable {
            return None;
        }
        let mut out: Vec<String> = Vec::new();
        for member in &self.members {
            let normalized = normalize_member(member)?;
            if !out.contains(&normalized) {
                out.push(normalized);
            }
        }
        if out.len() >= 2 {
            Some(out)
        } else {
            None
        }
    }
}

/// Returns whether a resolved type is on the fixed skip list.
pub fn is_skipped_type(type_name: &str) -> bool {
    SKIPPED_TYPES
        .iter()
        .any(|s| type_name.eq_ignore_ascii_case(s))
}

/// Normalize one member to its declarable name, or `None` when the member
/// is not a plain declarable type.
fn normalize_member(member: &str) -> Option<String> {
    let mut text = member.trim();

    // `T[]` (any number of suffixes) is an array; a bare `[]` is nothing.
    if text.ends_with("[]") {
        return if text.len() > 2 {
            Some("array".to_string())
        } else {
            None
        };
    }
    // `Name<...>` drops the generic arguments.
    if let Some(pos) = text.find('<') {
        if !text.ends_with('>') {
            return None;
        }
        text = text[..pos].trim_end();
    }
    // `callable(...)` / `Closure(...): T` drop the signature.
    if let Some(pos) = text.find('(') {
        text = text[..pos].trim_end();
    }
    if text.is_empty() {
        return None;
    }

    // Optionally qualified name: every `\`-separated segment is an identifier.
    let qualified = text.strip_prefix('\\').unwrap_or(text);
    if qualified.is_empty() || !qualified.split('\\').all(is_identifier) {
        return None;
    }

    // Single-segment names fold docblock aliases and lowercase natives.
    if !qualified.contains('\\') && !text.starts_with('\\') {
        for (alias, canonical) in TYPE_ALIASES {
            if text.eq_ignore_ascii_case(alias) {
                return Some((*canonical).to_string());
            }
        }
        for native in NATIVE_TYPES {
            if text.eq_ignore_ascii_case(native) {
                return Some((*native).to_string());
            }
        }
    }
    Some(text.to_string())
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || !c.is_ascii() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> TypeExpression {
        TypeExpression::parse(raw).unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn single_member() {
            assert_eq!(parse("int").members(), ["int"]);
        }

        #[test]
        fn union_members_in_order() {
            assert_eq!(parse("int|string|null").members(), ["int", "string", "null"]);
        }

        #[test]
        fn nested_pipes_are_not_separators() {
            assert_eq!(parse("array<int|string>").members(), ["array<int|string>"]);
        }

        #[test]
        fn rejects_empty_and_malformed() {
            assert_eq!(TypeExpression::parse(""), None);
            assert_eq!(TypeExpression::parse("   "), None);
            assert_eq!(TypeExpression::parse("int|"), None);
            assert_eq!(TypeExpression::parse("|int"), None);
        }

        #[test]
        fn rejects_intersections() {
            assert_eq!(TypeExpression::parse("Countable&Traversable"), None);
        }
    }

    mod common_type {
        use super::*;

        #[test]
        fn single_type() {
            let info = parse("int").common_type(true).unwrap();
            assert_eq!(info.common_type, "int");
            assert!(!info.is_nullable);
        }

        #[test]
        fn nullable_pair_collapses() {
            let info = parse("Foo|null").common_type(true).unwrap();
            assert_eq!(info.common_type, "Foo");
            assert!(info.is_nullable);
        }

        #[test]
        fn null_first_also_collapses() {
            let info = parse("null|Foo").common_type(true).unwrap();
            assert_eq!(info.common_type, "Foo");
            assert!(info.is_nullable);
        }

        #[test]
        fn question_shorthand() {
            let info = parse("?Foo").common_type(true).unwrap();
            assert_eq!(info.common_type, "Foo");
            assert!(info.is_nullable);
        }

        #[test]
        fn lone_null_stays_a_common_type() {
            let info = parse("null").common_type(true).unwrap();
            assert_eq!(info.common_type, "null");
            assert!(!info.is_nullable);
        }

        #[test]
        fn nullable_unaware_keeps_null_as_member() {
            assert_eq!(parse("Foo|null").common_type(false), None);
        }

        #[test]
        fn array_suffixes_share_a_common_type() {
            let info = parse("Foo[]|Bar[]").common_type(true).unwrap();
            assert_eq!(info.common_type, "array");
        }

        #[test]
        fn element_and_array_of_it_do_not_reduce() {
            assert_eq!(parse("Foo|Foo[]").common_type(true), None);
        }

        #[test]
        fn duplicates_reduce() {
            let info = parse("Foo|Foo").common_type(true).unwrap();
            assert_eq!(info.common_type, "Foo");
        }

        #[test]
        fn generics_drop_arguments() {
            let info = parse("array<int, string>").common_type(true).unwrap();
            assert_eq!(info.common_type, "array");
        }

        #[test]
        fn aliases_fold() {
            assert_eq!(parse("integer").common_type(true).unwrap().common_type, "int");
            assert_eq!(parse("boolean").common_type(true).unwrap().common_type, "bool");
            assert_eq!(parse("double").common_type(true).unwrap().common_type, "float");
        }

        #[test]
        fn natives_lowercase() {
            assert_eq!(parse("VOID").common_type(true).unwrap().common_type, "void");
            assert_eq!(parse("String").common_type(true).unwrap().common_type, "string");
        }

        #[test]
        fn class_names_keep_their_spelling() {
            let info = parse("\\App\\Model\\User|null").common_type(true).unwrap();
            assert_eq!(info.common_type, "\\App\\Model\\User");
            assert!(info.is_nullable);
        }

        #[test]
        fn free_text_does_not_reduce() {
            // `$this` parses as a member but is not a declarable name.
            assert!(TypeExpression::parse("$this").is_some());
            assert_eq!(parse("$this").common_type(true), None);
            assert_eq!(parse("number of rows").common_type(true), None);
        }
    }

    mod union_types {
        use super::*;

        #[test]
        fn two_members() {
            assert_eq!(parse("int|string").union_types().unwrap(), ["int", "string"]);
        }

        #[test]
        fn order_and_dedupe() {
            assert_eq!(
                parse("string|int|string").union_types().unwrap(),
                ["string", "int"]
            );
        }

        #[test]
        fn null_stays_a_member() {
            assert_eq!(
                parse("int|string|null").union_types().unwrap(),
                ["int", "string", "null"]
            );
        }

        #[test]
        fn single_member_does_not_expand() {
            assert_eq!(parse("int").union_types(), None);
        }

        #[test]
        fn question_shorthand_never_expands() {
            assert_eq!(parse("?Foo").union_types(), None);
        }

        #[test]
        fn undeclarable_member_blocks_expansion() {
            assert_eq!(parse("int|$this").union_types(), None);
        }
    }

    mod skip_list {
        use super::*;

        #[test]
        fn fixed_set() {
            assert!(is_skipped_type("resource"));
            assert!(is_skipped_type("null"));
            assert!(is_skipped_type("Resource"));
            assert!(!is_skipped_type("int"));
            assert!(!is_skipped_type("static"));
            assert!(!is_skipped_type("void"));
        }
    }
}
