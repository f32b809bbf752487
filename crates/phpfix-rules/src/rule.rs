//! Fixer rule framework: the rule trait, the registry, and pass reports.
//!
//! Rules are pure token-stream transformations. A rule never fails: every
//! condition that prevents a mutation is a *decline*, recorded as data in
//! the pass report and invisible in the output stream.

use std::fmt;

use serde::{Deserialize, Serialize};

use phpfix_lex::TokenStream;

// ============================================================================
// Declines
// ============================================================================

/// Why a rule left one declaration untouched.
///
/// Declines are control-flow decisions, not errors; nothing propagates.
/// A decline is final for the declaration within the pass (no retries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decline {
    /// Declared name is on the fixed exclusion list (`__construct`, ...).
    ExcludedName,
    /// No docblock attached to the declaration.
    MissingDocblock,
    /// Zero or more than one `@return` entry; never guess.
    AmbiguousAnnotation,
    /// Annotation text does not reduce to a usable type expression.
    UnparsableType,
    /// Resolved type is on the skip list (`resource`, bare `null`).
    PolicyExcludedType,
    /// The syntax oracle rejected the rendered candidate.
    UnsafeSyntax,
    /// The declaration already carries an explicit return type.
    AlreadyTyped,
    /// The declaration's token structure offers no safe mutation point.
    MalformedDeclaration,
}

impl Decline {
    /// Stable string form used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decline::ExcludedName => "excluded_name",
            Decline::MissingDocblock => "missing_docblock",
            Decline::AmbiguousAnnotation => "ambiguous_annotation",
            Decline::UnparsableType => "unparsable_type",
            Decline::PolicyExcludedType => "policy_excluded_type",
            Decline::UnsafeSyntax => "unsafe_syntax",
            Decline::AlreadyTyped => "already_typed",
            Decline::MalformedDeclaration => "malformed_declaration",
        }
    }
}

impl fmt::Display for Decline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Outcome of one rule pass over one stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleReport {
    /// Number of declarations mutated.
    pub mutations: usize,
    /// Declines, in processing order (tail-to-head over declarations).
    pub declines: Vec<Decline>,
}

impl RuleReport {
    /// An empty report.
    pub fn new() -> Self {
        RuleReport::default()
    }

    /// Returns whether the pass changed the stream.
    pub fn changed(&self) -> bool {
        self.mutations > 0
    }

    /// Number of declines with the given reason.
    pub fn decline_count(&self, reason: Decline) -> usize {
        self.declines.iter().filter(|d| **d == reason).count()
    }
}

/// A named rule outcome, as reported by [`RuleSet::apply_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Rule name.
    pub rule: String,
    /// Pass report.
    pub report: RuleReport,
}

// ============================================================================
// Rule Trait and Registry
// ============================================================================

/// A single automated source-rewriting rule.
pub trait FixerRule {
    /// Stable rule name (kebab-case).
    fn name(&self) -> &'static str;

    /// Run-order priority: higher priorities run earlier.
    ///
    /// Rules that normalize input for other rules carry higher priorities;
    /// rules that depend on earlier rewrites carry lower ones.
    fn priority(&self) -> i32;

    /// Fast pre-check so the host can skip irrelevant streams entirely.
    fn is_candidate(&self, stream: &TokenStream) -> bool;

    /// Run the full pass; must be idempotent and must never leave the
    /// stream in a state that fails to re-lex.
    fn apply(&self, stream: &mut TokenStream) -> RuleReport;
}

/// Ordered rule registry.
///
/// Rules execute in descending priority; ties break by name so the run
/// order is deterministic regardless of registration order.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn FixerRule>>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// Register a rule.
    pub fn register(&mut self, rule: Box<dyn FixerRule>) {
        self.rules.push(rule);
        self.rules
            .sort_by(|a, b| b.priority().cmp(&a.priority()).then(a.name().cmp(b.name())));
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns whether no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every candidate rule over the stream, in execution order.
    pub fn apply_all(&self, stream: &mut TokenStream) -> Vec<RuleOutcome> {
        self.rules
            .iter()
            .map(|rule| {
                let report = if rule.is_candidate(stream) {
                    rule.apply(stream)
                } else {
                    RuleReport::new()
                };
                RuleOutcome {
                    rule: rule.name().to_string(),
                    report,
                }
            })
            .collect()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet").field("rules", &self.names()).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        name: &'static str,
        priority: i32,
    }

    impl FixerRule for Probe {
        fn name(&self) -> &'static str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn is_candidate(&self, _stream: &TokenStream) -> bool {
            true
        }
        fn apply(&self, stream: &mut TokenStream) -> RuleReport {
            // Record execution order as inserted identifiers at the end.
            let len = stream.len();
            stream.insert(len, phpfix_lex::Token::identifier(self.name));
            RuleReport {
                mutations: 1,
                declines: vec![],
            }
        }
    }

    fn stream() -> TokenStream {
        TokenStream::from_source("<?php ").unwrap()
    }

    mod ordering {
        use super::*;

        #[test]
        fn descending_priority() {
            let mut set = RuleSet::new();
            set.register(Box::new(Probe { name: "low", priority: 1 }));
            set.register(Box::new(Probe { name: "high", priority: 10 }));
            assert_eq!(set.names(), vec!["high", "low"]);
        }

        #[test]
        fn ties_break_by_name() {
            let mut set = RuleSet::new();
            set.register(Box::new(Probe { name: "beta", priority: 5 }));
            set.register(Box::new(Probe { name: "alpha", priority: 5 }));
            assert_eq!(set.names(), vec!["alpha", "beta"]);
        }

        #[test]
        fn apply_all_follows_execution_order() {
            let mut set = RuleSet::new();
            set.register(Box::new(Probe { name: "second", priority: 1 }));
            set.register(Box::new(Probe { name: "first", priority: 2 }));
            let mut s = stream();
            let outcomes = set.apply_all(&mut s);
            assert_eq!(outcomes.len(), 2);
            assert_eq!(outcomes[0].rule, "first");
            assert!(s.to_source().ends_with("firstsecond"));
        }
    }

    mod reports {
        use super::*;

        #[test]
        fn decline_counting() {
            let report = RuleReport {
                mutations: 1,
                declines: vec![
                    Decline::AlreadyTyped,
                    Decline::UnsafeSyntax,
                    Decline::AlreadyTyped,
                ],
            };
            assert!(report.changed());
            assert_eq!(report.decline_count(Decline::AlreadyTyped), 2);
            assert_eq!(report.decline_count(Decline::MissingDocblock), 0);
        }

        #[test]
        fn decline_serializes_snake_case() {
            let json = serde_json::to_string(&Decline::PolicyExcludedType).unwrap();
            assert_eq!(json, "\"policy_excluded_type\"");
        }
    }
}
