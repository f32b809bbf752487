//! Single-stream fix pipeline.
//!
//! One call takes source text through the full rule pass: tokenize, run
//! every candidate rule, serialize. Rule declines never surface as errors;
//! the only failure mode is input the lexer cannot tokenize, which is
//! reported and left unmutated.

use phpfix_lex::{LexError, TokenStream};
use phpfix_rules::{PhpdocToReturnType, ReturnTypeConfig, RuleOutcome, RuleSet};

/// The stock rule registry.
pub fn default_rules(config: ReturnTypeConfig) -> RuleSet {
    let mut rules = RuleSet::new();
    rules.register(Box::new(PhpdocToReturnType::new(config)));
    rules
}

/// Result of fixing one source unit.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    /// The (possibly rewritten) source text.
    pub output: String,
    /// Whether any rule changed the stream.
    pub changed: bool,
    /// Per-rule pass reports, in execution order.
    pub rules: Vec<RuleOutcome>,
}

/// Run the rule set over one source unit.
///
/// # Example
///
/// ```
/// use phpfix::fix::{default_rules, fix_source};
/// use phpfix_rules::ReturnTypeConfig;
///
/// let rules = default_rules(ReturnTypeConfig::default());
/// let outcome = fix_source("<?php /** @return void */ function f() {}", &rules).unwrap();
/// assert!(outcome.changed);
/// assert_eq!(
///     outcome.output,
///     "<?php /** @return void */ function f(): void {}"
/// );
/// ```
pub fn fix_source(source: &str, rules: &RuleSet) -> Result<FixOutcome, LexError> {
    let mut stream = TokenStream::from_source(source)?;
    let outcomes = rules.apply_all(&mut stream);
    let output = stream.to_source();
    let changed = output != source;
    Ok(FixOutcome {
        output,
        changed,
        rules: outcomes,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        default_rules(ReturnTypeConfig::default())
    }

    #[test]
    fn changed_flag_tracks_output() {
        let outcome = fix_source("<?php /** @return int */ function f() {}", &rules()).unwrap();
        assert!(outcome.changed);
        let outcome = fix_source("<?php function f() {}", &rules()).unwrap();
        assert!(!outcome.changed);
    }

    #[test]
    fn unchanged_input_round_trips() {
        let src = "<?php $a = 1; // nothing to do\n";
        let outcome = fix_source(src, &rules()).unwrap();
        assert_eq!(outcome.output, src);
        assert!(!outcome.changed);
    }

    #[test]
    fn lex_failure_is_an_error() {
        assert!(fix_source("<?php $a = 'unterminated", &rules()).is_err());
    }

    #[test]
    fn outcome_reports_follow_rule_order() {
        let outcome = fix_source("<?php /** @return int */ function f() {}", &rules()).unwrap();
        assert_eq!(outcome.rules.len(), 1);
        assert_eq!(outcome.rules[0].rule, "phpdoc-to-return-type");
        assert_eq!(outcome.rules[0].report.mutations, 1);
    }
}
