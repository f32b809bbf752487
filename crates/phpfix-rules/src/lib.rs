//! Fixer rules for phpfix.
//!
//! This crate layers the rule machinery over `phpfix-lex`:
//!
//! - [`docblock`]: docblock location and `@return` tag extraction
//! - [`typeexpr`]: type-expression algebra (common-type reduction, union
//!   expansion, the skip list)
//! - [`validate`]: the return-type declaration syntax oracle
//! - [`rule`]: the [`FixerRule`] trait, [`RuleSet`] registry and reports
//! - [`return_type`]: the `phpdoc-to-return-type` rule
//!
//! # Quick Start
//!
//! ```
//! use phpfix_lex::TokenStream;
//! use phpfix_rules::{PhpdocToReturnType, RuleSet};
//!
//! let mut rules = RuleSet::new();
//! rules.register(Box::new(PhpdocToReturnType::default()));
//!
//! let mut stream =
//!     TokenStream::from_source("<?php /** @return void */ function f() {}").unwrap();
//! rules.apply_all(&mut stream);
//! assert_eq!(
//!     stream.to_source(),
//!     "<?php /** @return void */ function f(): void {}"
//! );
//! ```

pub mod docblock;
pub mod rule;
pub mod return_type;
pub mod typeexpr;
pub mod validate;

pub use rule::{Decline, FixerRule, RuleOutcome, RuleReport, RuleSet};
pub use return_type::{PhpdocToReturnType, ReturnTypeConfig, UnionSkipPolicy};
pub use typeexpr::{CommonTypeInfo, TypeExpression};
