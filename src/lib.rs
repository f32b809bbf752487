//! phpfix: deterministic PHP source fixer.
//!
//! Promotes docblock `@return` annotations into native return type
//! declarations, only when the declaration is provably safe for the
//! target PHP version.
//!
//! The heavy lifting lives in two workspace crates, re-exported here:
//! `phpfix-lex` (tokenizer, token stream) and `phpfix-rules` (docblock
//! analysis, type algebra, the rules). This crate adds the orchestration:
//! the per-file fix pipeline, workspace file collection, and the JSON
//! run summary used by the CLI.

// Lexical layer - re-exported from phpfix-lex
pub use phpfix_lex as lex;

// Rules layer - re-exported from phpfix-rules
pub use phpfix_rules as rules;

// Orchestration
pub mod files;
pub mod fix;
pub mod output;

pub use fix::{default_rules, fix_source, FixOutcome};
