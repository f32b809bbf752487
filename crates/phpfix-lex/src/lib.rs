//! A PHP tokenizer and mutable token stream library.
//!
//! This crate provides the lexical layer of phpfix: a round-tripping PHP
//! lexer and a mutable [`TokenStream`] that fixer rules edit in place.
//!
//! # Overview
//!
//! - **Tokenizing**: [`tokenize`] turns PHP source into a flat token
//!   sequence whose concatenated text reproduces the input exactly.
//! - **Streams**: [`TokenStream`] adds random access, bracket matching,
//!   trivia-skipping navigation, function discovery and in-place mutation.
//! - **Versions**: [`PhpVersion`] gates version-dependent syntax decisions.
//!
//! # Quick Start
//!
//! ```
//! use phpfix_lex::TokenStream;
//!
//! let stream = TokenStream::from_source("<?php function hello() {}").unwrap();
//! assert!(stream.has_functions());
//!
//! // Round-trip: serialize back to source
//! assert_eq!(stream.to_source(), "<?php function hello() {}");
//! ```

/// Lexer for PHP source code.
pub mod lexer;
pub use lexer::{tokenize, LexError, LexResult};

/// Token model.
pub mod token;
pub use token::{Token, TokenKind};

/// Mutable token stream.
pub mod stream;
pub use stream::{TokenStream, MEMBER_MODIFIERS};

/// PHP version abstraction.
pub mod version;
pub use version::{PhpVersion, VersionParseError};
