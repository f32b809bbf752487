//! PHP version abstraction for version-aware fixing.
//!
//! This module provides [`PhpVersion`], used by rules and the return-type
//! syntax validator to gate declarations on the target runtime. The lexer
//! itself is version-independent; the version only decides which resolved
//! types are declarable.

use std::str::FromStr;

use thiserror::Error;

/// Target PHP language version for fixing.
///
/// Return type syntax grew across versions (scalar declarations in 7.0,
/// nullable `?T` and `void` in 7.1, unions in 8.0, `never` in 8.1). Rules
/// consult the target version before declaring a type the runtime would
/// reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PhpVersion {
    /// Accept every declaration form the validator grammar knows.
    ///
    /// This is the default mode, for codebases that track current PHP.
    #[default]
    Permissive,

    /// A specific target language version (e.g. 7.4).
    V {
        /// Major version number (7 or 8 for supported versions).
        major: u8,
        /// Minor version number.
        minor: u8,
    },
}

impl PhpVersion {
    /// PHP 7.0 - scalar return type declarations.
    pub const V7_0: Self = Self::V { major: 7, minor: 0 };

    /// PHP 7.1 - nullable types, `void`, `iterable`.
    pub const V7_1: Self = Self::V { major: 7, minor: 1 };

    /// PHP 7.2 - `object` type.
    pub const V7_2: Self = Self::V { major: 7, minor: 2 };

    /// PHP 7.4 - arrow functions, typed properties.
    pub const V7_4: Self = Self::V { major: 7, minor: 4 };

    /// PHP 8.0 - union types, `mixed`, `static` return.
    pub const V8_0: Self = Self::V { major: 8, minor: 0 };

    /// PHP 8.1 - `never`, enums, readonly properties.
    pub const V8_1: Self = Self::V { major: 8, minor: 1 };

    /// PHP 8.2 - standalone `null`, `false` and `true` types.
    pub const V8_2: Self = Self::V { major: 8, minor: 2 };

    /// PHP 8.3 - typed class constants.
    pub const V8_3: Self = Self::V { major: 8, minor: 3 };

    fn at_least(self, major: u8, minor: u8) -> bool {
        match self {
            Self::Permissive => true,
            Self::V { major: m, minor: n } => (m, n) >= (major, minor),
        }
    }

    /// Returns whether `?T` nullable declarations are available (7.1+).
    #[must_use]
    pub fn has_nullable_types(self) -> bool {
        self.at_least(7, 1)
    }

    /// Returns whether the `void` return type is available (7.1+).
    #[must_use]
    pub fn has_void_return(self) -> bool {
        self.at_least(7, 1)
    }

    /// Returns whether the `iterable` type is available (7.1+).
    #[must_use]
    pub fn has_iterable_type(self) -> bool {
        self.at_least(7, 1)
    }

    /// Returns whether the `object` type is available (7.2+).
    #[must_use]
    pub fn has_object_type(self) -> bool {
        self.at_least(7, 2)
    }

    /// Returns whether `A|B` union declarations are available (8.0+).
    #[must_use]
    pub fn has_union_types(self) -> bool {
        self.at_least(8, 0)
    }

    /// Returns whether the `mixed` type is available (8.0+).
    #[must_use]
    pub fn has_mixed_type(self) -> bool {
        self.at_least(8, 0)
    }

    /// Returns whether `static` is a valid return type (8.0+).
    #[must_use]
    pub fn has_static_return(self) -> bool {
        self.at_least(8, 0)
    }

    /// Returns whether the `never` return type is available (8.1+).
    #[must_use]
    pub fn has_never_type(self) -> bool {
        self.at_least(8, 1)
    }

    /// Returns whether standalone `null`, `false` and `true` are valid
    /// declarations (8.2+). As union members they only need 8.0.
    #[must_use]
    pub fn has_standalone_null_false_true(self) -> bool {
        self.at_least(8, 2)
    }

    /// Returns whether this is the permissive mode.
    #[must_use]
    pub fn is_permissive(self) -> bool {
        matches!(self, Self::Permissive)
    }

    /// Returns the major and minor version numbers, if specific.
    #[must_use]
    pub fn version_tuple(self) -> Option<(u8, u8)> {
        match self {
            Self::Permissive => None,
            Self::V { major, minor } => Some((major, minor)),
        }
    }
}

impl std::fmt::Display for PhpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permissive => write!(f, "permissive"),
            Self::V { major, minor } => write!(f, "{}.{}", major, minor),
        }
    }
}

/// Error from parsing a PHP version string.
#[derive(Debug, Error)]
#[error("invalid PHP version '{input}' (expected e.g. '8.1' or 'permissive')")]
pub struct VersionParseError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for PhpVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("permissive") {
            return Ok(Self::Permissive);
        }
        let invalid = || VersionParseError {
            input: s.to_string(),
        };
        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;
        let major: u8 = major.parse().map_err(|_| invalid())?;
        let minor: u8 = minor.parse().map_err(|_| invalid())?;
        Ok(Self::V { major, minor })
    }
}
