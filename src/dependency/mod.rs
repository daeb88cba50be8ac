// src/dependency/mod.rs

//! Python dependency specifiers
//!
//! Parses, repairs and normalizes PEP 508 style requirement strings as they
//! appear in `project.dependencies` and `project.optional-dependencies`.
//! Only the common forms are understood: a name, optional extras, a version
//! clause or a direct URL, and an environment marker.

mod normalize;
mod repair;
mod specifier;

pub use normalize::{NormalizedList, normalize_list, normalize_requirement};
pub use repair::repair;
pub use specifier::{DependencySpecifier, Marker, Operator, VersionSpec};

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([A-Z0-9]|[A-Z0-9][A-Z0-9._-]*[A-Z0-9])$").unwrap()
});

static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Why a specifier could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("missing package name")]
    MissingName,

    #[error("invalid package name '{0}'")]
    InvalidName(String),

    #[error("invalid extras: {0}")]
    InvalidExtras(String),

    #[error("invalid operator '{0}'")]
    InvalidOperator(String),

    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid marker: {0}")]
    InvalidMarker(String),

    #[error("unexpected text '{0}'")]
    UnexpectedText(String),
}

/// True when `name` is a valid distribution name
pub fn is_valid_name(name: &str) -> bool {
    NAME.is_match(name)
}

/// Canonical form of a distribution name: separator runs become `-`, lower case
pub fn canonicalize_name(name: &str) -> String {
    SEPARATOR_RUN.replace_all(name, "-").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_name() {
        assert_eq!(canonicalize_name("My_Project.Name"), "my-project-name");
        assert_eq!(canonicalize_name("Foo__Bar"), "foo-bar");
        assert_eq!(canonicalize_name("foo-._bar"), "foo-bar");
        assert_eq!(canonicalize_name("requests"), "requests");
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("a"));
        assert!(is_valid_name("My_Project.Name"));
        assert!(is_valid_name("zope.interface"));
        assert!(!is_valid_name("-leading"));
        assert!(!is_valid_name("trailing."));
        assert!(!is_valid_name("has space"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("caf\u{e9}"));
    }
}
