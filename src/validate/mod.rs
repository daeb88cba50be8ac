// src/validate/mod.rs
//! pyproject.toml validators
//!
//! Each validator inspects the raw manifest, reports errors and warnings,
//! and remembers enough to apply its own fix afterwards. They are run in
//! order by [`crate::fixup::FixupRunner`].

mod dependency;
mod name;
mod schema;

pub use dependency::DependencyValidator;
pub use name::{NameValidator, NamingError};
pub use schema::SchemaValidator;

use crate::manifest::ManifestData;

/// Findings of one validator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// The reported problems can be corrected by [`Validator::fix`]
    pub fixable: bool,
    /// Later validators should not run
    pub exit_early: bool,
}

impl Default for ValidationOutcome {
    fn default() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            fixable: true,
            exit_early: false,
        }
    }
}

impl ValidationOutcome {
    pub fn has_findings(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }

    pub fn only_warnings(&self) -> bool {
        self.errors.is_empty() && !self.warnings.is_empty()
    }
}

/// The available validators
#[derive(Debug, Clone)]
pub enum Validator {
    Schema(SchemaValidator),
    Name(NameValidator),
    Dependency(DependencyValidator),
}

impl Validator {
    /// Label used when reporting findings
    pub fn name(&self) -> &'static str {
        match self {
            Self::Schema(_) => "specs",
            Self::Name(_) => "naming",
            Self::Dependency(_) => "dependencies",
        }
    }

    pub fn validate(&mut self, data: &ManifestData) -> ValidationOutcome {
        match self {
            Self::Schema(v) => v.validate(data),
            Self::Name(v) => v.validate(data),
            Self::Dependency(v) => v.validate(data),
        }
    }

    /// Apply the corrections found by the last [`Validator::validate`]
    ///
    /// Applying a fix twice gives the same document as applying it once.
    pub fn fix(&self, data: &mut ManifestData) {
        match self {
            Self::Schema(_) => {}
            Self::Name(v) => v.fix(data),
            Self::Dependency(v) => v.fix(data),
        }
    }
}

/// Structure first, since the others assume a well-formed project table
pub fn default_validators() -> Vec<Validator> {
    vec![
        Validator::Schema(SchemaValidator),
        Validator::Name(NameValidator::default()),
        Validator::Dependency(DependencyValidator::default()),
    ]
}

/// The `[project]` table, if present
fn project_table(data: &ManifestData) -> Option<&toml::Table> {
    data.get("project").and_then(toml::Value::as_table)
}

fn project_table_mut(data: &mut ManifestData) -> Option<&mut toml::Table> {
    data.get_mut("project").and_then(toml::Value::as_table_mut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let names: Vec<&str> = default_validators().iter().map(Validator::name).collect();
        assert_eq!(names, ["specs", "naming", "dependencies"]);
    }

    #[test]
    fn test_outcome_flags() {
        let mut outcome = ValidationOutcome::default();
        assert!(outcome.fixable);
        assert!(!outcome.has_findings());

        outcome.warnings.push("w".to_string());
        assert!(outcome.only_warnings());

        outcome.errors.push("e".to_string());
        assert!(outcome.has_findings());
        assert!(!outcome.only_warnings());
    }
}
