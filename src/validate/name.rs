// src/validate/name.rs

use super::{ValidationOutcome, project_table, project_table_mut};
use crate::dependency::{canonicalize_name, is_valid_name};
use crate::manifest::ManifestData;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("missing field: name")]
    Missing,

    #[error("must only contain ASCII letters/digits, underscores, hyphens, and periods")]
    Invalid(String),

    #[error("should be {canonical}")]
    NonCanonical { name: String, canonical: String },
}

/// Project name must be valid and in canonical form
#[derive(Debug, Clone, Default)]
pub struct NameValidator {
    canonical: Option<String>,
}

impl NameValidator {
    pub fn check(data: &ManifestData) -> Result<(), NamingError> {
        let name = project_table(data)
            .and_then(|project| project.get("name"))
            .and_then(toml::Value::as_str)
            .ok_or(NamingError::Missing)?;

        if !is_valid_name(name) {
            return Err(NamingError::Invalid(name.to_string()));
        }

        let canonical = canonicalize_name(name);
        if canonical != name {
            return Err(NamingError::NonCanonical {
                name: name.to_string(),
                canonical,
            });
        }
        Ok(())
    }

    pub fn validate(&mut self, data: &ManifestData) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();
        self.canonical = None;

        if let Err(e) = Self::check(data) {
            outcome.errors.push(e.to_string());
            match e {
                NamingError::NonCanonical { canonical, .. } => self.canonical = Some(canonical),
                NamingError::Missing | NamingError::Invalid(_) => outcome.fixable = false,
            }
        }
        outcome
    }

    pub fn fix(&self, data: &mut ManifestData) {
        let (Some(canonical), Some(project)) = (&self.canonical, project_table_mut(data)) else {
            return;
        };
        project.insert("name".to_string(), toml::Value::String(canonical.clone()));
    }
}
