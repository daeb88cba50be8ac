// src/validate/schema.rs

use super::ValidationOutcome;
use crate::manifest::{ManifestData, schema};

/// Structural conformance of `build-system` and `project`
///
/// Nothing here is auto-corrected, and any problem stops the remaining
/// validators since they read fields this one vouches for.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn validate(&self, data: &ManifestData) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();
        let problems = schema::check(data);
        if !problems.is_empty() {
            outcome.fixable = false;
            outcome.exit_early = true;
            outcome.errors = problems.iter().map(ToString::to_string).collect();
        }
        outcome
    }
}
