// src/dependency/normalize.rs

//! Normalization of whole dependency lists

use super::specifier::DependencySpecifier;
use super::{DependencyError, canonicalize_name, repair};
use tracing::debug;

/// Result of normalizing one dependency list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedList {
    /// Sorted entries; unparseable ones keep their repaired text
    pub items: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// At least one entry was rewritten to its canonical form
    pub corrected: bool,
    /// Sorting changed the order
    pub reordered: bool,
}

impl NormalizedList {
    /// Whether writing `items` back is safe
    ///
    /// Corrections and reorderings are applied even when some entries could
    /// not be parsed, since those keep the text they already had.
    pub fn fixable(&self) -> bool {
        self.errors.is_empty() || self.corrected || self.reordered
    }

    pub fn has_findings(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }
}

/// Repair and canonicalize a single requirement string
pub fn normalize_requirement(raw: &str) -> Result<String, DependencyError> {
    canonical_form(&repair(raw))
}

fn canonical_form(repaired: &str) -> Result<String, DependencyError> {
    let mut spec = DependencySpecifier::parse(repaired)?;
    spec.name = canonicalize_name(&spec.name);
    Ok(spec.to_string().to_lowercase().replace('"', "'"))
}

/// Normalize a dependency list, collecting findings under `prefix`
///
/// Entries are numbered from 1 in messages.
pub fn normalize_list(raw: &[String], prefix: &str) -> NormalizedList {
    let mut result = NormalizedList::default();

    for (index, entry) in raw.iter().enumerate() {
        let number = index + 1;
        let repaired = repair(entry);

        match canonical_form(&repaired) {
            Ok(normalized) => {
                if normalized != *entry {
                    result.corrected = true;
                    result.warnings.push(format!(
                        "{} #{} was corrected from '{}' to '{}'",
                        prefix, number, entry, normalized
                    ));
                }
                result.items.push(normalized);
            }
            Err(e) => {
                debug!("Could not parse {} #{}: {}", prefix, number, e);
                result.errors.push(format!(
                    "{} #{}: '{}' -> Error: {}",
                    prefix, number, repaired, e
                ));
                result.items.push(repaired);
            }
        }
    }

    let before: Vec<String> = result.items.iter().map(|s| s.to_lowercase()).collect();
    result.items.sort();
    let after: Vec<String> = result.items.iter().map(|s| s.to_lowercase()).collect();

    if before != after {
        result.reordered = true;
        result.warnings.push(format!(
            "{} are not sorted. Corrected order: {}",
            prefix,
            result.items.join(", ")
        ));
    }

    result
}
