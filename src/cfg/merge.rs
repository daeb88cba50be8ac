// src/cfg/merge.rs

//! Merging freshly derived sections into an existing setup.cfg

use super::ConfigDocument;

/// Merge `fresh` over `existing`
///
/// Sections present on one side are carried through unchanged. Sections on
/// both sides are unioned key by key with `fresh` winning. Sections and keys
/// keep the order they were first seen in (`existing` first), so re-running a
/// migration with no substantive change never reorders the file.
pub fn merge_configs(existing: &ConfigDocument, fresh: &ConfigDocument) -> ConfigDocument {
    let mut merged = existing.clone();
    for (name, body) in fresh.sections() {
        let section = merged.section_mut(name);
        for (key, value) in body {
            section.insert(key.clone(), value.clone());
        }
    }
    merged
}
