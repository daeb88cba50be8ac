// src/validate/dependency.rs

use super::{ValidationOutcome, project_table, project_table_mut};
use crate::dependency::{NormalizedList, normalize_list};
use crate::manifest::ManifestData;
use indexmap::IndexMap;
use tracing::debug;

/// Normalizes and sorts `dependencies` and every `optional-dependencies` group
#[derive(Debug, Clone, Default)]
pub struct DependencyValidator {
    dependencies: Vec<String>,
    optional: IndexMap<String, Vec<String>>,
}

fn string_list(value: &toml::Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

impl DependencyValidator {
    pub fn validate(&mut self, data: &ManifestData) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();
        self.dependencies.clear();
        self.optional.clear();

        let Some(project) = project_table(data) else {
            return outcome;
        };

        if let Some(value) = project.get("dependencies") {
            match string_list(value) {
                Some(raw) => {
                    let list = normalize_list(&raw, "dependencies");
                    Self::absorb(&mut outcome, &list);
                    self.dependencies = list.items;
                }
                None => {
                    outcome.errors.push("`dependencies` must be an array of strings".to_string());
                    outcome.fixable = false;
                }
            }
        }

        if let Some(groups) = project.get("optional-dependencies").and_then(toml::Value::as_table) {
            for (group, value) in groups {
                let prefix = format!("optional `{}` dependencies", group);
                match string_list(value) {
                    Some(raw) => {
                        let list = normalize_list(&raw, &prefix);
                        Self::absorb(&mut outcome, &list);
                        self.optional.insert(group.clone(), list.items);
                    }
                    None => {
                        outcome.errors.push(format!("{} must be an array of strings", prefix));
                        outcome.fixable = false;
                    }
                }
            }
        }

        debug!(
            "Normalized {} dependencies and {} optional groups",
            self.dependencies.len(),
            self.optional.len()
        );
        outcome
    }

    fn absorb(outcome: &mut ValidationOutcome, list: &NormalizedList) {
        outcome.errors.extend(list.errors.iter().cloned());
        outcome.warnings.extend(list.warnings.iter().cloned());
        if !list.fixable() {
            outcome.fixable = false;
        }
    }

    /// Write the normalized lists back; empty results leave the document alone
    pub fn fix(&self, data: &mut ManifestData) {
        let Some(project) = project_table_mut(data) else {
            return;
        };

        if !self.dependencies.is_empty() {
            project.insert(
                "dependencies".to_string(),
                toml::Value::Array(self.dependencies.iter().cloned().map(toml::Value::String).collect()),
            );
        }

        if !self.optional.is_empty() {
            let mut groups = toml::Table::new();
            for (group, items) in &self.optional {
                groups.insert(
                    group.clone(),
                    toml::Value::Array(items.iter().cloned().map(toml::Value::String).collect()),
                );
            }
            project.insert("optional-dependencies".to_string(), toml::Value::Table(groups));
        }
    }
}
