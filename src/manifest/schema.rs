// src/manifest/schema.rs
//! Typed view of the `build-system` and `project` tables
//!
//! Deserializing into these structs checks field presence and types; the
//! rules serde cannot express (mutually exclusive keys, known content
//! types, static/dynamic overlap) are checked afterwards.

use super::ManifestData;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

pub const README_EXTENSIONS: &[&str] = &[".md", ".rst", ".txt"];
pub const README_CONTENT_TYPES: &[&str] = &["text/markdown", "text/x-rst", "text/plain"];

/// A structural problem in pyproject.toml
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaValidationError {
    #[error("build-system: {0}")]
    BuildSystem(String),

    #[error("project: {0}")]
    Project(String),

    #[error("project.readme: must have one of the following extensions: {}", README_EXTENSIONS.join(", "))]
    ReadmeExtension(String),

    #[error("project.readme.content-type: must be one of: {}", README_CONTENT_TYPES.join(", "))]
    ReadmeContentType(String),

    #[error("project.{0}: cannot contain both a `file` and `text` field")]
    FileAndText(&'static str),

    #[error("project.license-files: must contain either a `globs` or `paths` field")]
    LicenseFilesEmpty,

    #[error("project.dynamic: the `name` field must not be listed as dynamic")]
    DynamicName,

    #[error("project: missing field(s): {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("project: field(s) defined but also listed as dynamic: {}", .0.join(", "))]
    Redefined(Vec<String>),
}

/// `[build-system]`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildSystemConfig {
    pub requires: Vec<String>,

    pub build_backend: String,

    #[serde(default)]
    pub backend_path: Option<Vec<String>>,
}

/// `[project]`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub readme: Option<Readme>,

    #[serde(default)]
    pub requires_python: Option<String>,

    #[serde(default)]
    pub license: Option<License>,

    #[serde(default)]
    pub license_files: Option<LicenseFiles>,

    #[serde(default)]
    pub authors: Option<Vec<Person>>,

    #[serde(default)]
    pub maintainers: Option<Vec<Person>>,

    #[serde(default)]
    pub keywords: Option<Vec<String>>,

    #[serde(default)]
    pub classifiers: Option<Vec<String>>,

    #[serde(default)]
    pub urls: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub scripts: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub gui_scripts: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub entry_points: Option<BTreeMap<String, BTreeMap<String, String>>>,

    #[serde(default)]
    pub dependencies: Option<Vec<String>>,

    #[serde(default)]
    pub optional_dependencies: Option<BTreeMap<String, Vec<String>>>,

    #[serde(default)]
    pub dynamic: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Readme {
    Path(String),
    Table(ReadmeTable),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReadmeTable {
    pub content_type: String,

    #[serde(default)]
    pub charset: Option<String>,

    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum License {
    Expression(String),
    Table(LicenseTable),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LicenseTable {
    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LicenseFiles {
    #[serde(default)]
    pub globs: Option<Vec<String>>,

    #[serde(default)]
    pub paths: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl ProjectConfig {
    fn is_dynamic(&self, field: &str) -> bool {
        self.dynamic
            .as_ref()
            .is_some_and(|fields| fields.iter().any(|f| f == field))
    }

    /// Rules that depend on more than one field or on field contents
    ///
    /// `raw` is the untyped table the config was read from; it decides which
    /// fields count as statically defined.
    pub fn check(&self, raw: &toml::Table) -> Vec<SchemaValidationError> {
        let mut problems = Vec::new();

        match &self.readme {
            Some(Readme::Path(path)) => {
                let lowered = path.to_lowercase();
                if !README_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
                    problems.push(SchemaValidationError::ReadmeExtension(path.clone()));
                }
            }
            Some(Readme::Table(table)) => {
                if table.file.is_some() && table.text.is_some() {
                    problems.push(SchemaValidationError::FileAndText("readme"));
                }
                if !README_CONTENT_TYPES.contains(&table.content_type.as_str()) {
                    problems.push(SchemaValidationError::ReadmeContentType(
                        table.content_type.clone(),
                    ));
                }
            }
            None => {}
        }

        if let Some(License::Table(table)) = &self.license {
            if table.file.is_some() && table.text.is_some() {
                problems.push(SchemaValidationError::FileAndText("license"));
            }
        }

        if let Some(files) = &self.license_files {
            if files.globs.is_none() && files.paths.is_none() {
                problems.push(SchemaValidationError::LicenseFilesEmpty);
            }
        }

        if self.is_dynamic("name") {
            problems.push(SchemaValidationError::DynamicName);
        }

        if self.version.is_none() && !self.is_dynamic("version") {
            problems.push(SchemaValidationError::MissingFields(vec![
                "version".to_string(),
            ]));
        }

        let redefined: Vec<String> = raw
            .keys()
            .filter(|key| key.as_str() != "dynamic" && self.is_dynamic(key))
            .cloned()
            .collect();
        if !redefined.is_empty() {
            problems.push(SchemaValidationError::Redefined(redefined));
        }

        problems
    }
}

fn table_or_empty(data: &ManifestData, key: &str) -> toml::Value {
    data.get(key)
        .cloned()
        .unwrap_or_else(|| toml::Value::Table(toml::Table::new()))
}

fn describe(e: toml::de::Error) -> String {
    e.to_string().trim().to_string()
}

/// Check the `build-system` and `project` tables of a manifest
///
/// A missing table is checked as an empty one, so its required fields are
/// reported as missing.
pub fn check(data: &ManifestData) -> Vec<SchemaValidationError> {
    let mut problems = Vec::new();

    if let Err(e) = table_or_empty(data, "build-system").try_into::<BuildSystemConfig>() {
        problems.push(SchemaValidationError::BuildSystem(describe(e)));
    }

    let project = table_or_empty(data, "project");
    match project.clone().try_into::<ProjectConfig>() {
        Ok(config) => {
            let empty = toml::Table::new();
            let raw = project.as_table().unwrap_or(&empty);
            problems.extend(config.check(raw));
        }
        Err(e) => problems.push(SchemaValidationError::Project(describe(e))),
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(text: &str) -> ManifestData {
        toml::from_str(text).unwrap()
    }

    const BUILD_SYSTEM: &str = "\
[build-system]
requires = [\"setuptools>=61.2\"]
build-backend = \"setuptools.build_meta\"
";

    fn with_project(project: &str) -> ManifestData {
        manifest(&format!("{}\n[project]\n{}", BUILD_SYSTEM, project))
    }

    #[test]
    fn test_minimal_manifest_is_valid() {
        let data = with_project("name = \"demo\"\nversion = \"1.0\"\n");
        assert!(check(&data).is_empty());
    }

    #[test]
    fn test_missing_tables() {
        let problems = check(&ManifestData::new());
        assert_eq!(problems.len(), 2);
        assert!(matches!(problems[0], SchemaValidationError::BuildSystem(_)));
        assert!(matches!(problems[1], SchemaValidationError::Project(_)));
    }

    #[test]
    fn test_missing_build_backend() {
        let data = manifest("[build-system]\nrequires = []\n[project]\nname = \"demo\"\nversion = \"1\"\n");
        let problems = check(&data);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].to_string().contains("build-backend"));
    }

    #[test]
    fn test_version_required_unless_dynamic() {
        let problems = check(&with_project("name = \"demo\"\n"));
        assert_eq!(
            problems,
            [SchemaValidationError::MissingFields(vec!["version".to_string()])]
        );
        assert_eq!(problems[0].to_string(), "project: missing field(s): version");

        let dynamic = with_project("name = \"demo\"\ndynamic = [\"version\"]\n");
        assert!(check(&dynamic).is_empty());
    }

    #[test]
    fn test_static_and_dynamic() {
        let data = with_project(
            "name = \"demo\"\nversion = \"1.0\"\ndescription = \"x\"\ndynamic = [\"version\", \"description\"]\n",
        );
        assert_eq!(
            check(&data),
            [SchemaValidationError::Redefined(vec![
                "version".to_string(),
                "description".to_string()
            ])]
        );
    }

    #[test]
    fn test_dynamic_name() {
        let data = with_project("version = \"1.0\"\nname = \"demo\"\ndynamic = [\"name\"]\n");
        let problems = check(&data);
        assert!(problems.contains(&SchemaValidationError::DynamicName));
    }

    #[test]
    fn test_readme_rules() {
        let bad_ext = with_project("name = \"demo\"\nversion = \"1\"\nreadme = \"README.doc\"\n");
        assert_eq!(
            check(&bad_ext),
            [SchemaValidationError::ReadmeExtension("README.doc".to_string())]
        );

        let upper = with_project("name = \"demo\"\nversion = \"1\"\nreadme = \"README.MD\"\n");
        assert!(check(&upper).is_empty());

        let table = with_project(
            "name = \"demo\"\nversion = \"1\"\nreadme = { file = \"README\", text = \"x\", content-type = \"text/html\" }\n",
        );
        assert_eq!(
            check(&table),
            [
                SchemaValidationError::FileAndText("readme"),
                SchemaValidationError::ReadmeContentType("text/html".to_string()),
            ]
        );
    }

    #[test]
    fn test_license_rules() {
        let both = with_project(
            "name = \"demo\"\nversion = \"1\"\nlicense = { file = \"LICENSE\", text = \"MIT\" }\n",
        );
        assert_eq!(check(&both), [SchemaValidationError::FileAndText("license")]);

        let files = with_project("name = \"demo\"\nversion = \"1\"\nlicense-files = {}\n");
        assert_eq!(check(&files), [SchemaValidationError::LicenseFilesEmpty]);

        let spdx = with_project("name = \"demo\"\nversion = \"1\"\nlicense = \"MIT\"\n");
        assert!(check(&spdx).is_empty());
    }

    #[test]
    fn test_wrong_types() {
        let data = with_project("name = \"demo\"\nversion = \"1\"\ndependencies = \"requests\"\n");
        let problems = check(&data);
        assert_eq!(problems.len(), 1);
        assert!(matches!(problems[0], SchemaValidationError::Project(_)));
    }
}
