// src/translate/setuptools.rs

use super::{TranslateError, Translator};
use crate::Result;
use crate::cfg::{
    ConfigDocument, ENTRY_POINTS, EXCLUDE_PACKAGE_DATA, EXTRAS_REQUIRE, METADATA, OPTIONS,
    PACKAGE_DATA, PACKAGES_FIND, Section, ini,
};
use toml::{Table, Value};
use tracing::{debug, warn};

/// Build backend written to `[build-system]`
pub const BUILD_BACKEND: &str = "setuptools.build_meta";

/// Oldest setuptools that reads `[project]` from pyproject.toml
pub const SETUPTOOLS_REQUIREMENT: &str = "setuptools>=61.2";

const DATA_FILES: &str = "options.data_files";

/// distutils commands whose sections move under `[tool.distutils]`
const DISTUTILS_COMMANDS: &[&str] = &[
    "aliases",
    "bdist_egg",
    "bdist_rpm",
    "bdist_wheel",
    "build",
    "build_ext",
    "build_py",
    "build_sphinx",
    "egg_info",
    "install",
    "sdist",
    "upload_docs",
];

/// Options that no longer mean anything to setuptools
const DROPPED_OPTIONS: &[&str] = &[
    "test_suite",
    "use_2to3",
    "use_2to3_fixers",
    "use_2to3_exclude_fixers",
    "convert_2to3_doctest",
];

/// The setuptools profile: `[metadata]`/`[options]` to `[project]`/`[tool.setuptools]`
#[derive(Debug, Clone, Copy, Default)]
pub struct SetuptoolsTranslator;

impl Translator for SetuptoolsTranslator {
    fn translate(&self, ini_text: &str) -> Result<String> {
        let doc = ini::parse(ini_text)?;
        let table = self.to_table(&doc)?;
        Ok(toml::to_string_pretty(&table)?)
    }
}

impl SetuptoolsTranslator {
    /// Translate a parsed setup.cfg into a pyproject.toml document
    pub fn to_table(&self, doc: &ConfigDocument) -> std::result::Result<Table, TranslateError> {
        let mut out = Translation::default();

        if let Some(metadata) = doc.section(METADATA) {
            out.metadata(metadata)?;
        }
        if let Some(options) = doc.section(OPTIONS) {
            out.options(options, doc.section(PACKAGES_FIND))?;
        }

        for (name, section) in doc.sections() {
            match name.as_str() {
                METADATA | OPTIONS | PACKAGES_FIND => {}
                ENTRY_POINTS => out.entry_points(section)?,
                EXTRAS_REQUIRE => {
                    for (group, value) in section {
                        out.optional_group(group, split_list(value, ';'));
                    }
                }
                PACKAGE_DATA => out.file_patterns("package-data", section),
                EXCLUDE_PACKAGE_DATA => out.file_patterns("exclude-package-data", section),
                DATA_FILES => out.file_patterns("data-files", section),
                other => out.tool_section(other, section),
            }
        }

        Ok(out.finish())
    }
}

#[derive(Debug, Default)]
struct Translation {
    build_requires: Vec<String>,
    project: Table,
    dynamic_fields: Vec<String>,
    dynamic: Table,
    setuptools: Table,
    tools: Table,
}

/// A value that may defer to code or files
///
/// Literals keep their surrounding whitespace: a leading newline marks a
/// dangling list.
enum Directive {
    Attr(String),
    File(Vec<String>),
    Literal(String),
}

impl Directive {
    fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if let Some(rest) = trimmed.strip_prefix("attr:") {
            Self::Attr(rest.trim().to_string())
        } else if let Some(rest) = trimmed.strip_prefix("file:") {
            Self::File(split_list(rest, ','))
        } else {
            Self::Literal(value.to_string())
        }
    }
}

impl Translation {
    fn metadata(&mut self, section: &Section) -> std::result::Result<(), TranslateError> {
        for (key, value) in section {
            match key.as_str() {
                "name" => self.set_project("name", Value::String(value.trim().to_string())),
                "version" => self.maybe_dynamic("version", value, trimmed_string),
                "description" | "summary" => {
                    self.maybe_dynamic("description", value, trimmed_string)
                }
                "long_description" => {
                    let content_type = section.get("long_description_content_type");
                    self.readme(value, content_type.map(String::as_str));
                }
                "long_description_content_type" => {}
                "author" | "author_email" => {
                    if key == "author" || !section.contains_key("author") {
                        self.people("authors", section, "author", "author_email");
                    }
                }
                "maintainer" | "maintainer_email" => {
                    if key == "maintainer" || !section.contains_key("maintainer") {
                        self.people("maintainers", section, "maintainer", "maintainer_email");
                    }
                }
                "license" => {
                    let mut table = Table::new();
                    match Directive::parse(value) {
                        Directive::File(files) if !files.is_empty() => {
                            table.insert("file".to_string(), Value::String(files[0].clone()));
                        }
                        _ => {
                            table.insert("text".to_string(), Value::String(value.trim().to_string()));
                        }
                    }
                    self.set_project("license", Value::Table(table));
                }
                "license_file" | "license_files" => {
                    self.setuptools
                        .insert("license-files".to_string(), string_array(split_list(value, ',')));
                }
                "keywords" => self.set_project("keywords", string_array(split_list(value, ','))),
                "classifiers" => {
                    self.maybe_dynamic("classifiers", value, |text| {
                        string_array(split_list(&text, ','))
                    })
                }
                "url" | "home_page" => self.url("Homepage", value),
                "download_url" => self.url("Download", value),
                "project_urls" => {
                    for (label, target) in parse_mapping(METADATA, key, value)? {
                        self.url(&label, &target);
                    }
                }
                "platforms" => {
                    self.setuptools
                        .insert("platforms".to_string(), string_array(split_list(value, ',')));
                }
                other => warn!("Dropping unsupported metadata field '{}'", other),
            }
        }
        Ok(())
    }

    fn options(
        &mut self,
        section: &Section,
        find: Option<&Section>,
    ) -> std::result::Result<(), TranslateError> {
        for (key, value) in section {
            match key.as_str() {
                "install_requires" => {
                    self.maybe_dynamic("dependencies", value, |text| {
                        string_array(split_list(&text, ';'))
                    })
                }
                "python_requires" => {
                    self.set_project("requires-python", Value::String(value.trim().to_string()))
                }
                "setup_requires" => self.build_requires.extend(split_list(value, ';')),
                "tests_require" => self.optional_group("testing", split_list(value, ';')),
                "zip_safe" | "include_package_data" => {
                    let flag = parse_bool(OPTIONS, key, value)?;
                    self.setuptools.insert(kebab(key), Value::Boolean(flag));
                }
                "packages" => self.packages(value, find),
                "package_dir" => {
                    let mut dirs = Table::new();
                    for (package, dir) in parse_mapping(OPTIONS, key, value)? {
                        dirs.insert(package, Value::String(dir));
                    }
                    self.setuptools.insert("package-dir".to_string(), Value::Table(dirs));
                }
                "scripts" => {
                    self.setuptools
                        .insert("script-files".to_string(), string_array(split_list(value, ',')));
                }
                "py_modules" | "namespace_packages" | "eager_resources" | "dependency_links" => {
                    self.setuptools
                        .insert(kebab(key), string_array(split_list(value, ',')));
                }
                dropped if DROPPED_OPTIONS.contains(&dropped) => {
                    debug!("Dropping deprecated option '{}'", dropped);
                }
                other => {
                    self.setuptools
                        .insert(kebab(other), Value::String(value.trim().to_string()));
                }
            }
        }
        Ok(())
    }

    fn packages(&mut self, value: &str, find: Option<&Section>) {
        let directive = value.trim();
        if directive != "find:" && directive != "find_namespace:" {
            self.setuptools
                .insert("packages".to_string(), string_array(split_list(value, ',')));
            return;
        }

        let mut table = Table::new();
        for (key, value) in find.into_iter().flatten() {
            table.insert(key.clone(), string_array(split_list(value, ',')));
        }
        if directive == "find:" {
            table.insert("namespaces".to_string(), Value::Boolean(false));
        }

        let mut packages = Table::new();
        packages.insert("find".to_string(), Value::Table(table));
        self.setuptools
            .insert("packages".to_string(), Value::Table(packages));
    }

    fn entry_points(&mut self, section: &Section) -> std::result::Result<(), TranslateError> {
        for (group, value) in section {
            let mut entries = Table::new();
            for line in split_list(value, ';') {
                let Some((name, target)) = line.split_once('=') else {
                    return Err(TranslateError::InvalidMapping {
                        section: ENTRY_POINTS.to_string(),
                        key: group.clone(),
                        line,
                    });
                };
                entries.insert(name.trim().to_string(), Value::String(target.trim().to_string()));
            }

            match group.as_str() {
                "console_scripts" => self.set_project("scripts", Value::Table(entries)),
                "gui_scripts" => self.set_project("gui-scripts", Value::Table(entries)),
                _ => {
                    subtable(&mut self.project, "entry-points")
                        .insert(group.clone(), Value::Table(entries));
                }
            }
        }
        Ok(())
    }

    fn optional_group(&mut self, group: &str, items: Vec<String>) {
        subtable(&mut self.project, "optional-dependencies")
            .insert(group.to_string(), string_array(items));
    }

    fn file_patterns(&mut self, key: &str, section: &Section) {
        let table = subtable(&mut self.setuptools, key);
        for (package, patterns) in section {
            table.insert(package.clone(), string_array(split_list(patterns, ',')));
        }
    }

    /// `[tool:pytest]`, `[coverage:run]`, `[bdist_wheel]` and friends
    fn tool_section(&mut self, name: &str, section: &Section) {
        let mut body = Table::new();
        for (key, value) in section {
            let converted = if value.contains('\n') {
                string_array(split_list(value, '\n'))
            } else {
                Value::String(value.trim().to_string())
            };
            body.insert(key.clone(), converted);
        }

        if DISTUTILS_COMMANDS.contains(&name) {
            subtable(&mut self.tools, "distutils").insert(name.to_string(), Value::Table(body));
            return;
        }

        let path: Vec<&str> = match name.strip_prefix("tool:") {
            Some("pytest") => vec!["pytest", "ini_options"],
            Some(rest) => rest.split(':').collect(),
            None => name.split(':').collect(),
        };
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut target = &mut self.tools;
        for parent in parents {
            target = subtable(target, parent);
        }
        debug!("Moving [{}] to tool.{}", name, path.join("."));
        target.insert(last.to_string(), Value::Table(body));
    }

    fn readme(&mut self, value: &str, content_type: Option<&str>) {
        match Directive::parse(value) {
            Directive::File(files) if files.len() == 1 => {
                let file = files[0].clone();
                match content_type {
                    Some(ct) => {
                        let mut table = Table::new();
                        table.insert("file".to_string(), Value::String(file));
                        table.insert("content-type".to_string(), Value::String(ct.to_string()));
                        self.set_project("readme", Value::Table(table));
                    }
                    None => self.set_project("readme", Value::String(file)),
                }
            }
            Directive::File(files) => {
                let mut table = Table::new();
                table.insert("file".to_string(), string_array(files));
                if let Some(ct) = content_type {
                    table.insert("content-type".to_string(), Value::String(ct.to_string()));
                }
                self.dynamic_field("readme", Value::Table(table));
            }
            Directive::Attr(_) | Directive::Literal(_) => {
                let mut table = Table::new();
                table.insert("text".to_string(), Value::String(value.trim().to_string()));
                table.insert(
                    "content-type".to_string(),
                    Value::String(content_type.unwrap_or("text/plain").to_string()),
                );
                self.set_project("readme", Value::Table(table));
            }
        }
    }

    /// Pair up comma-separated names and emails
    fn people(&mut self, field: &str, section: &Section, name_key: &str, email_key: &str) {
        let names = section.get(name_key).map(|v| split_list(v, ',')).unwrap_or_default();
        let emails = section.get(email_key).map(|v| split_list(v, ',')).unwrap_or_default();

        let mut people = Vec::new();
        for i in 0..names.len().max(emails.len()) {
            let mut person = Table::new();
            if let Some(name) = names.get(i) {
                person.insert("name".to_string(), Value::String(name.clone()));
            }
            if let Some(email) = emails.get(i) {
                person.insert("email".to_string(), Value::String(email.clone()));
            }
            people.push(Value::Table(person));
        }
        if !people.is_empty() {
            self.set_project(field, Value::Array(people));
        }
    }

    fn url(&mut self, label: &str, target: &str) {
        subtable(&mut self.project, "urls")
            .insert(label.to_string(), Value::String(target.trim().to_string()));
    }

    fn set_project(&mut self, key: &str, value: Value) {
        self.project.insert(key.to_string(), value);
    }

    /// Static value, or a `tool.setuptools.dynamic` entry for `attr:`/`file:`
    fn maybe_dynamic(&mut self, field: &str, value: &str, literal: impl FnOnce(String) -> Value) {
        let mut table = Table::new();
        match Directive::parse(value) {
            Directive::Literal(text) => {
                self.set_project(field, literal(text));
                return;
            }
            Directive::Attr(attr) => {
                table.insert("attr".to_string(), Value::String(attr));
            }
            Directive::File(mut files) => {
                let file = if files.len() == 1 {
                    Value::String(files.remove(0))
                } else {
                    string_array(files)
                };
                table.insert("file".to_string(), file);
            }
        }
        self.dynamic_field(field, Value::Table(table));
    }

    fn dynamic_field(&mut self, field: &str, spec: Value) {
        self.dynamic.insert(field.to_string(), spec);
        if !self.dynamic_fields.iter().any(|f| f == field) {
            self.dynamic_fields.push(field.to_string());
        }
    }

    fn finish(mut self) -> Table {
        let mut requires = vec![SETUPTOOLS_REQUIREMENT.to_string()];
        for requirement in self.build_requires {
            if !requires.contains(&requirement) {
                requires.push(requirement);
            }
        }

        let mut build_system = Table::new();
        build_system.insert("requires".to_string(), string_array(requires));
        build_system.insert("build-backend".to_string(), Value::String(BUILD_BACKEND.to_string()));

        if !self.dynamic_fields.is_empty() {
            self.project
                .insert("dynamic".to_string(), string_array(self.dynamic_fields));
        }
        if !self.dynamic.is_empty() {
            self.setuptools
                .insert("dynamic".to_string(), Value::Table(self.dynamic));
        }

        let mut tool = Table::new();
        if !self.setuptools.is_empty() {
            tool.insert("setuptools".to_string(), Value::Table(self.setuptools));
        }
        for (name, value) in self.tools {
            tool.insert(name, value);
        }

        let mut root = Table::new();
        root.insert("build-system".to_string(), Value::Table(build_system));
        if !self.project.is_empty() {
            root.insert("project".to_string(), Value::Table(self.project));
        }
        if !tool.is_empty() {
            root.insert("tool".to_string(), Value::Table(tool));
        }
        root
    }
}

/// Items of a setup.cfg list value
///
/// Dangling values hold one item per line; single-line values are split on
/// `separator`. Blank items are dropped.
fn split_list(value: &str, separator: char) -> Vec<String> {
    let items: Vec<&str> = if value.contains('\n') {
        value.lines().collect()
    } else {
        value.split(separator).collect()
    };
    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_mapping(
    section: &str,
    key: &str,
    value: &str,
) -> std::result::Result<Vec<(String, String)>, TranslateError> {
    split_list(value, '\n')
        .into_iter()
        .map(|line| match line.split_once('=') {
            Some((k, v)) => Ok((k.trim().to_string(), v.trim().to_string())),
            None => Err(TranslateError::InvalidMapping {
                section: section.to_string(),
                key: key.to_string(),
                line,
            }),
        })
        .collect()
}

fn parse_bool(section: &str, key: &str, value: &str) -> std::result::Result<bool, TranslateError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(TranslateError::InvalidBoolean {
            section: section.to_string(),
            key: key.to_string(),
            value: value.trim().to_string(),
        }),
    }
}

fn trimmed_string(text: String) -> Value {
    Value::String(text.trim().to_string())
}

fn kebab(key: &str) -> String {
    key.replace('_', "-")
}

fn string_array(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

/// Child table of `parent`, created (or replacing a non-table) when needed
fn subtable<'a>(parent: &'a mut Table, key: &str) -> &'a mut Table {
    let value = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Table(Table::new()));
    if !value.is_table() {
        *value = Value::Table(Table::new());
    }
    match value {
        Value::Table(table) => table,
        _ => unreachable!("replaced with a table above"),
    }
}
