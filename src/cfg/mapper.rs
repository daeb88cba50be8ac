// src/cfg/mapper.rs

//! Captured `setup()` arguments to setup.cfg sections
//!
//! Walks fixed vocabularies of metadata and options fields. Every field the
//! script passed is rendered with its designated transformer; fields it did
//! not pass are left out entirely.

use super::transform::{
    RenderOptions, TransformError, join_lines, list_comma, list_semi, mapping, scalar,
    string_list, string_pairs,
};
use super::{
    ConfigDocument, ENTRY_POINTS, EXCLUDE_PACKAGE_DATA, EXTRAS_REQUIRE, METADATA, OPTIONS,
    PACKAGE_DATA, PACKAGES_FIND, Section, ini,
};
use crate::capture::shim::{CallKind, StandInMarker, stand_in_marker};
use crate::capture::{CaptureError, CaptureResult, CapturedCall, RecordedCall};
use crate::error::Result;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How a field's value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Render {
    Scalar,
    ListComma,
    ListSemi,
    Lines,
    Mapping,
    /// Text that may be the contents of a file next to setup.py
    FileOrText,
    /// Explicit package list or the discovery marker
    Packages,
}

const METADATA_FIELDS: &[(&str, Render)] = &[
    ("name", Render::Scalar),
    ("version", Render::Scalar),
    ("author", Render::Scalar),
    ("author_email", Render::Scalar),
    ("maintainer", Render::Scalar),
    ("maintainer_email", Render::Scalar),
    ("license", Render::FileOrText),
    ("description", Render::Scalar),
    ("keywords", Render::ListComma),
    ("url", Render::Scalar),
    ("download_url", Render::Scalar),
    ("long_description", Render::FileOrText),
    ("long_description_content_type", Render::Scalar),
    ("classifiers", Render::Lines),
    ("platforms", Render::ListComma),
    ("provides", Render::ListComma),
    ("requires", Render::ListComma),
    ("obsoletes", Render::ListComma),
    ("project_urls", Render::Mapping),
];

const OPTIONS_FIELDS: &[(&str, Render)] = &[
    ("package_dir", Render::Mapping),
    ("py_modules", Render::ListComma),
    ("packages", Render::Packages),
    ("zip_safe", Render::Scalar),
    ("setup_requires", Render::ListSemi),
    ("install_requires", Render::ListSemi),
    ("include_package_data", Render::Scalar),
    ("python_requires", Render::Scalar),
    ("use_2to3", Render::Scalar),
    ("use_2to3_fixers", Render::ListComma),
    ("use_2to3_exclude_fixers", Render::ListComma),
    ("convert_2to3_doctest", Render::ListComma),
    ("scripts", Render::ListComma),
    ("eager_resources", Render::ListComma),
    ("dependency_links", Render::ListComma),
    ("test_suite", Render::Scalar),
    ("tests_require", Render::ListSemi),
    ("namespace_packages", Render::ListComma),
];

/// Keyword-argument mappings that become their own section
const MAPPING_SECTIONS: &[(&str, &str)] = &[
    ("extras_require", EXTRAS_REQUIRE),
    ("package_data", PACKAGE_DATA),
    ("exclude_package_data", EXCLUDE_PACKAGE_DATA),
];

/// Positional parameters of `find_packages(where, exclude, include)`
const DISCOVERY_PARAMS: &[&str] = &["where", "exclude", "include"];

/// Maps captured `setup()` arguments to a [`ConfigDocument`]
pub struct ArgumentMapper {
    threshold: usize,
    script: Option<PathBuf>,
    script_dir: Option<PathBuf>,
}

impl ArgumentMapper {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            threshold: options.dangling_list_threshold,
            script: None,
            script_dir: None,
        }
    }

    /// Build script named in errors; its directory is searched like
    /// [`with_script_dir`](Self::with_script_dir)
    pub fn with_script(mut self, script: &Path) -> Self {
        self.script = Some(script.to_path_buf());
        if let Some(dir) = script.parent() {
            self.script_dir = Some(dir.to_path_buf());
        }
        self
    }

    /// Directory searched for files whose contents match text fields
    pub fn with_script_dir(mut self, dir: &Path) -> Self {
        self.script_dir = Some(dir.to_path_buf());
        self
    }

    /// Build the metadata, options and named sections for one `setup()` call
    pub fn map(
        &self,
        setup: &CapturedCall,
        discovery: Option<&RecordedCall>,
    ) -> Result<ConfigDocument> {
        let mut named: Vec<(String, Section)> = Vec::new();

        let metadata = self.map_block(METADATA_FIELDS, setup, discovery, &mut named)?;
        let options = self.map_block(OPTIONS_FIELDS, setup, discovery, &mut named)?;

        if let Some(entry_points) = setup.kwargs.get("entry_points") {
            if let Some(section) = self.entry_points_section(entry_points)? {
                named.push((ENTRY_POINTS.to_string(), section));
            }
        }

        for (field, section_name) in MAPPING_SECTIONS {
            if let Some(value) = setup.kwargs.get(*field) {
                if value.is_null() {
                    continue;
                }
                named.push((section_name.to_string(), self.extract_section(field, value)?));
            }
        }

        let mut doc = ConfigDocument::new();
        if !metadata.is_empty() {
            doc.insert_section(METADATA, metadata);
        }
        if !options.is_empty() {
            doc.insert_section(OPTIONS, options);
        }
        for (name, section) in named {
            doc.insert_section(name, section);
        }

        debug!(
            "Mapped setup() arguments to sections: {}",
            doc.section_names().collect::<Vec<_>>().join(", ")
        );
        Ok(doc)
    }

    fn map_block(
        &self,
        fields: &[(&str, Render)],
        setup: &CapturedCall,
        discovery: Option<&RecordedCall>,
        named: &mut Vec<(String, Section)>,
    ) -> Result<Section> {
        let mut block = Section::new();
        for (field, render) in fields {
            let Some(value) = setup.kwargs.get(*field) else {
                continue;
            };
            if let Some(rendered) = self.render_field(field, *render, value, discovery, named)? {
                block.insert(field.to_string(), rendered);
            }
        }
        Ok(block)
    }

    fn render_field(
        &self,
        field: &str,
        render: Render,
        value: &Value,
        discovery: Option<&RecordedCall>,
        named: &mut Vec<(String, Section)>,
    ) -> Result<Option<String>> {
        if value.is_null() {
            return Ok(None);
        }

        let rendered = match render {
            Render::Scalar => scalar(field, value)?,
            Render::ListComma => Some(list_comma(&string_list(field, value)?, self.threshold)),
            Render::ListSemi => Some(list_semi(&string_list(field, value)?, self.threshold)),
            Render::Lines => Some(join_lines(&string_list(field, value)?)),
            Render::Mapping => Some(mapping(&string_pairs(field, value)?)),
            Render::FileOrText => scalar(field, value)?.map(|text| self.find_file(text)),
            Render::Packages => Some(self.packages(value, discovery, named)?),
        };
        Ok(rendered)
    }

    /// `find:` for discovered packages, otherwise a comma list
    fn packages(
        &self,
        value: &Value,
        discovery: Option<&RecordedCall>,
        named: &mut Vec<(String, Section)>,
    ) -> Result<String> {
        let Some(StandInMarker::Discovery(kind)) = stand_in_marker(value) else {
            return Ok(list_comma(&string_list("packages", value)?, self.threshold));
        };

        let Some(recorded) = discovery else {
            let script = self
                .script
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "setup.py".to_string());
            return Err(CaptureError::DiscoveryNotCalled(script).into());
        };

        let find = self.discovery_section(&recorded.call)?;
        if !find.is_empty() {
            named.push((PACKAGES_FIND.to_string(), find));
        }

        Ok(match kind {
            CallKind::FindNamespacePackages => "find_namespace:",
            _ => "find:",
        }
        .to_string())
    }

    fn discovery_section(&self, call: &CapturedCall) -> Result<Section> {
        let positional = DISCOVERY_PARAMS.iter().copied().zip(call.args.iter());
        let keywords = call.kwargs.iter().map(|(k, v)| (k.as_str(), v));

        let mut section = Section::new();
        for (param, value) in positional.chain(keywords) {
            let rendered = match value {
                Value::Array(_) => Some(list_comma(&string_list(param, value)?, self.threshold)),
                other => scalar(param, other)?,
            };
            if let Some(rendered) = rendered {
                section.insert(param.to_string(), rendered);
            }
        }
        Ok(section)
    }

    /// Join every mapping value into a semicolon list
    fn extract_section(&self, field: &str, value: &Value) -> Result<Section> {
        let Some(map) = value.as_object().filter(|_| stand_in_marker(value).is_none()) else {
            return Err(TransformError::UnsupportedShape {
                field: field.to_string(),
                shape: if value.is_array() { "list" } else { "scalar" },
            }
            .into());
        };

        let mut section = Section::new();
        for (key, items) in map {
            section.insert(key.clone(), list_semi(&string_list(field, items)?, self.threshold));
        }
        Ok(section)
    }

    fn entry_points_section(&self, value: &Value) -> Result<Option<Section>> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) => {
                // INI-style entry points: one [group] per section
                let parsed = ini::parse_preserving_case(text)?;
                let mut section = Section::new();
                for (group, entries) in parsed.sections() {
                    let lines: Vec<String> = entries
                        .iter()
                        .map(|(name, target)| format!("{} = {}", name, target))
                        .collect();
                    section.insert(group.clone(), list_semi(&lines, self.threshold));
                }
                Ok(Some(section))
            }
            other => self.extract_section("entry_points", other).map(Some),
        }
    }

    /// `file: NAME` when `content` matches a file next to setup.py
    fn find_file(&self, content: String) -> String {
        let Some(dir) = &self.script_dir else {
            return content;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return content;
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        for path in paths {
            if fs::read_to_string(&path).is_ok_and(|text| text == content) {
                if let Some(name) = path.file_name() {
                    return format!("file: {}", name.to_string_lossy());
                }
            }
        }
        content
    }
}

/// Map a capture result using the script's own directory for file lookups
pub fn map_capture(capture: &CaptureResult, options: &RenderOptions) -> Result<ConfigDocument> {
    ArgumentMapper::new(options)
        .with_script(&capture.script)
        .with_script_dir(&capture.script_dir)
        .map(&capture.setup, capture.discovery.as_ref())
}
