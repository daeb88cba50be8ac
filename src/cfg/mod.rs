// src/cfg/mod.rs
//! setup.cfg documents
//!
//! Turns captured `setup()` arguments into the sections of a `setup.cfg`,
//! merges them with an existing file and reads/writes the INI text.
//!
//! ## Section layout
//!
//! | Section | Source |
//! |---------|--------|
//! | `metadata` | name, version, author, classifiers, ... |
//! | `options` | install_requires, packages, python_requires, ... |
//! | `options.entry_points` | `entry_points` mapping |
//! | `options.extras_require` | `extras_require` mapping |
//! | `options.package_data` | `package_data` mapping |
//! | `options.exclude_package_data` | `exclude_package_data` mapping |
//! | `options.packages.find` | arguments of `find_packages()` |

pub mod ini;
mod mapper;
mod merge;
mod transform;

pub use mapper::{ArgumentMapper, map_capture};
pub use merge::merge_configs;
pub use transform::{
    DEFAULT_DANGLING_LIST_THRESHOLD, RenderOptions, TransformError, join_lines, list_comma,
    list_semi, mapping,
};

use indexmap::IndexMap;

pub const METADATA: &str = "metadata";
pub const OPTIONS: &str = "options";
pub const ENTRY_POINTS: &str = "options.entry_points";
pub const EXTRAS_REQUIRE: &str = "options.extras_require";
pub const PACKAGE_DATA: &str = "options.package_data";
pub const EXCLUDE_PACKAGE_DATA: &str = "options.exclude_package_data";
pub const PACKAGES_FIND: &str = "options.packages.find";

/// Body of one section: key to rendered string value, in insertion order
pub type Section = IndexMap<String, String>;

/// An ordered setup.cfg document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    sections: IndexMap<String, Section>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Get a section, creating it empty at the end if missing
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        self.sections.entry(name.to_string()).or_default()
    }

    /// Insert or replace a whole section; a replaced section keeps its position
    pub fn insert_section(&mut self, name: impl Into<String>, body: Section) -> Option<Section> {
        self.sections.insert(name.into(), body)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|body| body.get(key))
            .map(String::as_str)
    }

    pub fn set(&mut self, section: &str, key: impl Into<String>, value: impl Into<String>) {
        self.section_mut(section).insert(key.into(), value.into());
    }

    pub fn sections(&self) -> impl Iterator<Item = (&String, &Section)> {
        self.sections.iter()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}
