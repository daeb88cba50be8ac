// src/translate/mod.rs

//! setup.cfg to pyproject.toml translation
//!
//! A [`Translator`] turns INI text into TOML text. The setuptools profile is
//! the only one provided: `[metadata]` and the `[options*]` sections map onto
//! `[project]` and `[tool.setuptools]`, everything else lands under `[tool]`.

mod setuptools;

pub use setuptools::SetuptoolsTranslator;

use crate::Result;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("[{section}] {key}: expected a boolean, found '{value}'")]
    InvalidBoolean {
        section: String,
        key: String,
        value: String,
    },

    #[error("[{section}] {key}: expected 'name = value', found '{line}'")]
    InvalidMapping {
        section: String,
        key: String,
        line: String,
    },
}

/// Converts one configuration format into pyproject.toml text
pub trait Translator {
    fn translate(&self, ini_text: &str) -> Result<String>;
}
