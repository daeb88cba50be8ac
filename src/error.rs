// src/error.rs

//! Crate-level error type
//!
//! Each subsystem owns a focused error enum; this type wraps them so the
//! pipeline can propagate any of them with `?`.

use crate::capture::CaptureError;
use crate::cfg::TransformError;
use crate::cfg::ini::IniError;
use crate::translate::TranslateError;
use thiserror::Error;

/// Result type for pymigrate operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The build script did not make the expected declarative calls
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// A captured value could not be rendered into setup.cfg form
    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    /// setup.cfg could not be parsed
    #[error("invalid setup.cfg: {0}")]
    Ini(#[from] IniError),

    /// setup.cfg could not be translated to pyproject.toml
    #[error("translation failed: {0}")]
    Translate(#[from] TranslateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No pyproject.toml between the start directory and the filesystem root
    #[error("could not locate a pyproject.toml file above {0}")]
    ManifestNotFound(String),
}
