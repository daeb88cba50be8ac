// src/lib.rs

//! pymigrate
//!
//! Moves Python packaging metadata from an executable `setup.py` to a
//! declarative, validated `pyproject.toml`.
//!
//! # Architecture
//!
//! - Capture: run the build script against recording stand-ins of
//!   `setup()`/`find_packages()` and collect their arguments
//! - cfg: render captured arguments as setup.cfg sections and merge them
//!   with an existing file
//! - translate: setup.cfg to pyproject.toml
//! - validate/fixup: schema, name and dependency checks with in-memory fixes,
//!   persisted only when every finding was fixable

pub mod capture;
pub mod cfg;
pub mod dependency;
mod error;
pub mod fixup;
pub mod manifest;
pub mod pipeline;
pub mod translate;
pub mod validate;

pub use error::{Error, Result};
