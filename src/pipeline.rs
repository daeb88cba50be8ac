// src/pipeline.rs

//! End-to-end migration steps
//!
//! ```text
//! setup.py --capture--> setup.cfg --format--> setup.cfg --translate--> pyproject.toml --validate/fix
//! ```
//!
//! Each step reads and writes files next to the input, so a run can start
//! from whichever stage the project is already at.

use crate::Result;
use crate::capture::{CaptureOptions, capture_setup};
use crate::cfg::{ConfigDocument, RenderOptions, ini, map_capture, merge_configs};
use crate::fixup::{FixupReport, FixupRunner};
use crate::manifest::{MANIFEST_FILE_NAME, ManifestFile};
use crate::translate::{SetuptoolsTranslator, Translator};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SETUP_CFG_FILE_NAME: &str = "setup.cfg";

/// Options for a full migration
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    pub render: RenderOptions,
    pub capture: CaptureOptions,
    /// Apply validator fixes and save pyproject.toml
    pub fix: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            capture: CaptureOptions::default(),
            fix: true,
        }
    }
}

/// Where the input's type puts the migration's first step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A build script: capture, then everything else
    Script,
    /// An INI document: format, translate, validate
    Config,
    /// Already TOML: validate only
    Manifest,
}

impl Stage {
    pub fn for_input(input: &Path) -> Self {
        match input.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Manifest,
            Some("cfg") | Some("ini") => Self::Config,
            _ => Self::Script,
        }
    }
}

fn sibling(input: &Path, name: &str) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
        _ => PathBuf::from(name),
    }
}

/// Capture `setup_py` and write the derived sections into `setup_cfg`
///
/// An existing `setup_cfg` is merged with the fresh sections, fresh values
/// winning. Nothing is written when the capture fails.
pub fn setup_to_cfg(
    setup_py: &Path,
    setup_cfg: &Path,
    options: &MigrateOptions,
) -> Result<ConfigDocument> {
    let capture = capture_setup(setup_py, &options.capture)?;
    let fresh = map_capture(&capture, &options.render)?;

    let doc = if setup_cfg.exists() {
        let existing = ini::parse(&fs::read_to_string(setup_cfg)?)?;
        info!("Merging into existing {}", setup_cfg.display());
        merge_configs(&existing, &fresh)
    } else {
        fresh
    };

    fs::write(setup_cfg, ini::write(&doc))?;
    info!("Wrote {}", setup_cfg.display());
    Ok(doc)
}

/// Rewrite `setup_cfg` in canonical layout
pub fn format_cfg(setup_cfg: &Path) -> Result<()> {
    let text = fs::read_to_string(setup_cfg)?;
    let formatted = ini::write(&ini::parse(&text)?);
    if formatted != text {
        fs::write(setup_cfg, formatted)?;
        info!("Formatted {}", setup_cfg.display());
    }
    Ok(())
}

/// Translate `setup_cfg` into `pyproject`, replacing any previous content
pub fn cfg_to_toml(setup_cfg: &Path, pyproject: &Path, translator: &dyn Translator) -> Result<()> {
    let text = fs::read_to_string(setup_cfg)?;
    let toml_text = translator.translate(&text)?;
    fs::write(pyproject, toml_text)?;
    info!("Converted {} to {}", setup_cfg.display(), pyproject.display());
    Ok(())
}

/// Validate `pyproject` and, when `fix` is set, save the corrections
pub fn validate_and_format_toml(pyproject: &Path, fix: bool) -> Result<FixupReport> {
    FixupRunner::new(fix).run(&ManifestFile::new(pyproject))
}

/// Run every step needed to get from `input` to a validated pyproject.toml
pub fn setup_to_pyproject(input: &Path, options: &MigrateOptions) -> Result<FixupReport> {
    let stage = Stage::for_input(input);
    if stage == Stage::Manifest {
        return validate_and_format_toml(input, options.fix);
    }

    let setup_cfg = if stage == Stage::Config {
        input.to_path_buf()
    } else {
        let setup_cfg = sibling(input, SETUP_CFG_FILE_NAME);
        setup_to_cfg(input, &setup_cfg, options)?;
        setup_cfg
    };
    let pyproject = sibling(input, MANIFEST_FILE_NAME);

    format_cfg(&setup_cfg)?;
    cfg_to_toml(&setup_cfg, &pyproject, &SetuptoolsTranslator)?;
    validate_and_format_toml(&pyproject, options.fix)
}
