// src/commands/capture.rs

//! setup.py capture command

use anyhow::{Context, Result};
use pymigrate::capture::{CaptureOptions, capture_setup};
use pymigrate::cfg::{RenderOptions, ini, map_capture};
use pymigrate::pipeline::{MigrateOptions, SETUP_CFG_FILE_NAME, setup_to_cfg};
use std::path::{Path, PathBuf};

/// Capture `setup_py` and write (or print) the setup.cfg sections
pub fn cmd_capture(
    setup_py: &Path,
    output: Option<PathBuf>,
    dry_run: bool,
    render: RenderOptions,
    capture: CaptureOptions,
) -> Result<()> {
    if dry_run {
        let result = capture_setup(setup_py, &capture)
            .with_context(|| format!("Failed to capture {}", setup_py.display()))?;
        let doc = map_capture(&result, &render).context("Failed to render setup.cfg sections")?;
        print!("{}", ini::write(&doc));
        return Ok(());
    }

    let setup_cfg = output.unwrap_or_else(|| {
        setup_py
            .parent()
            .map(|dir| dir.join(SETUP_CFG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(SETUP_CFG_FILE_NAME))
    });

    let options = MigrateOptions {
        render,
        capture,
        fix: false,
    };
    let doc = setup_to_cfg(setup_py, &setup_cfg, &options)
        .with_context(|| format!("Failed to convert {}", setup_py.display()))?;

    println!(
        "Wrote {} ({} sections)",
        setup_cfg.display(),
        doc.len()
    );
    Ok(())
}
