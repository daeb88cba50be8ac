// src/commands/convert.rs

//! Full migration command

use super::print_report;
use anyhow::{Context, Result};
use pymigrate::pipeline::{MigrateOptions, Stage, setup_to_pyproject};
use std::path::Path;
use tracing::info;

/// Migrate `input` to a validated pyproject.toml
///
/// Returns whether the resulting manifest passed validation.
pub fn cmd_convert(input: &Path, options: &MigrateOptions) -> Result<bool> {
    if !input.exists() {
        anyhow::bail!("{} does not exist", input.display());
    }

    info!(
        "Converting {} (starting at {:?} stage)",
        input.display(),
        Stage::for_input(input)
    );

    let report = setup_to_pyproject(input, options)
        .with_context(|| format!("Failed to migrate {}", input.display()))?;

    print_report(&report);
    if report.success() {
        println!("Migration of {} complete", input.display());
    }
    Ok(report.success())
}
