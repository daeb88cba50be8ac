// src/commands/check.rs

//! pyproject.toml validation command

use anyhow::{Context, Result};
use pymigrate::fixup::{FixupReport, FixupRunner};
use pymigrate::manifest::ManifestFile;
use std::path::{Path, PathBuf};

/// Print findings grouped by validator
pub fn print_report(report: &FixupReport) {
    for validator in &report.validators {
        let outcome = &validator.outcome;
        if !outcome.has_findings() {
            continue;
        }

        println!("{}:", validator.name);
        for e in &outcome.errors {
            println!("  error: {}", e);
        }
        for w in &outcome.warnings {
            println!("  warning: {}", w);
        }
        if validator.fixed {
            println!("  (fixed)");
        }
    }

    if report.written() {
        println!("Saved corrected pyproject.toml");
    } else if report.has_findings() {
        println!("pyproject.toml left unchanged");
    }
}

/// Validate a pyproject.toml, saving fixes when asked
///
/// Returns whether the manifest passed (or was fully fixed).
pub fn cmd_check(path: Option<PathBuf>, fix: bool) -> Result<bool> {
    let start = match path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let store = locate(&start)?;
    println!("Checking {}", store.path().display());

    let report = FixupRunner::new(fix)
        .run(&store)
        .with_context(|| format!("Failed to check {}", store.path().display()))?;

    print_report(&report);
    if !report.has_findings() {
        println!("No problems found");
    }
    Ok(report.success())
}

fn locate(start: &Path) -> Result<ManifestFile> {
    if start.is_file() {
        return Ok(ManifestFile::new(start));
    }
    ManifestFile::discover(start)
        .with_context(|| format!("No pyproject.toml found from {}", start.display()))
}
