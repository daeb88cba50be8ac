// src/fixup.rs

//! Validate-and-fix runner for pyproject.toml
//!
//! Runs the validators in order, applies fixes in memory, and writes the
//! manifest back only when every finding could be fixed.
//!
//! # Run Lifecycle
//!
//! ```text
//! RUNNING -> NEEDS_FIXING -> DONE (written)
//!    |            |
//!    +------------+--> UNFIXABLE -> DONE (not written)
//! ```
//!
//! UNFIXABLE is sticky: a later validator may still fix its own findings in
//! memory, but nothing is persisted.

use crate::Result;
use crate::manifest::{ManifestData, ManifestStore};
use crate::validate::{ValidationOutcome, Validator, default_validators};
use tracing::{debug, error, info, warn};

/// Where a fix-up run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    NeedsFixing,
    Unfixable,
    Done { written: bool },
}

impl RunState {
    fn needs_fixing(self) -> Self {
        match self {
            Self::Running | Self::NeedsFixing => Self::NeedsFixing,
            other => other,
        }
    }

    fn finish(self) -> Self {
        match self {
            Self::NeedsFixing => Self::Done { written: true },
            Self::Done { .. } => self,
            Self::Running | Self::Unfixable => Self::Done { written: false },
        }
    }
}

/// Findings of one validator and whether its fix was applied
#[derive(Debug, Clone)]
pub struct ValidatorReport {
    pub name: &'static str,
    pub outcome: ValidationOutcome,
    pub fixed: bool,
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct FixupReport {
    pub validators: Vec<ValidatorReport>,
    pub state: RunState,
    /// The manifest after in-memory fixes
    pub data: ManifestData,
}

impl FixupReport {
    pub fn written(&self) -> bool {
        matches!(self.state, RunState::Done { written: true })
    }

    pub fn has_findings(&self) -> bool {
        self.validators.iter().any(|r| r.outcome.has_findings())
    }

    /// Either nothing was wrong or everything wrong was fixed and saved
    pub fn success(&self) -> bool {
        self.written() || !self.has_findings()
    }
}

/// Runs validators over a manifest
#[derive(Debug, Clone)]
pub struct FixupRunner {
    validators: Vec<Validator>,
    fix: bool,
}

impl FixupRunner {
    /// Runner with the default validator order
    pub fn new(fix: bool) -> Self {
        Self::with_validators(default_validators(), fix)
    }

    pub fn with_validators(validators: Vec<Validator>, fix: bool) -> Self {
        Self { validators, fix }
    }

    /// Validate and fix `data` in memory
    pub fn evaluate(&mut self, mut data: ManifestData) -> FixupReport {
        let mut state = RunState::Running;
        let mut reports = Vec::new();

        for validator in &mut self.validators {
            let name = validator.name();
            let outcome = validator.validate(&data);
            let mut fixed = false;

            if outcome.has_findings() {
                for e in &outcome.errors {
                    error!("[{}] {}", name, e);
                }
                for w in &outcome.warnings {
                    warn!("[{}] {}", name, w);
                }

                if self.fix && (outcome.fixable || outcome.only_warnings()) {
                    debug!("Applying {} fixes", name);
                    validator.fix(&mut data);
                    fixed = true;
                    state = state.needs_fixing();
                } else {
                    state = RunState::Unfixable;
                }
            }

            let stop = outcome.has_findings() && !fixed && outcome.exit_early;
            reports.push(ValidatorReport {
                name,
                outcome,
                fixed,
            });

            if stop {
                debug!("Validator {} requested early exit", name);
                break;
            }
        }

        FixupReport {
            validators: reports,
            state: state.finish(),
            data,
        }
    }

    /// Load from `store`, evaluate, and save when the run allows it
    pub fn run(&mut self, store: &dyn ManifestStore) -> Result<FixupReport> {
        let data = store.load()?;
        let report = self.evaluate(data);

        if report.written() {
            store.save(&report.data)?;
            info!("Saved corrected manifest");
        } else if report.has_findings() {
            info!("Manifest left unchanged");
        }

        Ok(report)
    }
}
