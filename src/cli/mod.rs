// src/cli/mod.rs
//! CLI definitions for pymigrate
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `convert` - Full migration from setup.py, setup.cfg or pyproject.toml
//! - `capture` - setup.py to setup.cfg only
//! - `translate` - setup.cfg to pyproject.toml only
//! - `check` - Validate (and optionally fix) pyproject.toml
//! - `completions` - Shell completion scripts

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use pymigrate::capture::{CaptureOptions, DEFAULT_PYTHON};
use pymigrate::cfg::{DEFAULT_DANGLING_LIST_THRESHOLD, RenderOptions};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pymigrate")]
#[command(author = "pymigrate Contributors")]
#[command(version)]
#[command(about = "Migrate Python packaging metadata to a validated pyproject.toml", long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// How setup.py is executed
#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Python interpreter used to run setup.py
    #[arg(long, env = "PYMIGRATE_PYTHON", default_value = DEFAULT_PYTHON)]
    pub python: String,

    /// Kill setup.py after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Fail if setup.py never calls find_packages(), even with an explicit package list
    #[arg(long)]
    pub require_find_packages: bool,
}

impl CaptureArgs {
    pub fn options(&self) -> CaptureOptions {
        CaptureOptions {
            python: self.python.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            require_discovery: self.require_find_packages,
        }
    }
}

/// How setup.cfg values are laid out
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Lists longer than this many characters are written one item per line
    #[arg(long, default_value_t = DEFAULT_DANGLING_LIST_THRESHOLD)]
    pub threshold: usize,
}

impl RenderArgs {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            dangling_list_threshold: self.threshold,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full migration to pyproject.toml
    ///
    /// A setup.py is captured into setup.cfg first; a .cfg or .ini file starts
    /// at translation; a .toml file is only validated.
    Convert {
        /// setup.py, setup.cfg or pyproject.toml
        #[arg(default_value = "setup.py")]
        input: PathBuf,

        #[command(flatten)]
        render: RenderArgs,

        #[command(flatten)]
        capture: CaptureArgs,

        /// Report problems in pyproject.toml without fixing them
        #[arg(long)]
        no_fix: bool,
    },

    /// Capture setup() arguments from setup.py into setup.cfg
    Capture {
        /// Path to setup.py
        #[arg(default_value = "setup.py")]
        setup_py: PathBuf,

        /// setup.cfg to merge into and write (default: next to setup.py)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the generated sections instead of writing them
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        render: RenderArgs,

        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Translate setup.cfg to pyproject.toml
    Translate {
        /// Path to setup.cfg
        #[arg(default_value = "setup.cfg")]
        setup_cfg: PathBuf,

        /// Output file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate pyproject.toml
    Check {
        /// pyproject.toml or a directory to search upward from (default: current directory)
        path: Option<PathBuf>,

        /// Save corrections when every problem can be fixed
        #[arg(long)]
        fix: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
