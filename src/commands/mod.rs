// src/commands/mod.rs
//! Command handlers for the pymigrate CLI

mod capture;
mod check;
mod convert;
mod translate;

pub use capture::cmd_capture;
pub use check::{cmd_check, print_report};
pub use convert::cmd_convert;
pub use translate::cmd_translate;
