// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;

mod cli;
mod commands;

use cli::{Cli, Commands};
use pymigrate::pipeline::MigrateOptions;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let passed = match cli.command {
        Some(Commands::Convert {
            input,
            render,
            capture,
            no_fix,
        }) => {
            let options = MigrateOptions {
                render: render.options(),
                capture: capture.options(),
                fix: !no_fix,
            };
            commands::cmd_convert(&input, &options)?
        }

        Some(Commands::Capture {
            setup_py,
            output,
            dry_run,
            render,
            capture,
        }) => {
            commands::cmd_capture(&setup_py, output, dry_run, render.options(), capture.options())?;
            true
        }

        Some(Commands::Translate { setup_cfg, output }) => {
            commands::cmd_translate(&setup_cfg, output)?;
            true
        }

        Some(Commands::Check { path, fix }) => commands::cmd_check(path, fix)?,

        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "pymigrate", &mut std::io::stdout());
            true
        }

        None => {
            Cli::command().print_help()?;
            true
        }
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
