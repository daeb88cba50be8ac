// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: interpreter used to run setup.py
fn python_arg() -> Arg {
    Arg::new("python")
        .long("python")
        .value_name("PYTHON")
        .env("PYMIGRATE_PYTHON")
        .default_value("python3")
        .help("Python interpreter used to run setup.py")
}

/// Common argument: dangling list threshold
fn threshold_arg() -> Arg {
    Arg::new("threshold")
        .long("threshold")
        .value_name("CHARS")
        .default_value("100")
        .help("Lists longer than this many characters are written one item per line")
}

fn timeout_arg() -> Arg {
    Arg::new("timeout")
        .long("timeout")
        .value_name("SECONDS")
        .help("Kill setup.py after this many seconds")
}

fn require_find_packages_arg() -> Arg {
    Arg::new("require_find_packages")
        .long("require-find-packages")
        .action(ArgAction::SetTrue)
        .help("Fail if setup.py never calls find_packages(), even with an explicit package list")
}

fn build_cli() -> Command {
    Command::new("pymigrate")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pymigrate Contributors")
        .about("Migrate Python packaging metadata to a validated pyproject.toml")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show debug output"),
        )
        .subcommand(
            Command::new("convert")
                .about("Run the full migration to pyproject.toml")
                .arg(
                    Arg::new("input")
                        .default_value("setup.py")
                        .help("setup.py, setup.cfg or pyproject.toml"),
                )
                .arg(threshold_arg())
                .arg(python_arg())
                .arg(timeout_arg())
                .arg(require_find_packages_arg())
                .arg(
                    Arg::new("no_fix")
                        .long("no-fix")
                        .action(ArgAction::SetTrue)
                        .help("Report problems in pyproject.toml without fixing them"),
                ),
        )
        .subcommand(
            Command::new("capture")
                .about("Capture setup() arguments from setup.py into setup.cfg")
                .arg(Arg::new("setup_py").default_value("setup.py").help("Path to setup.py"))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("setup.cfg to merge into and write (default: next to setup.py)"),
                )
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the generated sections instead of writing them"),
                )
                .arg(threshold_arg())
                .arg(python_arg())
                .arg(timeout_arg())
                .arg(require_find_packages_arg()),
        )
        .subcommand(
            Command::new("translate")
                .about("Translate setup.cfg to pyproject.toml")
                .arg(Arg::new("setup_cfg").default_value("setup.cfg").help("Path to setup.cfg"))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output file (prints to stdout if omitted)"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate pyproject.toml")
                .arg(Arg::new("path").help("pyproject.toml or a directory to search upward from"))
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Save corrections when every problem can be fixed"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("pymigrate.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
