// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Interpreter the capture tests run build scripts with
pub const PYTHON: &str = "python3";

/// Whether a Python interpreter is available for capture tests
///
/// Tests that execute setup.py return early when this is false.
pub fn python_available() -> bool {
    which::which(PYTHON).is_ok()
}

/// A temporary project directory
///
/// Returns (TempDir, project_dir) - keep the TempDir alive to prevent cleanup.
pub fn project_dir() -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("project");
    fs::create_dir_all(&dir).unwrap();
    (temp_dir, dir)
}

/// Write `name` with `content` into `dir` and return its path
pub fn write_file(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// A typical setup.py using package discovery, extras and console scripts
pub const DEMO_SETUP_PY: &str = r#"
from setuptools import setup, find_packages

with open("README.md") as f:
    long_description = f.read()

setup(
    name="Demo_Project",
    version="1.2.0",
    description="A demo project",
    long_description=long_description,
    long_description_content_type="text/markdown",
    author="Jane Doe",
    author_email="jane@example.com",
    license="MIT",
    packages=find_packages(exclude=["tests"]),
    python_requires=">=3.8",
    install_requires=["requests>=2.0", "Click=8.0"],
    extras_require={"test": ["pytest>=3.0.0", "tox>=2.6.0"]},
    entry_points={"console_scripts": ["demo = demo.cli:main"]},
    zip_safe=False,
)
"#;

pub const DEMO_README: &str = "# Demo\n\nA demo project.\n";

/// Header every valid pyproject.toml in these tests starts with
pub const BUILD_SYSTEM: &str = "[build-system]\nrequires = [\"setuptools>=61.2\"]\nbuild-backend = \"setuptools.build_meta\"\n\n";

/// Read a TOML file into a table
pub fn read_toml(path: &std::path::Path) -> toml::Table {
    toml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// String items of a TOML array
pub fn strings(value: &toml::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}
