// src/capture/shim.rs

//! Stand-in packaging modules for build script capture
//!
//! Provides fake `setuptools` and `distutils.core` modules that log their
//! invocations instead of building anything. Placed first on the child
//! interpreter's module path, they let us "capture" the declarative intent of
//! a `setup.py` without emulating setuptools.

use crate::error::Result;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable telling the stand-ins where to append their log
pub const LOG_ENV: &str = "PYMIGRATE_CAPTURE_LOG";

/// Key used by the stand-ins to tag values that are not plain data
pub const MARKER_KEY: &str = "__pymigrate__";

const LOG_FILE: &str = "capture.jsonl";

const SETUPTOOLS_STAND_IN: &str = r#"# Generated by pymigrate: records setuptools calls instead of running them.
import json
import os

_LOG = os.environ.get("PYMIGRATE_CAPTURE_LOG")
_TAG = "__pymigrate__"


class _Discovered(list):
    def __init__(self, kind):
        super().__init__()
        self._pymigrate_kind = kind


def _encode(value):
    if isinstance(value, _Discovered):
        return {_TAG: value._pymigrate_kind}
    if isinstance(value, dict):
        return {str(k): _encode(v) for k, v in value.items()}
    if isinstance(value, (list, tuple)):
        return [_encode(v) for v in value]
    if isinstance(value, (set, frozenset)):
        return [_encode(v) for v in sorted(value, key=repr)]
    if value is None or isinstance(value, (bool, int, float, str)):
        return value
    if isinstance(value, os.PathLike):
        return os.fspath(value)
    return {_TAG: "opaque", "repr": repr(value)}


def _record(call, args, kwargs):
    if _LOG is None:
        return
    entry = {"call": call, "args": _encode(list(args)), "kwargs": _encode(kwargs)}
    with open(_LOG, "a", encoding="utf-8") as log:
        log.write(json.dumps(entry) + "\n")


def setup(*args, **kwargs):
    _record("setup", args, kwargs)


def find_packages(*args, **kwargs):
    _record("find_packages", args, kwargs)
    return _Discovered("find_packages")


def find_namespace_packages(*args, **kwargs):
    _record("find_namespace_packages", args, kwargs)
    return _Discovered("find_namespace_packages")


class _StandIn:
    def __init__(self, *args, **kwargs):
        pass

    def __call__(self, *args, **kwargs):
        return _StandIn()

    def __getattr__(self, name):
        return _StandIn()


Extension = _StandIn
Command = _StandIn
Distribution = _StandIn


def __getattr__(name):
    if name.startswith("__"):
        raise AttributeError(name)
    return _StandIn
"#;

const DISTUTILS_CORE_STAND_IN: &str = r#"# Generated by pymigrate: distutils.core forwards to the recording setuptools.
from setuptools import setup, Extension, Command, Distribution
"#;

/// Locations of an installed set of stand-ins
#[derive(Debug, Clone)]
pub struct StandIns {
    /// Directory to put first on the interpreter's module path
    pub module_dir: PathBuf,
    /// JSON-lines log the stand-ins append to
    pub log_file: PathBuf,
}

/// Writes the stand-in modules under `root` and truncates the call log
pub fn install_stand_ins(root: &Path) -> Result<StandIns> {
    let module_dir = root.join("stand-ins");
    let setuptools_dir = module_dir.join("setuptools");
    let distutils_dir = module_dir.join("distutils");

    for dir in [&setuptools_dir, &distutils_dir] {
        fs::create_dir_all(dir)?;
    }

    fs::write(setuptools_dir.join("__init__.py"), SETUPTOOLS_STAND_IN)?;
    fs::write(distutils_dir.join("__init__.py"), "")?;
    fs::write(distutils_dir.join("core.py"), DISTUTILS_CORE_STAND_IN)?;

    let log_file = root.join(LOG_FILE);
    fs::write(&log_file, "")?;

    Ok(StandIns {
        module_dir,
        log_file,
    })
}

/// Which stand-in produced a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Setup,
    FindPackages,
    FindNamespacePackages,
}

impl CallKind {
    /// True for the package auto-discovery stand-ins
    pub fn is_discovery(&self) -> bool {
        matches!(self, Self::FindPackages | Self::FindNamespacePackages)
    }
}

/// Arguments observed for one intercepted call
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CapturedCall {
    #[serde(default)]
    pub args: Vec<Value>,

    /// Keyword arguments in the order the script passed them
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

/// One line of the capture log
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordedCall {
    #[serde(rename = "call")]
    pub kind: CallKind,

    #[serde(flatten)]
    pub call: CapturedCall,
}

/// Parse the capture log written by the stand-ins
pub fn parse_capture_log(log_file: &Path) -> Result<Vec<RecordedCall>> {
    if !log_file.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(log_file)?;
    parse_capture_lines(&content)
}

fn parse_capture_lines(content: &str) -> Result<Vec<RecordedCall>> {
    let mut calls = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        calls.push(serde_json::from_str(line)?);
    }
    Ok(calls)
}

/// Non-data value produced by the stand-ins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StandInMarker {
    /// Return value of a discovery stand-in
    Discovery(CallKind),
    /// Object the stand-ins could not serialize; carries its `repr()`
    Opaque(String),
}

/// Recognize a tagged stand-in value inside captured arguments
pub fn stand_in_marker(value: &Value) -> Option<StandInMarker> {
    let tag = value.as_object()?.get(MARKER_KEY)?.as_str()?;
    match tag {
        "find_packages" => Some(StandInMarker::Discovery(CallKind::FindPackages)),
        "find_namespace_packages" => {
            Some(StandInMarker::Discovery(CallKind::FindNamespacePackages))
        }
        _ => {
            let repr = value
                .get("repr")
                .and_then(|r| r.as_str())
                .unwrap_or(tag)
                .to_string();
            Some(StandInMarker::Opaque(repr))
        }
    }
}
