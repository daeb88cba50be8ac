// src/capture/mod.rs

//! Build script capture engine
//!
//! Executes a `setup.py` with its packaging entry points replaced by
//! recording stand-ins and returns the arguments of the declarative calls it
//! made. Nothing in this process is patched: the stand-ins live in a
//! per-capture temp directory that goes first on the child interpreter's
//! module path, and the script's working directory is set on the child only.

pub mod shim;

pub use shim::{CallKind, CapturedCall, RecordedCall, StandInMarker};

use crate::error::Result;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Default interpreter used to run build scripts
pub const DEFAULT_PYTHON: &str = "python3";

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("setup() was not called within {0}")]
    SetupNotCalled(String),

    #[error("find_packages() was not called within {0}, but expected")]
    DiscoveryNotCalled(String),

    #[error("Python interpreter not found: {0}")]
    InterpreterNotFound(String),

    #[error("failed to start build script: {0}")]
    Spawn(String),

    #[error("build script exited with code {code}: {stderr}")]
    ScriptFailed { code: i32, stderr: String },

    #[error("build script timed out after {0} seconds")]
    TimedOut(u64),
}

/// How build scripts are executed
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Interpreter name or path
    pub python: String,
    /// Kill the script after this long; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Fail when the script never calls a discovery function, even if
    /// `packages` is an explicit list
    pub require_discovery: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            python: DEFAULT_PYTHON.to_string(),
            timeout: None,
            require_discovery: false,
        }
    }
}

/// Results of a build script capture
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// The build script that was run
    pub script: PathBuf,
    /// Directory containing the build script
    pub script_dir: PathBuf,
    /// The last `setup()` call
    pub setup: CapturedCall,
    /// The last discovery call, if any
    pub discovery: Option<RecordedCall>,
}

/// Engine for capturing build script calls
pub struct SetupCapturer {
    /// Temp directory holding the stand-ins and the call log
    root: TempDir,
    options: CaptureOptions,
}

impl SetupCapturer {
    /// Create a new capturer
    pub fn new(options: CaptureOptions) -> Result<Self> {
        Ok(Self {
            root: TempDir::new()?,
            options,
        })
    }

    /// Run a build script and capture its declarative calls
    pub fn capture(&self, setup_py: &Path) -> Result<CaptureResult> {
        let script = setup_py.canonicalize()?;
        let script_dir = script_dir_of(&script);
        let label = script.display().to_string();

        let stand_ins = shim::install_stand_ins(self.root.path())?;
        debug!(
            "Installed setuptools stand-ins in {}",
            stand_ins.module_dir.display()
        );

        let interpreter = which::which(&self.options.python)
            .map_err(|_| CaptureError::InterpreterNotFound(self.options.python.clone()))?;

        let mut module_path = vec![stand_ins.module_dir.clone()];
        if let Some(existing) = std::env::var_os("PYTHONPATH") {
            module_path.extend(std::env::split_paths(&existing));
        }
        let module_path = std::env::join_paths(module_path)
            .map_err(|e| CaptureError::Spawn(e.to_string()))?;

        info!("Capturing setup() arguments from {}", label);
        let mut child = Command::new(&interpreter)
            .arg(&script)
            .current_dir(&script_dir)
            .env("PYTHONPATH", module_path)
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .env(shim::LOG_ENV, &stand_ins.log_file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CaptureError::Spawn(format!("{}: {}", interpreter.display(), e)))?;

        // Pipes are read while waiting; a full pipe buffer blocks the script
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.options.timeout {
            Some(timeout) => match child.wait_timeout(timeout)? {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CaptureError::TimedOut(timeout.as_secs()).into());
                }
            },
            None => child.wait()?,
        };
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        for line in stdout.lines() {
            debug!("[setup.py] {}", line);
        }
        for line in stderr.lines() {
            warn!("[setup.py] {}", line);
        }

        if !status.success() {
            return Err(CaptureError::ScriptFailed {
                code: status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            }
            .into());
        }

        let calls = shim::parse_capture_log(&stand_ins.log_file)?;
        debug!("Recorded {} stand-in calls", calls.len());
        let result = select_calls(calls, &script, self.options.require_discovery)?;

        info!(
            "Captured {} setup() keyword arguments{}",
            result.setup.kwargs.len(),
            if result.discovery.is_some() {
                " and a package discovery call"
            } else {
                ""
            }
        );
        Ok(result)
    }
}

/// Capture a build script with a one-off capturer
pub fn capture_setup(setup_py: &Path, options: &CaptureOptions) -> Result<CaptureResult> {
    SetupCapturer::new(options.clone())?.capture(setup_py)
}

fn script_dir_of(script: &Path) -> PathBuf {
    script
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Read a child pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Pick the last `setup()` and the last discovery call out of the log
fn select_calls(
    calls: Vec<RecordedCall>,
    script: &Path,
    require_discovery: bool,
) -> std::result::Result<CaptureResult, CaptureError> {
    let label = script.display().to_string();
    let mut setup = None;
    let mut discovery = None;

    for recorded in calls {
        if recorded.kind.is_discovery() {
            discovery = Some(recorded);
        } else {
            setup = Some(recorded.call);
        }
    }

    let setup = setup.ok_or_else(|| CaptureError::SetupNotCalled(label.clone()))?;
    if require_discovery && discovery.is_none() {
        return Err(CaptureError::DiscoveryNotCalled(label));
    }

    Ok(CaptureResult {
        script: script.to_path_buf(),
        script_dir: script_dir_of(script),
        setup,
        discovery,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorded(kind: CallKind, kwargs: serde_json::Value) -> RecordedCall {
        RecordedCall {
            kind,
            call: CapturedCall {
                args: Vec::new(),
                kwargs: kwargs.as_object().cloned().unwrap_or_default(),
            },
        }
    }

    #[test]
    fn test_default_options() {
        let options = CaptureOptions::default();
        assert_eq!(options.python, "python3");
        assert!(options.timeout.is_none());
        assert!(!options.require_discovery);
    }

    #[test]
    fn test_select_calls_requires_setup() {
        let calls = vec![recorded(CallKind::FindPackages, json!({}))];
        let err = select_calls(calls, Path::new("/tmp/build_pkg.py"), false).unwrap_err();
        assert!(matches!(err, CaptureError::SetupNotCalled(_)));
    }

    #[test]
    fn test_select_calls_last_setup_wins() {
        let calls = vec![
            recorded(CallKind::Setup, json!({"name": "first"})),
            recorded(CallKind::Setup, json!({"name": "second"})),
        ];
        let result = select_calls(calls, Path::new("/tmp/build_pkg.py"), false).unwrap();
        assert_eq!(result.setup.kwargs["name"], "second");
        assert_eq!(result.script_dir, PathBuf::from("/tmp"));
        assert!(result.discovery.is_none());
    }

    #[test]
    fn test_select_calls_strict_discovery() {
        let calls = vec![recorded(CallKind::Setup, json!({"name": "demo"}))];
        let err = select_calls(calls, Path::new("/tmp/build_pkg.py"), true).unwrap_err();
        assert!(matches!(err, CaptureError::DiscoveryNotCalled(ref s) if s == "/tmp/build_pkg.py"));
    }

    #[test]
    fn test_select_calls_keeps_discovery() {
        let calls = vec![
            recorded(CallKind::FindNamespacePackages, json!({"where": "src"})),
            recorded(CallKind::Setup, json!({"name": "demo"})),
        ];
        let result = select_calls(calls, Path::new("/tmp/build_pkg.py"), true).unwrap();
        let discovery = result.discovery.unwrap();
        assert_eq!(discovery.kind, CallKind::FindNamespacePackages);
        assert_eq!(discovery.call.kwargs["where"], "src");
    }

    #[test]
    fn test_missing_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("setup.py");
        std::fs::write(&script, "from setuptools import setup\nsetup(name='x')\n").unwrap();

        let options = CaptureOptions {
            python: "pymigrate-no-such-python".to_string(),
            ..CaptureOptions::default()
        };
        let err = capture_setup(&script, &options).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Capture(CaptureError::InterpreterNotFound(_))
        ));
    }
}
