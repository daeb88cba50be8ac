// src/manifest/mod.rs
//! pyproject.toml access
//!
//! The validators work on the raw deserialized document so that keys they
//! do not know about survive a load/fix/save cycle untouched. The typed view
//! in [`schema`] is only used to check structure.

pub mod schema;

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name searched for by [`ManifestFile::discover`]
pub const MANIFEST_FILE_NAME: &str = "pyproject.toml";

/// Raw deserialized manifest, keys in file order
pub type ManifestData = toml::Table;

/// Where a manifest is read from and written back to
pub trait ManifestStore {
    fn load(&self) -> Result<ManifestData>;

    fn save(&self, data: &ManifestData) -> Result<()>;
}

/// A pyproject.toml on disk
#[derive(Debug, Clone)]
pub struct ManifestFile {
    path: PathBuf,
}

impl ManifestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Find the nearest pyproject.toml in `start` or any of its parents
    pub fn discover(start: &Path) -> Result<Self> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(MANIFEST_FILE_NAME);
            if candidate.is_file() {
                debug!("Found manifest at {}", candidate.display());
                return Ok(Self::new(candidate));
            }
            dir = current.parent();
        }
        Err(Error::ManifestNotFound(start.display().to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManifestStore for ManifestFile {
    fn load(&self) -> Result<ManifestData> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn save(&self, data: &ManifestData) -> Result<()> {
        let content = toml::to_string_pretty(data)?;
        std::fs::write(&self.path, content)?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_walks_parents() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join(MANIFEST_FILE_NAME);
        std::fs::write(&manifest, "[project]\nname = \"demo\"\n").unwrap();
        let nested = temp.path().join("src").join("demo");
        std::fs::create_dir_all(&nested).unwrap();

        let found = ManifestFile::discover(&nested).unwrap();
        assert_eq!(found.path(), manifest);
    }

    #[test]
    fn test_discover_not_found() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("empty");
        std::fs::create_dir_all(&nested).unwrap();

        // Some ancestor of the temp dir could hold a stray pyproject.toml
        match ManifestFile::discover(&nested) {
            Err(Error::ManifestNotFound(start)) => assert!(start.ends_with("empty")),
            Ok(found) => assert!(!found.path().starts_with(temp.path())),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_load_save_keeps_key_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(MANIFEST_FILE_NAME);
        std::fs::write(
            &path,
            "[project]\nversion = \"1.0\"\nname = \"demo\"\n\n[tool.black]\nline-length = 100\n",
        )
        .unwrap();

        let store = ManifestFile::new(&path);
        let data = store.load().unwrap();
        store.save(&data).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, data);
        let keys: Vec<&String> = reloaded["project"].as_table().unwrap().keys().collect();
        assert_eq!(keys, ["version", "name"]);
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(MANIFEST_FILE_NAME);
        std::fs::write(&path, "[project\n").unwrap();

        let result = ManifestFile::new(&path).load();
        assert!(matches!(result, Err(Error::TomlParse(_))));
    }
}
