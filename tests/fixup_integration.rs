// tests/fixup_integration.rs

//! Integration tests for validating and fixing pyproject.toml on disk

mod common;

use common::{BUILD_SYSTEM, project_dir, read_toml, strings, write_file};
use pymigrate::Error;
use pymigrate::fixup::FixupRunner;
use pymigrate::manifest::{MANIFEST_FILE_NAME, ManifestFile};
use std::fs;

// =============================================================================
// Helpers
// =============================================================================

fn manifest(project: &str) -> String {
    format!("{}[project]\n{}", BUILD_SYSTEM, project)
}

// =============================================================================
// Fixing
// =============================================================================

#[test]
fn test_clean_manifest_is_left_alone() {
    let (_temp, dir) = project_dir();
    let text = manifest("name = \"demo\"\nversion = \"1.0\"\ndependencies = [\"click>=8\", \"requests\"]\n");
    let path = write_file(&dir, MANIFEST_FILE_NAME, &text);

    let report = FixupRunner::new(true).run(&ManifestFile::new(&path)).unwrap();

    assert!(report.success());
    assert!(!report.has_findings());
    assert!(!report.written());
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_fixable_findings_are_saved() {
    let (_temp, dir) = project_dir();
    let path = write_file(
        &dir,
        MANIFEST_FILE_NAME,
        &manifest(
            "name = \"Demo_Pkg\"\nversion = \"1.0\"\n\
             dependencies = [\"Requests >= 2\", \"Click=8.0\"]\n\n\
             [project.optional-dependencies]\ntest = [\"tox\", \"Pytest\"]\n",
        ),
    );

    let report = FixupRunner::new(true).run(&ManifestFile::new(&path)).unwrap();
    assert!(report.has_findings());
    assert!(report.written());
    assert!(report.success());

    let saved = read_toml(&path);
    let project = &saved["project"];
    assert_eq!(project["name"].as_str(), Some("demo-pkg"));
    assert_eq!(strings(&project["dependencies"]), ["click==8.0", "requests>=2"]);
    assert_eq!(strings(&project["optional-dependencies"]["test"]), ["pytest", "tox"]);
    assert_eq!(
        saved["build-system"]["build-backend"].as_str(),
        Some("setuptools.build_meta")
    );

    // A second run finds nothing left to do
    let again = FixupRunner::new(true).run(&ManifestFile::new(&path)).unwrap();
    assert!(!again.has_findings());
    assert!(!again.written());
}

#[test]
fn test_unfixable_finding_blocks_every_fix() {
    let (_temp, dir) = project_dir();
    let text = manifest("name = \"Demo_Pkg\"\nversion = \"1.0\"\ndependencies = [\"requests\", \"zzz>=latest\"]\n");
    let path = write_file(&dir, MANIFEST_FILE_NAME, &text);

    let report = FixupRunner::new(true).run(&ManifestFile::new(&path)).unwrap();

    assert!(!report.success());
    assert!(!report.written());
    let dependencies = report
        .validators
        .iter()
        .find(|r| r.name == "dependencies")
        .unwrap();
    assert!(!dependencies.outcome.fixable);
    assert!(dependencies.outcome.errors[0].contains("zzz>=latest"));

    // The name fix happened in memory only
    assert_eq!(report.data["project"]["name"].as_str(), Some("demo-pkg"));
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_corrections_saved_despite_unparseable_entry() {
    let (_temp, dir) = project_dir();
    let path = write_file(
        &dir,
        MANIFEST_FILE_NAME,
        &manifest("name = \"demo\"\nversion = \"1.0\"\ndependencies = [\"Foo_Bar=1.0\", \"zzz>=latest\"]\n"),
    );

    let report = FixupRunner::new(true).run(&ManifestFile::new(&path)).unwrap();

    let dependencies = report
        .validators
        .iter()
        .find(|r| r.name == "dependencies")
        .unwrap();
    assert_eq!(dependencies.outcome.errors.len(), 1);
    assert!(dependencies.fixed);
    assert!(report.written());
    assert_eq!(
        strings(&read_toml(&path)["project"]["dependencies"]),
        ["foo-bar==1.0", "zzz>=latest"]
    );
}

#[test]
fn test_check_only_never_writes() {
    let (_temp, dir) = project_dir();
    let text = manifest("name = \"Demo_Pkg\"\nversion = \"1.0\"\n");
    let path = write_file(&dir, MANIFEST_FILE_NAME, &text);

    let report = FixupRunner::new(false).run(&ManifestFile::new(&path)).unwrap();

    assert!(report.has_findings());
    assert!(!report.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_schema_failure_stops_before_other_validators() {
    let (_temp, dir) = project_dir();
    let text = "[project]\nname = \"Demo_Pkg\"\nversion = \"1.0\"\n";
    let path = write_file(&dir, MANIFEST_FILE_NAME, text);

    let report = FixupRunner::new(true).run(&ManifestFile::new(&path)).unwrap();

    assert!(!report.success());
    assert_eq!(report.validators.len(), 1);
    assert_eq!(report.validators[0].name, "specs");
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn test_discover_from_nested_directory() {
    let (_temp, dir) = project_dir();
    let path = write_file(&dir, MANIFEST_FILE_NAME, &manifest("name = \"demo\"\n"));
    let nested = dir.join("src").join("demo");
    fs::create_dir_all(&nested).unwrap();

    let found = ManifestFile::discover(&nested).unwrap();
    assert_eq!(found.path(), path.as_path());
}

#[test]
fn test_discover_without_manifest() {
    let (_temp, dir) = project_dir();
    let err = ManifestFile::discover(&dir);
    // A pyproject.toml above the temp dir would be found instead
    if let Err(err) = err {
        assert!(matches!(err, Error::ManifestNotFound(_)));
    }
}

#[test]
fn test_invalid_toml_is_an_error() {
    let (_temp, dir) = project_dir();
    let path = write_file(&dir, MANIFEST_FILE_NAME, "[project\nname = ");

    let err = FixupRunner::new(true).run(&ManifestFile::new(&path)).unwrap_err();
    assert!(matches!(err, Error::TomlParse(_)));
}
