// src/cfg/ini.rs

//! setup.cfg text codec
//!
//! Follows the subset of `configparser` behavior setuptools relies on:
//! `key = value` or `key: value` pairs under `[section]` headers, indented
//! continuation lines for multi-line values, and full-line `#`/`;` comments.
//! Comments are not preserved.
//!
//! A tab-indented line always continues the current value: one tab is
//! removed and the rest is kept verbatim, blank or `#`-prefixed lines
//! included. [`write`] indents every continuation line with a tab, so any
//! value it renders parses back unchanged.

use super::{ConfigDocument, METADATA, OPTIONS};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IniError {
    #[error("line {0}: key outside of any section")]
    MissingSection(usize),

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: section [{name}] already defined")]
    DuplicateSection { line: usize, name: String },
}

/// Parse setup.cfg text
///
/// Keys of `[metadata]` and `[options]` are lower-cased; every other section
/// keeps key case, since its keys name packages, extras or tool options.
pub fn parse(text: &str) -> Result<ConfigDocument, IniError> {
    Parser { lowercase_keys: true }.parse(text)
}

/// Parse INI text keeping key case in every section
pub fn parse_preserving_case(text: &str) -> Result<ConfigDocument, IniError> {
    Parser {
        lowercase_keys: false,
    }
    .parse(text)
}

struct Parser {
    lowercase_keys: bool,
}

impl Parser {
    fn parse(&self, text: &str) -> Result<ConfigDocument, IniError> {
        let mut doc = ConfigDocument::new();
        let mut section: Option<String> = None;
        let mut key: Option<String> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = raw.trim();

            if let Some(verbatim) = raw.strip_prefix('\t') {
                if self.continue_value(&mut doc, &section, &key, verbatim.trim_end()) {
                    continue;
                }
            }

            if trimmed.is_empty() {
                continue;
            }

            let indented = raw.starts_with(' ');
            if indented
                && !trimmed.starts_with(['#', ';'])
                && self.continue_value(&mut doc, &section, &key, trimmed)
            {
                continue;
            }

            if trimmed.starts_with(['#', ';']) {
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let Some(name) = rest.strip_suffix(']') else {
                    return Err(IniError::Syntax {
                        line: line_no,
                        message: format!("unterminated section header '{}'", trimmed),
                    });
                };
                let name = name.trim().to_string();
                if doc.contains_section(&name) {
                    return Err(IniError::DuplicateSection {
                        line: line_no,
                        name,
                    });
                }
                doc.section_mut(&name);
                section = Some(name);
                key = None;
                continue;
            }

            let Some(current) = &section else {
                return Err(IniError::MissingSection(line_no));
            };

            let Some(split) = trimmed.find(['=', ':']) else {
                return Err(IniError::Syntax {
                    line: line_no,
                    message: format!("expected 'key = value', found '{}'", trimmed),
                });
            };

            let name = trimmed[..split].trim();
            let value = trimmed[split + 1..].trim();
            let vocabulary = matches!(current.as_str(), METADATA | OPTIONS);
            let name = if self.lowercase_keys && vocabulary {
                name.to_lowercase()
            } else {
                name.to_string()
            };

            doc.set(current, name.clone(), value);
            key = Some(name);
        }

        Ok(doc)
    }

    /// Append `line` to the value being read; false when there is none
    fn continue_value(
        &self,
        doc: &mut ConfigDocument,
        section: &Option<String>,
        key: &Option<String>,
        line: &str,
    ) -> bool {
        let (Some(section), Some(key)) = (section, key) else {
            return false;
        };
        match doc.section_mut(section).get_mut(key) {
            Some(value) => {
                value.push('\n');
                value.push_str(line);
                true
            }
            None => false,
        }
    }
}

/// Render a document as setup.cfg text
pub fn write(doc: &ConfigDocument) -> String {
    let mut out = String::new();

    for (index, (name, body)) in doc.sections().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push('[');
        out.push_str(name);
        out.push_str("]\n");

        for (key, value) in body {
            let mut lines = value.split('\n');
            let first = lines.next().unwrap_or_default();

            out.push_str(key);
            out.push_str(" =");
            if !first.is_empty() {
                out.push(' ');
                out.push_str(first);
            }
            out.push('\n');

            for line in lines {
                out.push('\t');
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let text = "\
# generated
[metadata]
name = demo
Version: 1.0

[options]
zip_safe = False
";
        let doc = parse(text).unwrap();
        assert_eq!(doc.get("metadata", "name"), Some("demo"));
        assert_eq!(doc.get("metadata", "version"), Some("1.0"));
        assert_eq!(doc.get("options", "zip_safe"), Some("False"));
    }

    #[test]
    fn test_parse_dangling_values() {
        let text = "\
[metadata]
classifiers =
\tLicense :: OSI Approved
\tProgramming Language :: Python

  ; indented comment
[options.entry_points]
console_scripts =
    demo = demo.cli:main
";
        let doc = parse(text).unwrap();
        assert_eq!(
            doc.get("metadata", "classifiers"),
            Some("\nLicense :: OSI Approved\nProgramming Language :: Python")
        );
        assert_eq!(
            doc.get("options.entry_points", "console_scripts"),
            Some("\ndemo = demo.cli:main")
        );
    }

    #[test]
    fn test_value_keeps_later_delimiters() {
        let doc = parse("[metadata]\nurl = https://example.com:8080/x\n").unwrap();
        assert_eq!(doc.get("metadata", "url"), Some("https://example.com:8080/x"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("name = demo\n").unwrap_err(), IniError::MissingSection(1));
        assert!(matches!(
            parse("[metadata\n").unwrap_err(),
            IniError::Syntax { line: 1, .. }
        ));
        assert!(matches!(
            parse("[metadata]\nnot a pair\n").unwrap_err(),
            IniError::Syntax { line: 2, .. }
        ));
        assert!(matches!(
            parse("[a]\nx = 1\n[a]\n").unwrap_err(),
            IniError::DuplicateSection { line: 3, .. }
        ));
    }

    #[test]
    fn test_preserving_case() {
        let doc = parse_preserving_case("[metadata]\nName = demo\n").unwrap();
        assert_eq!(doc.get("metadata", "Name"), Some("demo"));
    }

    #[test]
    fn test_named_section_keys_keep_case() {
        let text = "\
[metadata]
Name = demo

[options.package_data]
MyPkg = *.json

[options.extras_require]
PDF = reportlab

[console_scripts]
Demo = demo:main
";
        let doc = parse(text).unwrap();
        assert_eq!(doc.get("metadata", "name"), Some("demo"));
        assert_eq!(doc.get("options.package_data", "MyPkg"), Some("*.json"));
        assert_eq!(doc.get("options.extras_require", "PDF"), Some("reportlab"));
        assert_eq!(doc.get("console_scripts", "Demo"), Some("demo:main"));
        assert_eq!(parse(&write(&doc)).unwrap(), doc);
    }

    #[test]
    fn test_write_layout() {
        let mut doc = ConfigDocument::new();
        doc.set("metadata", "name", "demo");
        doc.set("metadata", "classifiers", "\nA :: B\nC :: D");
        doc.set("metadata", "project_urls", "\nDocs = https://docs.example.com");
        doc.set("options", "zip_safe", "False");
        doc.set("options", "empty", "");

        let text = write(&doc);
        assert_eq!(
            text,
            "[metadata]\n\
             name = demo\n\
             classifiers =\n\
             \tA :: B\n\
             \tC :: D\n\
             project_urls =\n\
             \tDocs = https://docs.example.com\n\
             \n\
             [options]\n\
             zip_safe = False\n\
             empty =\n"
        );
    }

    #[test]
    fn test_written_text_parses_back() {
        let mut doc = ConfigDocument::new();
        doc.set("metadata", "name", "demo");
        doc.set("metadata", "keywords", "\nalpha\nbeta");
        doc.set("options", "install_requires", "requests; click");

        assert_eq!(parse(&write(&doc)).unwrap(), doc);
    }

    #[test]
    fn test_multiline_text_round_trip() {
        let mut doc = ConfigDocument::new();
        doc.set(
            "metadata",
            "long_description",
            "Intro\n# Usage\n\n    code\n; not a comment\nend\n",
        );

        let text = write(&doc);
        assert_eq!(
            text,
            "[metadata]\n\
             long_description = Intro\n\
             \t# Usage\n\
             \t\n\
             \t    code\n\
             \t; not a comment\n\
             \tend\n\
             \t\n"
        );
        assert_eq!(parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_tab_line_after_header_is_ignored() {
        let doc = parse("[metadata]\n\t\nname = demo\n").unwrap();
        assert_eq!(doc.get("metadata", "name"), Some("demo"));
    }
}
