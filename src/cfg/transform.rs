// src/cfg/transform.rs

//! Field renderers for setup.cfg values
//!
//! Every captured value ends up as a string in setup.cfg. Lists are inlined
//! until they grow past a threshold, then become "dangling" lists: a leading
//! newline followed by one item per line.

use crate::capture::shim::{StandInMarker, stand_in_marker};
use serde_json::Value;
use thiserror::Error;

/// Default length above which lists are rendered one item per line
pub const DEFAULT_DANGLING_LIST_THRESHOLD: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("`{field}` cannot be rendered from a {shape} value")]
    UnsupportedShape { field: String, shape: &'static str },

    #[error("`{field}` holds an object the build script could not serialize: {repr}")]
    Opaque { field: String, repr: String },
}

/// Rendering settings shared by every field in one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub dangling_list_threshold: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dangling_list_threshold: DEFAULT_DANGLING_LIST_THRESHOLD,
        }
    }
}

/// Always-dangling list, one item per line
pub fn join_lines(values: &[String]) -> String {
    format!("\n{}", values.join("\n"))
}

/// Comma-joined list, dangling once longer than `threshold`
pub fn list_comma(values: &[String], threshold: usize) -> String {
    inline_or_dangling(values, ',', threshold)
}

/// Semicolon-joined list, dangling once longer than `threshold`
pub fn list_semi(values: &[String], threshold: usize) -> String {
    inline_or_dangling(values, ';', threshold)
}

/// An item containing the separator (a marker like `foo; os_name == 'nt'`)
/// would be split when read back, so it forces the dangling form
fn inline_or_dangling(values: &[String], separator: char, threshold: usize) -> String {
    let joiner = format!("{} ", separator);
    let inline = values.join(joiner.as_str());
    if inline.chars().count() > threshold || values.iter().any(|v| v.contains(separator)) {
        join_lines(values)
    } else {
        inline
    }
}

/// Dangling `key = value` block; mappings are never inlined
pub fn mapping(pairs: &[(String, String)]) -> String {
    let lines: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{} = {}", key, value))
        .collect();
    join_lines(&lines)
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

fn unsupported(field: &str, value: &Value) -> TransformError {
    if let Some(StandInMarker::Opaque(repr)) = stand_in_marker(value) {
        return TransformError::Opaque {
            field: field.to_string(),
            repr,
        };
    }
    TransformError::UnsupportedShape {
        field: field.to_string(),
        shape: shape(value),
    }
}

/// Render a scalar; `None` means the script passed `None`
pub fn scalar(field: &str, value: &Value) -> Result<Option<String>, TransformError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(true) => Ok(Some("True".to_string())),
        Value::Bool(false) => Ok(Some("False".to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(unsupported(field, other)),
    }
}

/// Coerce a value into a list of strings; a bare scalar is a one-item list
pub fn string_list(field: &str, value: &Value) -> Result<Vec<String>, TransformError> {
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Array(_) | Value::Object(_) => return Err(unsupported(field, item)),
                    _ => out.extend(scalar(field, item)?),
                }
            }
            Ok(out)
        }
        Value::Object(_) => Err(unsupported(field, value)),
        other => Ok(scalar(field, other)?.into_iter().collect()),
    }
}

/// Coerce a mapping of scalars into ordered pairs
pub fn string_pairs(field: &str, value: &Value) -> Result<Vec<(String, String)>, TransformError> {
    let Some(map) = value.as_object().filter(|_| stand_in_marker(value).is_none()) else {
        return Err(unsupported(field, value));
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, item) in map {
        if let Some(rendered) = scalar(field, item)? {
            pairs.push((key.clone(), rendered));
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_list_comma_under_threshold() {
        let values = strings(&["django", "web", "framework"]);
        assert_eq!(list_comma(&values, 100), "django, web, framework");
    }

    #[test]
    fn test_list_comma_over_threshold_dangles_in_order() {
        let values = strings(&["alpha", "beta", "gamma"]);
        assert_eq!(list_comma(&values, 10), "\nalpha\nbeta\ngamma");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let values = strings(&["abcd", "efgh"]);
        // "abcd, efgh" is exactly 10 characters
        assert_eq!(list_comma(&values, 10), "abcd, efgh");
        assert_eq!(list_comma(&values, 9), "\nabcd\nefgh");
    }

    #[test]
    fn test_list_semi() {
        let values = strings(&["requests>=2.0", "click"]);
        assert_eq!(list_semi(&values, 100), "requests>=2.0; click");
        assert_eq!(list_semi(&values, 5), "\nrequests>=2.0\nclick");
    }

    #[test]
    fn test_separator_in_item_forces_dangling() {
        let values = strings(&["requests", "pywin32; sys_platform == 'win32'"]);
        assert_eq!(
            list_semi(&values, 100),
            "\nrequests\npywin32; sys_platform == 'win32'"
        );
        assert_eq!(list_comma(&strings(&["a,b", "c"]), 100), "\na,b\nc");
    }

    #[test]
    fn test_join_lines_always_dangles() {
        let values = strings(&["Programming Language :: Python"]);
        assert_eq!(join_lines(&values), "\nProgramming Language :: Python");
    }

    #[test]
    fn test_mapping_always_dangles() {
        let pairs = vec![
            ("Source".to_string(), "https://example.com/src".to_string()),
            ("Docs".to_string(), "https://example.com/docs".to_string()),
        ];
        assert_eq!(
            mapping(&pairs),
            "\nSource = https://example.com/src\nDocs = https://example.com/docs"
        );
    }

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(scalar("zip_safe", &json!(false)).unwrap(), Some("False".into()));
        assert_eq!(scalar("zip_safe", &json!(true)).unwrap(), Some("True".into()));
        assert_eq!(scalar("version", &json!(2)).unwrap(), Some("2".into()));
        assert_eq!(scalar("version", &json!(null)).unwrap(), None);
        assert!(matches!(
            scalar("name", &json!(["a"])),
            Err(TransformError::UnsupportedShape { shape: "list", .. })
        ));
    }

    #[test]
    fn test_string_list_wraps_bare_string() {
        assert_eq!(string_list("keywords", &json!("cli")).unwrap(), strings(&["cli"]));
        assert_eq!(
            string_list("keywords", &json!(["a", 1, null])).unwrap(),
            strings(&["a", "1"])
        );
    }

    #[test]
    fn test_string_list_rejects_nested() {
        assert!(string_list("keywords", &json!([["a"]])).is_err());
        assert!(string_list("keywords", &json!({"a": "b"})).is_err());
    }

    #[test]
    fn test_opaque_values_are_reported() {
        let value = json!({"__pymigrate__": "opaque", "repr": "<Extension 'fast'>"});
        let err = string_pairs("project_urls", &value).unwrap_err();
        assert_eq!(
            err,
            TransformError::Opaque {
                field: "project_urls".to_string(),
                repr: "<Extension 'fast'>".to_string(),
            }
        );
    }

    #[test]
    fn test_string_pairs_keeps_order() {
        let pairs = string_pairs("package_dir", &json!({"": "src", "extra": "lib"})).unwrap();
        assert_eq!(
            pairs,
            vec![
                (String::new(), "src".to_string()),
                ("extra".to_string(), "lib".to_string())
            ]
        );
    }
}
