//! Structural validation of a raw template config document.
//!
//! Runs on the untyped `serde_json::Value` so every problem is collected in a
//! single pass, instead of stopping at the first field serde rejects.

use std::path::{Component, Path};

use regex::Regex;
use serde_json::{Map, Value};

use crate::errors::FieldError;

const COLOR_SCHEME_TYPES: &[&str] = &["predefined", "custom"];
const PLACEHOLDER_TYPES: &[&str] = &["text", "textarea", "email", "phone", "url", "date"];
const ENGINES: &[&str] = &["pdflatex", "xelatex", "lualatex"];
const FEATURE_FLAGS: &[&str] = &[
    "supportsColorSchemes",
    "supportsFonts",
    "supportsSectionToggle",
    "supportsCustomColors",
];

/// Returns every field-level problem in `doc`; empty means valid.
pub fn validate_config(doc: &Value) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let Some(root) = doc.as_object() else {
        errors.push(FieldError::new("$", "must be a JSON object"));
        return errors;
    };

    required_string(root, "templateId", "templateId", &mut errors);
    optional_string(root, "version", "version", &mut errors);
    optional_enum(root, "engine", "engine", ENGINES, &mut errors);

    match root.get("metadata") {
        Some(Value::Object(meta)) => validate_metadata(meta, &mut errors),
        Some(_) => errors.push(FieldError::new("metadata", "must be an object")),
        None => errors.push(FieldError::new("metadata", "is required")),
    }

    if let Some(features) = object_field(root, "features", "features", &mut errors) {
        for flag in FEATURE_FLAGS {
            if let Some(v) = features.get(*flag) {
                if !v.is_boolean() {
                    errors.push(FieldError::new(format!("features.{flag}"), "must be a boolean"));
                }
            }
        }
    }

    for_each_entry(root, "colorSchemes", &mut errors, |path, scheme, errors| {
        required_string(scheme, "label", &format!("{path}.label"), errors);
        optional_string(scheme, "command", &format!("{path}.command"), errors);
        optional_enum(scheme, "type", &format!("{path}.type"), COLOR_SCHEME_TYPES, errors);
    });

    for_each_entry(root, "fonts", &mut errors, |path, font, errors| {
        required_string(font, "label", &format!("{path}.label"), errors);
        optional_string(font, "commands", &format!("{path}.commands"), errors);
        match font.get("packages") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.as_str().is_some_and(|s| !s.trim().is_empty()) {
                        errors.push(FieldError::new(
                            format!("{path}.packages[{i}]"),
                            "must be a non-empty string",
                        ));
                    }
                }
            }
            Some(_) => errors.push(FieldError::new(
                format!("{path}.packages"),
                "must be an array of strings",
            )),
        }
    });

    for_each_entry(root, "sections", &mut errors, |path, section, errors| {
        validate_section(path, section, errors);
    });

    for_each_entry(root, "placeholders", &mut errors, |path, ph, errors| {
        required_string(ph, "label", &format!("{path}.label"), errors);
        optional_enum(ph, "type", &format!("{path}.type"), PLACEHOLDER_TYPES, errors);
        optional_string(ph, "default", &format!("{path}.default"), errors);
    });

    errors
}

fn validate_metadata(meta: &Map<String, Value>, errors: &mut Vec<FieldError>) {
    required_string(meta, "name", "metadata.name", errors);
    optional_string(meta, "description", "metadata.description", errors);
    if let Some(main_file) = required_string(meta, "mainFile", "metadata.mainFile", errors) {
        let path = Path::new(main_file);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            errors.push(FieldError::new(
                "metadata.mainFile",
                "must be a relative path inside the template store",
            ));
        }
    }
}

fn validate_section(path: &str, section: &Map<String, Value>, errors: &mut Vec<FieldError>) {
    required_string(section, "label", &format!("{path}.label"), errors);
    let pattern = locator(section, "pattern", path, errors);
    let start = locator(section, "startMarker", path, errors);
    locator(section, "endMarker", path, errors);

    if let Some(p) = pattern {
        if let Err(e) = Regex::new(p) {
            errors.push(FieldError::new(
                format!("{path}.pattern"),
                format!("is not a valid regular expression: {e}"),
            ));
        }
    }

    let removable = match section.get("removable") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            errors.push(FieldError::new(format!("{path}.removable"), "must be a boolean"));
            false
        }
    };
    if removable && pattern.is_none() && start.is_none() {
        errors.push(FieldError::new(
            path.to_string(),
            "removable sections need a pattern or a startMarker",
        ));
    }
}

/// A section locator string; an empty one would match at offset 0.
fn locator<'a>(
    section: &'a Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    let field = format!("{path}.{key}");
    let value = optional_string(section, key, &field, errors)?;
    if value.is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
        return None;
    }
    Some(value)
}

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

fn required_string<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::String(_)) => {
            errors.push(FieldError::new(path, "must not be empty"));
            None
        }
        Some(Value::Null) | None => {
            errors.push(FieldError::new(path, "is required"));
            None
        }
        Some(_) => {
            errors.push(FieldError::new(path, "must be a string"));
            None
        }
    }
}

fn optional_string<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(_) => {
            errors.push(FieldError::new(path, "must be a string"));
            None
        }
    }
}

fn optional_enum(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    allowed: &[&str],
    errors: &mut Vec<FieldError>,
) {
    if let Some(value) = optional_string(obj, key, path, errors) {
        if !allowed.contains(&value) {
            errors.push(FieldError::new(
                path,
                format!("must be one of: {}", allowed.join(", ")),
            ));
        }
    }
}

fn object_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a Map<String, Value>> {
    match obj.get(key) {
        Some(Value::Object(map)) => Some(map),
        Some(Value::Null) | None => None,
        Some(_) => {
            errors.push(FieldError::new(path, "must be an object"));
            None
        }
    }
}

/// Visits each `<key>.<name>` entry of a map-valued field, requiring object values.
fn for_each_entry<F>(root: &Map<String, Value>, key: &str, errors: &mut Vec<FieldError>, mut f: F)
where
    F: FnMut(&str, &Map<String, Value>, &mut Vec<FieldError>),
{
    let Some(entries) = object_field(root, key, key, errors) else {
        return;
    };
    for (name, value) in entries {
        let path = format!("{key}.{name}");
        match value.as_object() {
            Some(entry) => f(&path, entry, errors),
            None => errors.push(FieldError::new(path, "must be an object")),
        }
    }
}
