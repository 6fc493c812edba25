//! Placeholder Extractor: finds the editable tokens a template source exposes.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::templates::config::{PlaceholderKind, TemplateConfig};

static BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Z_]+)\}").expect("BUG: invalid braced placeholder regex"));

static PLACEHOLDER_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\([A-Z]*PLACEHOLDER[A-Z_]*)").expect("BUG: invalid placeholder command regex")
});

static COMMAND_ARGUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\[a-zA-Z]+\{([A-Z_]+)\}").expect("BUG: invalid command argument regex")
});

/// Color-model keywords that appear as all-caps arguments without being placeholders.
pub const COLOR_MODELS: [&str; 4] = ["RGB", "HTML", "CMYK", "HSB"];

/// Token shape a placeholder was found in, in scan priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderShape {
    Braced,
    PlaceholderCommand,
    CommandArgument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedPlaceholder {
    pub name: String,
    pub shape: PlaceholderShape,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionPresence {
    pub id: String,
    pub label: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: PlaceholderKind,
    pub current_value: Option<String>,
    pub configured: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderCatalog {
    pub template_id: String,
    pub placeholders: Vec<CatalogEntry>,
    pub sections: Vec<SectionPresence>,
}

/// Scans shapes in priority order; the first occurrence of each name wins.
pub fn extract_placeholders(text: &str) -> Vec<ExtractedPlaceholder> {
    let scans: [(&Regex, PlaceholderShape, usize); 3] = [
        (&*BRACED, PlaceholderShape::Braced, 1),
        (&*PLACEHOLDER_COMMAND, PlaceholderShape::PlaceholderCommand, 1),
        (&*COMMAND_ARGUMENT, PlaceholderShape::CommandArgument, 4),
    ];

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for (re, shape, min_len) in scans {
        for caps in re.captures_iter(text) {
            let name = &caps[1];
            if name.len() < min_len || COLOR_MODELS.contains(&name) {
                continue;
            }
            if seen.insert(name.to_string()) {
                found.push(ExtractedPlaceholder {
                    name: name.to_string(),
                    shape,
                });
            }
        }
    }
    found
}

/// Tests each configured section against `text`: the first pattern match, or
/// the span between its markers when no pattern is configured.
pub fn extract_sections(text: &str, config: &TemplateConfig) -> Vec<SectionPresence> {
    config
        .sections
        .iter()
        .map(|(id, section)| {
            let (exists, content) = match (section.pattern.as_deref(), section.start_marker.as_deref()) {
                (Some(pattern), _) => {
                    let content = Regex::new(pattern)
                        .ok()
                        .and_then(|re| re.find(text).map(|m| m.as_str().to_string()));
                    (content.is_some(), content)
                }
                (None, Some(start)) => match text.find(start) {
                    Some(pos) => {
                        let content = section.end_marker.as_deref().and_then(|end| {
                            text[pos..]
                                .find(end)
                                .map(|e| text[pos..pos + e + end.len()].to_string())
                        });
                        (true, content)
                    }
                    None => (false, None),
                },
                (None, None) => (false, None),
            };
            SectionPresence {
                id: id.clone(),
                label: section.label.clone(),
                exists,
                content,
            }
        })
        .collect()
}

/// Config placeholders first (with their defaults), then tokens found only in the source.
pub fn build_catalog(config: &TemplateConfig, text: &str) -> PlaceholderCatalog {
    let mut placeholders: Vec<CatalogEntry> = config
        .placeholders
        .iter()
        .map(|(name, def)| CatalogEntry {
            name: name.clone(),
            label: def.label.clone(),
            kind: def.kind.unwrap_or_default(),
            current_value: def.default.clone(),
            configured: true,
        })
        .collect();

    for extracted in extract_placeholders(text) {
        if config.placeholders.contains_key(&extracted.name) {
            continue;
        }
        placeholders.push(CatalogEntry {
            label: label_from_name(&extracted.name),
            name: extracted.name,
            kind: PlaceholderKind::Text,
            current_value: None,
            configured: false,
        });
    }

    PlaceholderCatalog {
        template_id: config.template_id.clone(),
        placeholders,
        sections: extract_sections(text, config),
    }
}

/// `FULL_NAME` -> `Full Name`.
pub fn label_from_name(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
