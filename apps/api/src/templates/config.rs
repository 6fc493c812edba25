//! Typed template configuration, deserialized from `<templateId>.config.json`
//! after `validation` has accepted the raw document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    pub template_id: String,
    #[serde(default)]
    pub version: Option<String>,
    pub metadata: TemplateMetadata,
    #[serde(default)]
    pub features: TemplateFeatures,
    #[serde(default)]
    pub color_schemes: BTreeMap<String, ColorSchemeDef>,
    #[serde(default)]
    pub fonts: BTreeMap<String, FontDef>,
    #[serde(default)]
    pub sections: BTreeMap<String, SectionDef>,
    #[serde(default)]
    pub placeholders: BTreeMap<String, PlaceholderDef>,
    #[serde(default)]
    pub engine: Option<Engine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub main_file: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateFeatures {
    pub supports_color_schemes: bool,
    pub supports_fonts: bool,
    pub supports_section_toggle: bool,
    pub supports_custom_colors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorSchemeDef {
    pub label: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<ColorSchemeKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSchemeKind {
    Predefined,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontDef {
    pub label: String,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub commands: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDef {
    pub label: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub start_marker: Option<String>,
    #[serde(default)]
    pub end_marker: Option<String>,
    #[serde(default)]
    pub removable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderDef {
    pub label: String,
    #[serde(default, rename = "type")]
    pub kind: Option<PlaceholderKind>,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    #[default]
    Text,
    Textarea,
    Email,
    Phone,
    Url,
    Date,
}

/// LaTeX engine binary used to compile a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Pdflatex,
    Xelatex,
    Lualatex,
}

impl Engine {
    pub const ALL: [Engine; 3] = [Engine::Pdflatex, Engine::Xelatex, Engine::Lualatex];

    pub fn binary(self) -> &'static str {
        match self {
            Engine::Pdflatex => "pdflatex",
            Engine::Xelatex => "xelatex",
            Engine::Lualatex => "lualatex",
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.binary())
    }
}

/// Summary row returned by `TemplateConfigStore::available_templates`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub template_id: String,
    pub name: String,
    pub description: Option<String>,
    pub main_file: String,
    pub features: TemplateFeatures,
    pub version: Option<String>,
}

impl From<&TemplateConfig> for TemplateSummary {
    fn from(config: &TemplateConfig) -> Self {
        Self {
            template_id: config.template_id.clone(),
            name: config.metadata.name.clone(),
            description: config.metadata.description.clone(),
            main_file: config.metadata.main_file.clone(),
            features: config.features,
            version: config.version.clone(),
        }
    }
}
