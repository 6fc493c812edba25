//! Customizations lowered to an explicit, ordered operation list.

use std::collections::BTreeMap;

use crate::models::customization::Customizations;
use crate::templates::config::TemplateConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomizationOp {
    SetColorScheme(String),
    SetFont(String),
    ToggleSection { id: String, enabled: bool },
    ReplacePlaceholders(BTreeMap<String, String>),
    SetCustomColor { name: String, hex: String },
}

impl Customizations {
    /// Operations in application order, filtered by the template's feature flags.
    /// Edited content is applied regardless of flags.
    pub fn to_ops(&self, config: &TemplateConfig) -> Vec<CustomizationOp> {
        let features = &config.features;
        let mut ops = Vec::new();

        if features.supports_color_schemes {
            if let Some(scheme) = &self.color_scheme {
                ops.push(CustomizationOp::SetColorScheme(scheme.clone()));
            }
        }
        if features.supports_fonts {
            if let Some(font) = &self.font {
                ops.push(CustomizationOp::SetFont(font.clone()));
            }
        }
        if features.supports_section_toggle {
            ops.extend(self.enabled_sections.iter().map(|(id, enabled)| {
                CustomizationOp::ToggleSection {
                    id: id.clone(),
                    enabled: *enabled,
                }
            }));
        }
        if !self.edited_content.is_empty() {
            ops.push(CustomizationOp::ReplacePlaceholders(self.edited_content.clone()));
        }
        if features.supports_custom_colors {
            ops.extend(self.custom_colors.iter().map(|(name, hex)| {
                CustomizationOp::SetCustomColor {
                    name: name.clone(),
                    hex: hex.clone(),
                }
            }));
        }
        ops
    }
}
