use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// User-chosen adjustments applied on top of a populated template.
///
/// Request-scoped; discarded once the render finishes. Map-valued fields are
/// ordered so the generated operation list is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customizations {
    pub color_scheme: Option<String>,
    pub font: Option<String>,
    pub enabled_sections: BTreeMap<String, bool>,
    pub edited_content: BTreeMap<String, String>,
    pub custom_colors: BTreeMap<String, String>,
}

impl Customizations {
    pub fn is_empty(&self) -> bool {
        self.color_scheme.is_none()
            && self.font.is_none()
            && self.enabled_sections.is_empty()
            && self.edited_content.is_empty()
            && self.custom_colors.is_empty()
    }
}
