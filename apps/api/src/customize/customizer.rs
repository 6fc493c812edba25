//! Applies customization operations to a single populated source buffer.
//!
//! Every operation is best-effort: anything that cannot be applied becomes a
//! `RenderWarning` (logged and collected) and leaves the buffer unchanged.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex};
use tracing::{debug, warn};

use crate::errors::RenderWarning;
use crate::injection::escape::escape_latex;
use crate::injection::markup::{has_command, has_token, replace_command, replace_token};
use crate::templates::config::TemplateConfig;

use super::color::{is_valid_color_name, parse_hex};
use super::ops::CustomizationOp;

const BEGIN_DOCUMENT: &str = "\\begin{document}";

static SCHEME_COMMANDS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"\\setcolorscheme\{[^}]+\}",
        r"\\colorlet\{[^}]+\}\{[^}]+\}",
        r"\\definecolor\{[^}]+\}\{[^}]+\}\{[^}]+\}",
    ]
    .map(|p| Regex::new(p).expect("BUG: invalid color scheme regex"))
});

static USEPACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\usepackage(?:\[[^\]]*\])?\{([^}]*)\}").expect("BUG: invalid usepackage regex")
});

static FAMILY_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\renewcommand\{\\familydefault\}.*\n").expect("BUG: invalid familydefault regex")
});

static SECTION_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:cvsection|csection|section\*?)\{|\\(?:begin|end)\{document\}")
        .expect("BUG: invalid section boundary regex")
});

/// One customizer serves one render job.
pub struct Customizer<'a> {
    text: String,
    config: &'a TemplateConfig,
    warnings: Vec<RenderWarning>,
}

impl<'a> Customizer<'a> {
    pub fn new(source: String, config: &'a TemplateConfig) -> Self {
        Self {
            text: source,
            config,
            warnings: Vec::new(),
        }
    }

    pub fn apply_all(&mut self, ops: &[CustomizationOp]) {
        for op in ops {
            self.apply(op);
        }
    }

    pub fn apply(&mut self, op: &CustomizationOp) {
        match op {
            CustomizationOp::SetColorScheme(name) => self.set_color_scheme(name),
            CustomizationOp::SetFont(name) => self.set_font(name),
            CustomizationOp::ToggleSection { id, enabled } => self.toggle_section(id, *enabled),
            CustomizationOp::ReplacePlaceholders(values) => self.replace_placeholders(values),
            CustomizationOp::SetCustomColor { name, hex } => self.set_custom_color(name, hex),
        }
    }

    pub fn into_parts(self) -> (String, Vec<RenderWarning>) {
        (self.text, self.warnings)
    }

    fn warn(&mut self, warning: RenderWarning) {
        warn!(template_id = %self.config.template_id, "{warning}");
        self.warnings.push(warning);
    }

    /// Inserts `block` immediately before `\begin{document}`.
    fn insert_before_document(&mut self, block: &str) -> bool {
        match self.text.find(BEGIN_DOCUMENT) {
            Some(pos) => {
                self.text.insert_str(pos, block);
                true
            }
            None => false,
        }
    }

    fn set_color_scheme(&mut self, name: &str) {
        let skipped = |reason: &str| RenderWarning::ColorSchemeSkipped {
            scheme: name.to_string(),
            reason: reason.to_string(),
        };
        let Some(scheme) = self.config.color_schemes.get(name) else {
            return self.warn(skipped("unknown color scheme"));
        };
        let Some(command) = scheme.command.as_deref().filter(|c| !c.trim().is_empty()) else {
            return self.warn(skipped("scheme defines no command"));
        };

        if let Some(re) = SCHEME_COMMANDS.iter().find(|re| re.is_match(&self.text)) {
            self.text = re.replace_all(&self.text, NoExpand(command)).into_owned();
        } else if !self.insert_before_document(&format!("{command}\n")) {
            return self.warn(skipped("source has no \\begin{document}"));
        }
        debug!(scheme = name, "Applied color scheme");
    }

    fn set_font(&mut self, name: &str) {
        let skipped = |reason: &str| RenderWarning::FontSkipped {
            font: name.to_string(),
            reason: reason.to_string(),
        };
        let Some(font) = self.config.fonts.get(name) else {
            return self.warn(skipped("unknown font"));
        };
        if !self.text.contains(BEGIN_DOCUMENT) {
            return self.warn(skipped("source has no \\begin{document}"));
        }

        let loaded: HashSet<String> = USEPACKAGE
            .captures_iter(&self.text)
            .flat_map(|caps| {
                caps[1]
                    .split(',')
                    .map(|p| p.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .collect();

        let mut block = String::new();
        for package in &font.packages {
            if !loaded.contains(package.trim()) {
                block.push_str(&format!("\\usepackage{{{}}}\n", package.trim()));
            }
        }
        if let Some(commands) = font.commands.as_deref().filter(|c| !c.trim().is_empty()) {
            self.text = FAMILY_DEFAULT.replace_all(&self.text, "").into_owned();
            block.push_str(commands);
            if !commands.ends_with('\n') {
                block.push('\n');
            }
        }
        self.insert_before_document(&block);
        debug!(font = name, "Applied font");
    }

    fn toggle_section(&mut self, id: &str, enabled: bool) {
        let skipped = |reason: &str| RenderWarning::SectionSkipped {
            section: id.to_string(),
            reason: reason.to_string(),
        };
        let Some(section) = self.config.sections.get(id) else {
            return self.warn(skipped("unknown section"));
        };
        if enabled {
            // Removed text cannot be restored; enabled sections are left as they are.
            return;
        }
        if !section.removable {
            return self.warn(skipped("section is not removable"));
        }

        if let Some(pattern) = section.pattern.as_deref().filter(|p| !p.is_empty()) {
            let re = match Regex::new(pattern) {
                Ok(re) => re,
                Err(_) => return self.warn(skipped("section pattern does not compile")),
            };
            if !re.is_match(&self.text) {
                return self.warn(skipped("section pattern matched nothing"));
            }
            self.text = re.replace_all(&self.text, "").into_owned();
        } else if let Some(start_marker) = section.start_marker.as_deref().filter(|m| !m.is_empty()) {
            let Some(start) = self.text.find(start_marker) else {
                return self.warn(skipped("start marker not found"));
            };
            let body_start = start + start_marker.len();
            let end = match section.end_marker.as_deref().filter(|m| !m.is_empty()) {
                Some(end_marker) => match self.text[body_start..].find(end_marker) {
                    Some(pos) => body_start + pos + end_marker.len(),
                    None => return self.warn(skipped("end marker not found")),
                },
                None => SECTION_BOUNDARY
                    .find(&self.text[body_start..])
                    .map(|m| body_start + m.start())
                    .unwrap_or(self.text.len()),
            };
            self.text.replace_range(start..end, "");
        } else {
            return self.warn(skipped("section has no pattern or start marker"));
        }
        debug!(section = id, "Removed section");
    }

    fn replace_placeholders(&mut self, values: &BTreeMap<String, String>) {
        for (name, value) in values {
            if name.is_empty() {
                continue;
            }
            let escaped = escape_latex(value);
            if !self.replace_placeholder(name, &escaped) {
                self.warn(RenderWarning::PlaceholderUnresolved { name: name.clone() });
            }
        }
    }

    /// Tries each placeholder shape in turn; the first shape present replaces all of its occurrences.
    fn replace_placeholder(&mut self, name: &str, value: &str) -> bool {
        if has_token(&self.text, name) {
            self.text = replace_token(&self.text, name, value);
            return true;
        }

        let braced = format!("{{{name}}}");
        if self.text.contains(&braced) {
            self.text = self.text.replace(&braced, &format!("{{{value}}}"));
            return true;
        }

        if has_command(&self.text, name) {
            self.text = replace_command(&self.text, name, value);
            return true;
        }

        let Ok(argument) = Regex::new(&format!(r"(\\[a-zA-Z]+)\{{{}\}}", regex::escape(name))) else {
            return false;
        };
        if argument.is_match(&self.text) {
            self.text = argument
                .replace_all(&self.text, |caps: &Captures| format!("{}{{{value}}}", &caps[1]))
                .into_owned();
            return true;
        }
        false
    }

    fn set_custom_color(&mut self, name: &str, hex: &str) {
        let rejected = |reason: &str| RenderWarning::CustomColorRejected {
            name: name.to_string(),
            value: hex.to_string(),
            reason: reason.to_string(),
        };
        if !is_valid_color_name(name) {
            return self.warn(rejected("color names use letters, digits and hyphens"));
        }
        let Some((r, g, b)) = parse_hex(hex) else {
            return self.warn(rejected("expected a six-digit hex color"));
        };
        let block = format!("\\definecolor{{{name}}}{{RGB}}{{{r},{g},{b}}}\n\\colorlet{{{name}}}{{{name}}}\n");
        if !self.insert_before_document(&block) {
            self.warn(rejected("source has no \\begin{document}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::config::{
        ColorSchemeDef, FontDef, SectionDef, TemplateFeatures, TemplateMetadata,
    };

    const SOURCE: &str = "\\documentclass{article}\n\\usepackage[T1]{fontenc}\n\\usepackage{xcolor,graphicx}\n\\definecolor{accent}{HTML}{336699}\n\\renewcommand{\\familydefault}{\\rmdefault}\n\\begin{document}\n\\name{FULL_NAME}\n%--SKILLS--%\nRust\n%--END SKILLS--%\n\\section{Projects}\nA\n\\section{Awards}\nB\n\\end{document}\n";

    fn section(pattern: Option<&str>, start: Option<&str>, end: Option<&str>) -> SectionDef {
        SectionDef {
            label: "Section".into(),
            pattern: pattern.map(str::to_string),
            start_marker: start.map(str::to_string),
            end_marker: end.map(str::to_string),
            removable: true,
        }
    }

    fn make_config() -> TemplateConfig {
        let mut config = TemplateConfig {
            template_id: "demo".into(),
            version: None,
            metadata: TemplateMetadata {
                name: "Demo".into(),
                description: None,
                main_file: "demo/main.tex".into(),
            },
            features: TemplateFeatures::default(),
            color_schemes: Default::default(),
            fonts: Default::default(),
            sections: Default::default(),
            placeholders: Default::default(),
            engine: None,
        };
        config.color_schemes.insert(
            "ocean".into(),
            ColorSchemeDef {
                label: "Ocean".into(),
                command: Some("\\definecolor{accent}{HTML}{006994}".into()),
                kind: None,
            },
        );
        config.color_schemes.insert(
            "lagoon".into(),
            ColorSchemeDef {
                label: "Lagoon".into(),
                command: Some("\\colorlet{accent}{teal}".into()),
                kind: None,
            },
        );
        config.fonts.insert(
            "lato".into(),
            FontDef {
                label: "Lato".into(),
                packages: vec!["lato".into(), "fontenc".into()],
                commands: Some("\\renewcommand{\\familydefault}{\\sfdefault}".into()),
            },
        );
        config.sections.insert(
            "skills".into(),
            section(Some(r"%--SKILLS--%[\s\S]*?%--END SKILLS--%\n"), None, None),
        );
        config.sections.insert(
            "projects".into(),
            section(None, Some("\\section{Projects}"), None),
        );
        config.sections.insert(
            "awards".into(),
            section(None, Some("\\section{Awards}"), Some("B\n")),
        );
        config.sections.insert(
            "projects-fenced".into(),
            section(None, Some("\\section{Projects}"), Some("%--END PROJECTS--%")),
        );
        config
    }

    fn run(op: CustomizationOp) -> (String, Vec<RenderWarning>) {
        let config = make_config();
        let mut customizer = Customizer::new(SOURCE.to_string(), &config);
        customizer.apply(&op);
        customizer.into_parts()
    }

    #[test]
    fn test_color_scheme_replaces_definition() {
        let (text, warnings) = run(CustomizationOp::SetColorScheme("ocean".into()));
        assert!(warnings.is_empty());
        assert!(text.contains("\\definecolor{accent}{HTML}{006994}"));
        assert!(!text.contains("336699"));
    }

    #[test]
    fn test_color_scheme_replaces_every_occurrence() {
        let config = make_config();
        let source = "\\colorlet{accent}{blue}\n\\colorlet{accent}{red}\n\\definecolor{x}{HTML}{000000}\n\\begin{document}\n";
        let mut customizer = Customizer::new(source.to_string(), &config);
        customizer.apply(&CustomizationOp::SetColorScheme("lagoon".into()));
        let (text, warnings) = customizer.into_parts();
        assert!(warnings.is_empty());
        assert_eq!(text.matches("\\colorlet{accent}{teal}").count(), 2);
        assert!(!text.contains("{blue}") && !text.contains("{red}"));
        assert!(text.contains("\\definecolor{x}{HTML}{000000}"));
    }

    #[test]
    fn test_unknown_color_scheme_warns() {
        let (text, warnings) = run(CustomizationOp::SetColorScheme("neon".into()));
        assert_eq!(text, SOURCE);
        assert!(matches!(warnings[0], RenderWarning::ColorSchemeSkipped { .. }));
    }

    #[test]
    fn test_font_adds_missing_packages_once() {
        let (text, warnings) = run(CustomizationOp::SetFont("lato".into()));
        assert!(warnings.is_empty());
        assert_eq!(text.matches("\\usepackage{lato}").count(), 1);
        assert!(!text.contains("\\usepackage{fontenc}"));
        assert!(!text.contains("\\rmdefault"));
        assert!(text.contains("\\renewcommand{\\familydefault}{\\sfdefault}\n\\begin{document}"));
    }

    #[test]
    fn test_toggle_by_pattern() {
        let (text, _) = run(CustomizationOp::ToggleSection {
            id: "skills".into(),
            enabled: false,
        });
        assert!(!text.contains("SKILLS"));
        assert!(!text.contains("Rust"));
    }

    #[test]
    fn test_toggle_enable_is_noop() {
        let (text, warnings) = run(CustomizationOp::ToggleSection {
            id: "skills".into(),
            enabled: true,
        });
        assert_eq!(text, SOURCE);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_toggle_start_marker_runs_to_next_section() {
        let (text, _) = run(CustomizationOp::ToggleSection {
            id: "projects".into(),
            enabled: false,
        });
        assert!(!text.contains("Projects"));
        assert!(text.contains("%--END SKILLS--%\n\\section{Awards}\nB\n"));
    }

    #[test]
    fn test_toggle_start_and_end_markers() {
        let (text, _) = run(CustomizationOp::ToggleSection {
            id: "awards".into(),
            enabled: false,
        });
        assert!(text.ends_with("A\n\\end{document}\n"));
    }

    #[test]
    fn test_missing_end_marker_leaves_text() {
        let (text, warnings) = run(CustomizationOp::ToggleSection {
            id: "projects-fenced".into(),
            enabled: false,
        });
        assert_eq!(text, SOURCE);
        assert_eq!(
            warnings,
            vec![RenderWarning::SectionSkipped {
                section: "projects-fenced".into(),
                reason: "end marker not found".into(),
            }]
        );
    }

    #[test]
    fn test_unknown_section_warns() {
        let (_, warnings) = run(CustomizationOp::ToggleSection {
            id: "hobbies".into(),
            enabled: false,
        });
        assert!(matches!(warnings[0], RenderWarning::SectionSkipped { .. }));
    }

    #[test]
    fn test_placeholders_are_escaped_and_unresolved_warn() {
        let mut values = BTreeMap::new();
        values.insert("FULL_NAME".to_string(), "R&D $Lead".to_string());
        values.insert("MISSING".to_string(), "x".to_string());
        let (text, warnings) = run(CustomizationOp::ReplacePlaceholders(values));
        assert!(text.contains("\\name{R\\&D \\$Lead}"));
        assert_eq!(
            warnings,
            vec![RenderWarning::PlaceholderUnresolved {
                name: "MISSING".into()
            }]
        );
    }

    #[test]
    fn test_backslash_placeholder_shape() {
        let config = make_config();
        let mut customizer = Customizer::new("\\PLACEHOLDERNAME, hi".to_string(), &config);
        let mut values = BTreeMap::new();
        values.insert("PLACEHOLDERNAME".to_string(), "Jane".to_string());
        customizer.apply(&CustomizationOp::ReplacePlaceholders(values));
        assert_eq!(customizer.into_parts().0, "Jane, hi");
    }

    #[test]
    fn test_custom_color_inserted_before_document() {
        let (text, warnings) = run(CustomizationOp::SetCustomColor {
            name: "brand".into(),
            hex: "a1b2c3".into(),
        });
        assert!(warnings.is_empty());
        assert!(text.contains(
            "\\definecolor{brand}{RGB}{161,178,195}\n\\colorlet{brand}{brand}\n\\begin{document}"
        ));
    }

    #[test]
    fn test_bad_custom_colors_are_noops() {
        for hex in ["red", "#12G456", "#1234"] {
            let (text, warnings) = run(CustomizationOp::SetCustomColor {
                name: "brand".into(),
                hex: hex.into(),
            });
            assert_eq!(text, SOURCE);
            assert!(matches!(warnings[0], RenderWarning::CustomColorRejected { .. }));
        }
    }
}
