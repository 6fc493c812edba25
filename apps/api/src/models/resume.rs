//! Structured resume input, as handed to the render core by the resume data layer.
//!
//! The shape is deliberately forgiving: every field is optional, `null` is
//! accepted wherever a collection is expected, and several fields carry the
//! aliases seen in stored and parsed resumes (`fullName` / `name`,
//! `company` / `employer`, ...). Accessors resolve the aliases so adapters
//! never repeat that logic.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    #[serde(deserialize_with = "nullable")]
    pub personal_info: PersonalInfo,
    pub summary: Option<String>,
    pub professional_summary: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub experience: Vec<ExperienceItem>,
    #[serde(deserialize_with = "nullable")]
    pub education: Vec<EducationItem>,
    #[serde(deserialize_with = "nullable")]
    pub skills: Skills,
    #[serde(deserialize_with = "nullable")]
    pub projects: Vec<ProjectItem>,
    #[serde(deserialize_with = "nullable")]
    pub certifications: Vec<CertificationItem>,
    #[serde(deserialize_with = "nullable")]
    pub achievements: Vec<Achievement>,
    #[serde(deserialize_with = "nullable")]
    pub publications: Vec<PublicationItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
    pub nationality: Option<String>,
    pub bio: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceItem {
    pub position: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub employer: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub start: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub end: Option<String>,
    pub current: Option<bool>,
    pub responsibilities: Option<Lines>,
    pub description: Option<Lines>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationItem {
    pub degree: Option<String>,
    pub field: Option<String>,
    pub major: Option<String>,
    pub institution: Option<String>,
    pub school: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub graduation_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub gpa: Option<String>,
    pub honors: Option<String>,
    pub thesis: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Skills {
    #[serde(deserialize_with = "nullable")]
    pub technical: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub soft: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub languages: Vec<Language>,
    #[serde(deserialize_with = "nullable")]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectItem {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub technologies: Vec<String>,
    pub link: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationItem {
    pub name: Option<String>,
    pub issuer: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub issue_date: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationItem {
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub year: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    pub publisher: Option<String>,
}

/// Free text that arrives either as one newline-separated string or as a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lines {
    One(String),
    Many(Vec<LineItem>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineItem {
    Text(String),
    Detailed {
        text: Option<String>,
        description: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Language {
    Name(String),
    Detailed {
        name: Option<String>,
        language: Option<String>,
        proficiency: Option<Proficiency>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Proficiency {
    Level(f64),
    Label(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Achievement {
    Text(String),
    Detailed {
        title: Option<String>,
        name: Option<String>,
        description: Option<String>,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Alias resolution
// ────────────────────────────────────────────────────────────────────────────

/// Returns the trimmed value if present and non-blank.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn first_of<'a>(a: &'a Option<String>, b: &'a Option<String>) -> Option<&'a str> {
    non_empty(a).or_else(|| non_empty(b))
}

impl ResumeData {
    pub fn summary_text(&self) -> Option<&str> {
        first_of(&self.summary, &self.professional_summary)
    }

    /// The first sentence of the summary, used by families that show a one-line tagline.
    pub fn summary_first_sentence(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .and_then(|s| s.split('.').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl PersonalInfo {
    pub fn display_name(&self) -> Option<&str> {
        first_of(&self.full_name, &self.name)
    }

    /// Splits the display name into a first token and the remainder.
    pub fn name_parts(&self) -> (Option<&str>, Option<&str>) {
        match self.display_name() {
            Some(name) => match name.split_once(' ') {
                Some((first, rest)) => (Some(first), Some(rest.trim()).filter(|r| !r.is_empty())),
                None => (Some(name), None),
            },
            None => (None, None),
        }
    }

    /// LinkedIn handle with the profile URL prefix stripped.
    pub fn linkedin_handle(&self) -> Option<String> {
        non_empty(&self.linkedin).map(|url| {
            strip_profile_prefix(url, &["linkedin.com/in/", "linkedin.com/in"])
        })
    }

    /// GitHub handle with the profile URL prefix stripped.
    pub fn github_handle(&self) -> Option<String> {
        non_empty(&self.github).map(|url| strip_profile_prefix(url, &["github.com/"]))
    }
}

fn strip_profile_prefix(url: &str, hosts: &[&str]) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    let handle = hosts
        .iter()
        .find_map(|host| without_www.strip_prefix(host))
        .unwrap_or(url);
    handle.trim_end_matches('/').to_string()
}

impl ExperienceItem {
    pub fn position(&self) -> Option<&str> {
        first_of(&self.position, &self.title)
    }

    pub fn company(&self) -> Option<&str> {
        first_of(&self.company, &self.employer)
    }

    pub fn start(&self) -> Option<&str> {
        first_of(&self.start_date, &self.start)
    }

    /// End date, or `fallback` when the role has no end date recorded.
    pub fn end_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        first_of(&self.end_date, &self.end).unwrap_or(fallback)
    }

    pub fn responsibilities(&self) -> Vec<String> {
        self.responsibilities
            .as_ref()
            .or(self.description.as_ref())
            .map(Lines::to_vec)
            .unwrap_or_default()
    }
}

impl Lines {
    /// Non-blank lines, in order.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Lines::One(text) => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            Lines::Many(items) => items
                .iter()
                .filter_map(|item| match item {
                    LineItem::Text(t) => Some(t.trim()),
                    LineItem::Detailed { text, description } => first_of(text, description),
                })
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl EducationItem {
    pub fn degree(&self) -> Option<&str> {
        first_of(&self.degree, &self.field)
    }

    pub fn field(&self) -> Option<&str> {
        first_of(&self.field, &self.major)
    }

    pub fn institution(&self) -> Option<&str> {
        first_of(&self.institution, &self.school)
    }

    pub fn date(&self) -> Option<&str> {
        first_of(&self.graduation_date, &self.date).or_else(|| non_empty(&self.end_date))
    }
}

impl Language {
    pub fn name(&self) -> Option<&str> {
        match self {
            Language::Name(name) => Some(name.trim()).filter(|n| !n.is_empty()),
            Language::Detailed { name, language, .. } => first_of(name, language),
        }
    }

    /// Numeric level clamped to 1..=5; defaults to 5 when absent or textual.
    pub fn level(&self) -> u8 {
        match self {
            Language::Detailed {
                proficiency: Some(Proficiency::Level(level)),
                ..
            } => level.round().clamp(1.0, 5.0) as u8,
            _ => 5,
        }
    }

    /// Textual proficiency label (e.g. "C2"), if one was given.
    pub fn label(&self) -> Option<String> {
        match self {
            Language::Detailed {
                proficiency: Some(Proficiency::Label(label)),
                ..
            } => Some(label.clone()),
            Language::Detailed {
                proficiency: Some(Proficiency::Level(level)),
                ..
            } => Some(level.to_string()),
            _ => None,
        }
    }
}

impl Achievement {
    pub fn title(&self) -> Option<&str> {
        match self {
            Achievement::Text(text) => Some(text.trim()).filter(|t| !t.is_empty()),
            Achievement::Detailed { title, name, .. } => first_of(title, name),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Achievement::Text(_) => None,
            Achievement::Detailed { description, .. } => non_empty(description),
        }
    }
}

impl CertificationItem {
    pub fn date(&self) -> Option<&str> {
        first_of(&self.date, &self.issue_date)
    }
}

impl PublicationItem {
    pub fn year(&self) -> Option<&str> {
        first_of(&self.year, &self.date)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient deserializers
// ────────────────────────────────────────────────────────────────────────────

/// Treats an explicit JSON `null` like an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts strings, numbers, and booleans (e.g. `"gpa": 3.8`, `"year": 2020`).
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_document_deserializes() {
        let data: ResumeData = serde_json::from_value(json!({
            "personalInfo": { "fullName": "Jane Doe" },
            "experience": [],
            "education": [],
            "skills": { "technical": [] }
        }))
        .unwrap();
        assert_eq!(data.personal_info.display_name(), Some("Jane Doe"));
        assert!(data.experience.is_empty());
        assert!(data.skills.technical.is_empty());
    }

    #[test]
    fn test_uploaded_image_references_are_ignored() {
        let data: ResumeData = serde_json::from_value(json!({
            "personalInfo": { "fullName": "Jane Doe" },
            "images": { "profilePhoto": "uploads/jane.png", "companyLogos": ["acme.png"] }
        }))
        .unwrap();
        assert_eq!(data.personal_info.display_name(), Some("Jane Doe"));
    }

    #[test]
    fn test_nulls_are_treated_as_absent() {
        let data: ResumeData = serde_json::from_value(json!({
            "personalInfo": null,
            "experience": null,
            "skills": { "technical": null }
        }))
        .unwrap();
        assert!(data.personal_info.display_name().is_none());
        assert!(data.experience.is_empty());
    }

    #[test]
    fn test_aliases_resolve() {
        let item: ExperienceItem = serde_json::from_value(json!({
            "title": "Engineer",
            "employer": "Acme",
            "start": "2020",
            "description": "Built things\n\nShipped things"
        }))
        .unwrap();
        assert_eq!(item.position(), Some("Engineer"));
        assert_eq!(item.company(), Some("Acme"));
        assert_eq!(item.start(), Some("2020"));
        assert_eq!(item.end_or("Present"), "Present");
        assert_eq!(item.responsibilities(), vec!["Built things", "Shipped things"]);
    }

    #[test]
    fn test_numeric_fields_become_strings() {
        let edu: EducationItem = serde_json::from_value(json!({
            "school": "MIT",
            "gpa": 3.9,
            "graduationDate": 2019
        }))
        .unwrap();
        assert_eq!(edu.gpa.as_deref(), Some("3.9"));
        assert_eq!(edu.date(), Some("2019"));
        assert_eq!(edu.institution(), Some("MIT"));
    }

    #[test]
    fn test_profile_handles_are_stripped() {
        let info = PersonalInfo {
            linkedin: Some("https://www.linkedin.com/in/jane-doe/".to_string()),
            github: Some("http://github.com/janedoe".to_string()),
            ..Default::default()
        };
        assert_eq!(info.linkedin_handle().as_deref(), Some("jane-doe"));
        assert_eq!(info.github_handle().as_deref(), Some("janedoe"));
    }

    #[test]
    fn test_name_parts_split_on_first_space() {
        let info = PersonalInfo {
            full_name: Some("Mary Ann Smith".to_string()),
            ..Default::default()
        };
        assert_eq!(info.name_parts(), (Some("Mary"), Some("Ann Smith")));
    }

    #[test]
    fn test_language_levels_are_clamped() {
        let langs: Vec<Language> = serde_json::from_value(json!([
            "English",
            { "name": "French", "proficiency": 9 },
            { "language": "German", "proficiency": "B2" }
        ]))
        .unwrap();
        assert_eq!(langs[0].level(), 5);
        assert_eq!(langs[1].level(), 5);
        assert_eq!(langs[1].name(), Some("French"));
        assert_eq!(langs[2].name(), Some("German"));
        assert_eq!(langs[2].label().as_deref(), Some("B2"));
    }
}
