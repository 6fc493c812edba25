//! AltaCV: mixes `\PLACEHOLDER…` slots, bare tokens (`FULL_NAME`,
//! `EXPERIENCE_ITEMS`, ...) and header commands (`\name{}`, `\email{}`, ...).

use crate::models::resume::{non_empty, EducationItem, ResumeData};
use crate::templates::config::Engine;

use super::escape::{esc, escape_latex, escape_url};
use super::markup::{replace_command, replace_token, set_command_arg};
use super::{FamilyAdapter, Populated};

pub struct AltaCv;

const DIVIDER: &str = "\n\\divider\n\n";
const MAX_PROJECTS: usize = 5;
const MAX_ACHIEVEMENTS: usize = 3;
const MAX_TAGS: usize = 10;

impl FamilyAdapter for AltaCv {
    fn family(&self) -> &'static str {
        "alta"
    }

    fn preferred_engine(&self) -> Engine {
        Engine::Xelatex
    }

    fn populate(&self, data: &ResumeData, raw: &str) -> Populated {
        Populated::source(populate_alta(data, raw))
    }
}

pub(super) fn populate_alta(data: &ResumeData, raw: &str) -> String {
    let info = &data.personal_info;
    let mut text = raw.to_string();

    let name = escape_latex(info.display_name().unwrap_or("Your Name Here"));
    let (first, last) = info.name_parts();
    let (first, last) = (esc(first), esc(last));
    text = replace_command(&text, "PLACEHOLDERNAME", &name);
    text = replace_token(&text, "FULL_NAME", &name);
    text = replace_token(&text, "FIRST_NAME", &first);
    text = replace_token(&text, "LAST_NAME", &last);
    text = set_command_arg(&text, "name", &name);
    text = set_command_arg(&text, "firstname", &first);
    text = set_command_arg(&text, "familyname", &last);

    let tagline = escape_latex(
        non_empty(&data.summary)
            .or_else(|| non_empty(&info.title))
            .or_else(|| non_empty(&data.professional_summary))
            .unwrap_or("Your Position or Tagline Here"),
    );
    text = replace_command(&text, "PLACEHOLDERTAGLINE", &tagline);
    text = replace_token(&text, "TAGLINE", &tagline);
    text = set_command_arg(&text, "tagline", &tagline);

    let mut personal = Vec::new();
    for (token, cmd, value) in [
        ("EMAIL", "email", &info.email),
        ("PHONE_NUMBER", "phone", &info.phone),
        ("LOCATION", "location", &info.location),
    ] {
        if let Some(v) = non_empty(value) {
            let v = escape_latex(v);
            text = replace_token(&text, token, &v);
            text = set_command_arg(&text, cmd, &v);
            personal.push(format!("\\{cmd}{{{v}}}"));
        }
    }
    if let Some(site) = non_empty(&info.website) {
        personal.push(format!("\\homepage{{{}}}", escape_url(site)));
    }
    for (token, cmd, handle) in [
        ("LINKEDIN_USERNAME", "linkedin", info.linkedin_handle()),
        ("GITHUB_USERNAME", "github", info.github_handle()),
    ] {
        if let Some(h) = handle {
            let h = escape_latex(&h);
            text = replace_token(&text, token, &h);
            text = set_command_arg(&text, cmd, &h);
            personal.push(format!("\\{cmd}{{{h}}}"));
        }
    }
    let personal = if personal.is_empty() {
        "% No personal info provided".to_string()
    } else {
        personal.join("\n  ")
    };
    text = replace_command(&text, "PLACEHOLDERPERSONALINFO", &personal);

    if let Some(bio) = data
        .summary_text()
        .or_else(|| non_empty(&info.bio))
    {
        let bio = escape_latex(bio);
        text = replace_token(&text, "BIO_TEXT", &bio);
        text = set_command_arg(&text, "bio", &bio);
    }

    let experience = experience_events(data);
    let experience = if experience.is_empty() {
        "% No experience provided".to_string()
    } else {
        experience
    };
    text = replace_command(&text, "PLACEHOLDEREXPERIENCE", &experience);
    text = replace_token(&text, "EXPERIENCE_ITEMS", &experience);

    let projects = project_events(data);
    let (projects_section, projects_list) = if projects.is_empty() {
        (String::new(), "% No projects provided".to_string())
    } else {
        (format!("\\cvsection{{Projects}}\n\n{projects}\n\n"), projects)
    };
    text = replace_token(&text, "ACTIVITIES_PROJECTS_LIST", &projects_list);
    text = replace_command(&text, "PLACEHOLDERPROJECTS", &projects_section);

    text = replace_command(&text, "PLACEHOLDERPUBLICATIONS", &publications_section(data));
    text = replace_command(&text, "PLACEHOLDERPHILOSOPHY", &philosophy_section(data));

    let achievements = achievement_list(data);
    let (proud_section, awards) = if achievements.is_empty() {
        (String::new(), "% No awards provided".to_string())
    } else {
        (
            format!("\\cvsection{{Most Proud of}}\n\n{achievements}\n\n"),
            achievements,
        )
    };
    text = replace_token(&text, "AWARDS_LIST", &awards);
    text = replace_token(&text, "AWARDS_LIST_2", "");
    text = replace_command(&text, "PLACEHOLDERPROUD", &proud_section);

    let tags = skill_tags(data);
    let (strengths, skills_list) = if tags.is_empty() {
        (String::new(), "% No skills provided".to_string())
    } else {
        let flat = data
            .skills
            .technical
            .iter()
            .map(|s| format!("\\cvtag{{{}}}", escape_latex(s)))
            .collect::<Vec<_>>()
            .join("\n");
        (format!("\\cvsection{{Strengths}}\n\n{tags}\n\n"), flat)
    };
    text = replace_token(&text, "SKILLS_LIST", &skills_list);
    text = replace_command(&text, "PLACEHOLDERSTRENGTHS", &strengths);

    let languages = language_skills(data);
    let languages = if languages.is_empty() {
        String::new()
    } else {
        format!("\\cvsection{{Languages}}\n\n{languages}\n\n\\medskip\n\n")
    };
    text = replace_command(&text, "PLACEHOLDERLANGUAGES", &languages);

    let (education_section, column_one, column_two) = if data.education.is_empty() {
        (String::new(), "% No education provided".to_string(), String::new())
    } else {
        let mid = data.education.len().div_ceil(2);
        (
            format!(
                "\\cvsection{{Education}}\n\n{}\n\n",
                education_events(&data.education)
            ),
            education_events(&data.education[..mid]),
            education_events(&data.education[mid..]),
        )
    };
    text = replace_token(&text, "EDUCATION_ITEMS", &column_one);
    text = replace_token(&text, "EDUCATION_ITEMS_2", &column_two);
    text = replace_command(&text, "PLACEHOLDEREDUCATION", &education_section);

    replace_command(&text, "PLACEHOLDERREFEREES", "")
}

fn experience_events(data: &ResumeData) -> String {
    data.experience
        .iter()
        .map(|exp| {
            let mut event = format!(
                "\\cvevent{{{}}}{{{}}}{{{} -- {}}}{{{}}}\n",
                escape_latex(exp.position().unwrap_or("Job Title")),
                escape_latex(exp.company().unwrap_or("Company")),
                esc(exp.start()),
                escape_latex(exp.end_or(if exp.current == Some(true) { "Present" } else { "Ongoing" })),
                esc(non_empty(&exp.location)),
            );
            let items = exp.responsibilities();
            if !items.is_empty() {
                event.push_str("\\begin{itemize}\n");
                for item in items {
                    event.push_str(&format!("\\item {}\n", escape_latex(&item)));
                }
                event.push_str("\\end{itemize}\n");
            }
            event
        })
        .collect::<Vec<_>>()
        .join(DIVIDER)
}

fn project_events(data: &ResumeData) -> String {
    data.projects
        .iter()
        .take(MAX_PROJECTS)
        .filter(|p| non_empty(&p.name).is_some())
        .map(|project| {
            let mut event = format!(
                "\\cvevent{{{}}}{{{}}}{{}}{{}}\n",
                esc(non_empty(&project.name)),
                esc(non_empty(&project.company))
            );
            if let Some(description) = non_empty(&project.description) {
                event.push_str(&escape_latex(description));
                event.push('\n');
            }
            event
        })
        .collect::<Vec<_>>()
        .join(DIVIDER)
}

fn publications_section(data: &ResumeData) -> String {
    let mut section = String::from(
        "% use ONLY \\newpage if you want to force a page break for\n% ONLY the current column\n\\newpage\n\n\\cvsection{Publications}\n\n",
    );
    for publication in &data.publications {
        if let Some(title) = non_empty(&publication.title) {
            section.push_str(&format!(
                "\\cvevent{{{}}}{{{}}}{{{}}}{{}}\n\n",
                escape_latex(title),
                esc(non_empty(&publication.publisher)),
                esc(publication.year())
            ));
        }
    }
    section
}

fn philosophy_section(data: &ResumeData) -> String {
    let quote = data
        .summary_first_sentence()
        .or_else(|| data.achievements.first().and_then(|a| a.title()));
    match quote {
        Some(q) => format!(
            "\\cvsection{{My Life Philosophy}}\n\n\\begin{{quote}}\n``{}''\n\\end{{quote}}\n\n",
            escape_latex(q)
        ),
        None => String::new(),
    }
}

fn achievement_list(data: &ResumeData) -> String {
    data.achievements
        .iter()
        .filter(|a| a.title().is_some())
        .take(MAX_ACHIEVEMENTS)
        .enumerate()
        .map(|(i, achievement)| {
            let icon = if i == 0 { "\\faTrophy" } else { "\\faHeartbeat" };
            format!(
                "\\cvachievement{{{icon}}}{{{}}}{{{}}}\n",
                esc(achievement.title()),
                esc(achievement.description())
            )
        })
        .collect::<Vec<_>>()
        .join(DIVIDER)
}

fn skill_tags(data: &ResumeData) -> String {
    let technical = &data.skills.technical;
    let mut tags: String = technical
        .iter()
        .take(MAX_TAGS)
        .map(|s| format!("\\cvtag{{{}}}\n", escape_latex(s)))
        .collect();
    if technical.len() > MAX_TAGS {
        tags.push_str(&format!(
            "\\cvtag{{{}}}\n",
            escape_latex(&technical[MAX_TAGS..].join(", "))
        ));
    }
    tags
}

fn language_skills(data: &ResumeData) -> String {
    data.skills
        .languages
        .iter()
        .filter_map(|lang| {
            lang.name()
                .map(|name| format!("\\cvskill{{{}}}{{{}}}\n", escape_latex(name), lang.level()))
        })
        .collect::<Vec<_>>()
        .join("\\divider\n")
}

fn education_events(education: &[EducationItem]) -> String {
    education
        .iter()
        .map(|edu| {
            let gpa = non_empty(&edu.gpa)
                .map(|g| format!(", GPA: {}", escape_latex(g)))
                .unwrap_or_default();
            let location = non_empty(&edu.location)
                .map(|l| format!(", {}", escape_latex(l)))
                .unwrap_or_default();
            let mut event = format!(
                "\\cvevent{{{}}}{{{}}}{{{}{gpa}{location}}}{{}}\n",
                esc(edu.degree()),
                esc(edu.institution()),
                esc(edu.date())
            );
            if let Some(detail) = non_empty(&edu.thesis).or_else(|| edu.field()) {
                event.push_str(&escape_latex(detail));
                event.push('\n');
            }
            if let Some(honors) = non_empty(&edu.honors) {
                event.push_str(&escape_latex(honors));
                event.push('\n');
            }
            event
        })
        .collect::<Vec<_>>()
        .join(DIVIDER)
}
