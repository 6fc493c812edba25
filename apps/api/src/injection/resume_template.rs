//! "Resume Template" family: flat bare tokens filled from the first
//! education, experience, and project entries.

use crate::models::resume::{non_empty, ResumeData};

use super::escape::{esc, escape_latex, escape_url};
use super::markup::replace_token;
use super::{FamilyAdapter, Populated};

pub struct ResumeTemplate;

const EXPERIENCE_DATES: &str = "START_MONTH YEAR – END_MONTH YEAR (DURATION)";

impl FamilyAdapter for ResumeTemplate {
    fn family(&self) -> &'static str {
        "resume-template"
    }

    fn populate(&self, data: &ResumeData, raw: &str) -> Populated {
        let info = &data.personal_info;
        let mut text = raw.to_string();

        if let Some(exp) = data.experience.first() {
            let end = exp
                .end_or(if exp.current == Some(true) { "Present" } else { "" })
                .to_string();
            text = text.replace(
                EXPERIENCE_DATES,
                &format!("{} – {}", esc(exp.start()), escape_latex(&end)),
            );
            text = replace_token(&text, "EMPLOYER_NAME", &esc(exp.company()));
            text = replace_token(&text, "DESIGNATION", &esc(exp.position()));
        }

        let mut fields: Vec<(&str, String)> = vec![
            ("FULL_NAME", escape_latex(info.display_name().unwrap_or("Your Name"))),
            (
                "TAGLINE",
                escape_latex(
                    non_empty(&info.title)
                        .or_else(|| data.summary_first_sentence())
                        .unwrap_or("Professional"),
                ),
            ),
            ("EMAIL", esc(non_empty(&info.email))),
            ("PHONE", esc(non_empty(&info.phone))),
            ("ADDRESS", esc(non_empty(&info.location))),
            ("SUMMARY_TEXT", esc(data.summary_text())),
        ];
        for (token, url) in [
            ("PORTFOLIO_URL", &info.website),
            ("GITHUB_URL", &info.github),
            ("LINKEDIN_URL", &info.linkedin),
        ] {
            if let Some(u) = non_empty(url) {
                fields.push((token, escape_url(u)));
            }
        }

        if let Some(edu) = data.education.first() {
            fields.push(("EDUCATION_LEVEL", esc(edu.degree())));
            fields.push(("INSTITUTION", esc(edu.institution())));
            fields.push(("START_YEAR-END_YEAR", year_range(edu.date())));
            fields.push(("MARKS_CGPA", esc(non_empty(&edu.gpa))));
        }

        if !data.skills.technical.is_empty() {
            let list = data
                .skills
                .technical
                .iter()
                .map(|s| escape_latex(s))
                .collect::<Vec<_>>()
                .join(", ");
            fields.push(("SKILLS_CATEGORY", "Technical Skills".to_string()));
            fields.push(("SKILLS_LIST", list));
        }

        if let Some(project) = data.projects.first() {
            let link = non_empty(&project.link).map(escape_url).unwrap_or_default();
            fields.push(("PROJECT_NAME", esc(non_empty(&project.name))));
            fields.push(("PROJECT_DEMO_URL", link.clone()));
            fields.push(("PROJECT_GITHUB_URL", link));
        }

        for (token, value) in &fields {
            text = replace_token(&text, token, value);
        }
        Populated::source(text)
    }
}

/// `2015-2019` stays a range; a single date is shown as-is.
fn year_range(date: Option<&str>) -> String {
    match date {
        Some(d) => match d.split_once('-') {
            Some((start, end)) => format!("{}-{}", escape_latex(start.trim()), escape_latex(end.trim())),
            None => escape_latex(d),
        },
        None => String::new(),
    }
}
