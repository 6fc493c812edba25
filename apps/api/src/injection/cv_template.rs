//! "CV Template" family: values live in `\newcommand{\macro}{...}` definitions,
//! with up to three numbered work and education slots.

use crate::models::resume::{non_empty, ResumeData};

use super::escape::{esc, escape_latex, escape_url};
use super::markup::set_command_arg;
use super::{FamilyAdapter, Populated};

pub struct CvTemplate;

const SLOTS: [&str; 3] = ["One", "Two", "Three"];

/// Rewrites the body of `\newcommand{\macro}{...}`.
fn define(text: &str, macro_name: &str, value: &str) -> String {
    set_command_arg(text, &format!("newcommand{{\\{macro_name}}}"), value)
}

impl FamilyAdapter for CvTemplate {
    fn family(&self) -> &'static str {
        "cv-template"
    }

    fn populate(&self, data: &ResumeData, raw: &str) -> Populated {
        let info = &data.personal_info;
        let mut text = define(raw, "name", &escape_latex(info.display_name().unwrap_or("Your Name")));
        if let Some(email) = non_empty(&info.email) {
            text = define(&text, "email", &escape_latex(email));
        }
        if let Some(phone) = non_empty(&info.phone) {
            text = define(&text, "phone", &escape_latex(phone));
        }
        if let Some(site) = non_empty(&info.website) {
            text = define(&text, "website", &escape_url(site));
        }

        for (slot, exp) in SLOTS.iter().zip(&data.experience) {
            let end = exp.end_or(if exp.current == Some(true) { "Present" } else { "" });
            let description = exp
                .responsibilities()
                .iter()
                .take(3)
                .map(|r| escape_latex(r))
                .collect::<Vec<_>>()
                .join(". ");
            text = define(&text, &format!("work{slot}Title"), &esc(exp.company()));
            text = define(
                &text,
                &format!("work{slot}Dates"),
                &format!("{} - {}", esc(exp.start()), escape_latex(end)),
            );
            text = define(&text, &format!("work{slot}Position"), &esc(exp.position()));
            text = define(&text, &format!("work{slot}Description"), &description);
        }

        for (slot, edu) in SLOTS.iter().zip(&data.education) {
            text = define(&text, &format!("edu{slot}Title"), &esc(edu.degree()));
            text = define(&text, &format!("edu{slot}Dates"), &esc(edu.date()));
            text = define(&text, &format!("edu{slot}School"), &esc(edu.institution()));
            if let Some(field) = edu.field() {
                text = define(&text, &format!("edu{slot}Description"), &escape_latex(field));
            }
        }

        Populated::source(text)
    }
}
