//! SixtySecondsCV: header macros (`\cvname{}`, `\cvmail{}`, ...) and bare tokens.

use crate::models::resume::{non_empty, ResumeData};
use crate::templates::config::Engine;

use super::escape::{escape_latex, escape_url};
use super::markup::{replace_token, set_command_arg};
use super::{FamilyAdapter, Populated};

pub struct SixtySecondsCv;

impl FamilyAdapter for SixtySecondsCv {
    fn family(&self) -> &'static str {
        "sixty"
    }

    fn preferred_engine(&self) -> Engine {
        Engine::Xelatex
    }

    fn populate(&self, data: &ResumeData, raw: &str) -> Populated {
        let info = &data.personal_info;

        let name = escape_latex(info.display_name().unwrap_or("Your Name"));
        let mut text = set_command_arg(raw, "cvname", &name);
        text = replace_token(&text, "FULL_NAME", &name);

        let job_title = escape_latex(
            non_empty(&info.title)
                .or_else(|| data.summary_first_sentence())
                .unwrap_or("Professional"),
        );
        text = set_command_arg(&text, "cvjobtitle", &job_title);
        text = replace_token(&text, "JOB_TITLE", &job_title);

        for (cmd, token, value) in [
            ("cvmail", "EMAIL", &info.email),
            ("cvphone", "PHONE_NUMBER", &info.phone),
            ("cvaddress", "ADDRESS", &info.location),
        ] {
            if let Some(v) = non_empty(value) {
                let v = escape_latex(v);
                text = set_command_arg(&text, cmd, &v);
                text = replace_token(&text, token, &v);
            }
        }

        if let Some(site) = non_empty(&info.website) {
            let site = escape_url(site);
            text = set_command_arg(&text, "cvsite", &site);
            text = replace_token(&text, "WEBSITE_URL", &site);
        }
        if let (Some(url), Some(handle)) = (non_empty(&info.github), info.github_handle()) {
            text = replace_token(&text, "GITHUB_URL", &escape_url(url));
            text = replace_token(&text, "GITHUB_TEXT", &escape_latex(&handle));
        }
        if let (Some(url), Some(handle)) = (non_empty(&info.linkedin), info.linkedin_handle()) {
            text = replace_token(&text, "LINKEDIN_URL", &escape_url(url));
            text = replace_token(&text, "LINKEDIN_TEXT", &escape_latex(&handle));
        }

        Populated::source(text)
    }
}
