//! Fallback for templates without a dedicated adapter: common header tokens only.

use crate::models::resume::{non_empty, ResumeData};

use super::escape::{esc, escape_latex, escape_url};
use super::markup::{replace_token, set_command_arg};
use super::{FamilyAdapter, Populated};

pub struct Generic;

impl FamilyAdapter for Generic {
    fn family(&self) -> &'static str {
        "generic"
    }

    fn populate(&self, data: &ResumeData, raw: &str) -> Populated {
        let info = &data.personal_info;
        let name = esc(info.display_name());
        let email = esc(non_empty(&info.email));
        let phone = esc(non_empty(&info.phone));
        let location = esc(non_empty(&info.location));
        let summary = esc(data.summary_text());

        let mut text = raw.to_string();
        for (field, value) in [
            ("{{name}}", &name),
            ("{{email}}", &email),
            ("{{phone}}", &phone),
            ("{{location}}", &location),
            ("{{summary}}", &summary),
        ] {
            text = text.replace(field, value);
        }

        for (token, value) in [
            ("FULL_NAME", &name),
            ("EMAIL", &email),
            ("PHONE", &phone),
            ("PHONE_NUMBER", &phone),
            ("LOCATION", &location),
            ("SUMMARY", &summary),
        ] {
            text = replace_token(&text, token, value);
        }

        for (cmd, value) in [
            ("name", &name),
            ("email", &email),
            ("phone", &phone),
            ("location", &location),
        ] {
            text = set_command_arg(&text, cmd, value);
        }

        if let Some(handle) = info.linkedin_handle() {
            let handle = escape_latex(&handle);
            text = replace_token(&text, "LINKEDIN_USERNAME", &handle);
            text = set_command_arg(&text, "linkedin", &handle);
        }
        if let Some(handle) = info.github_handle() {
            let handle = escape_latex(&handle);
            text = replace_token(&text, "GITHUB_USERNAME", &handle);
            text = set_command_arg(&text, "github", &handle);
        }
        if let Some(site) = non_empty(&info.website) {
            let site = escape_url(site);
            text = replace_token(&text, "HOMEPAGE_URL", &site);
            text = set_command_arg(&text, "homepage", &site);
        }

        Populated::source(text)
    }
}
