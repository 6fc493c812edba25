//! MAltaCV: the AltaCV dialect plus a second pass over bare tokens the
//! two-column variant uses in places AltaCV leaves untouched.

use crate::models::resume::{non_empty, ResumeData};
use crate::templates::config::Engine;

use super::alta::populate_alta;
use super::escape::escape_latex;
use super::markup::replace_token;
use super::{FamilyAdapter, Populated};

pub struct MAltaCv;

impl FamilyAdapter for MAltaCv {
    fn family(&self) -> &'static str {
        "maltacv"
    }

    fn preferred_engine(&self) -> Engine {
        Engine::Xelatex
    }

    fn populate(&self, data: &ResumeData, raw: &str) -> Populated {
        let mut text = populate_alta(data, raw);
        let info = &data.personal_info;
        let (first, last) = info.name_parts();

        let leftovers = [
            ("FULL_NAME", info.display_name().map(str::to_string)),
            ("FIRST_NAME", first.map(str::to_string)),
            ("LAST_NAME", last.map(str::to_string)),
            ("EMAIL", non_empty(&info.email).map(str::to_string)),
            ("PHONE_NUMBER", non_empty(&info.phone).map(str::to_string)),
            ("LINKEDIN_USERNAME", info.linkedin_handle()),
            ("GITHUB_USERNAME", info.github_handle()),
            (
                "TAGLINE",
                non_empty(&data.summary)
                    .or_else(|| non_empty(&info.title))
                    .map(str::to_string),
            ),
            (
                "BIO_TEXT",
                non_empty(&data.summary)
                    .or_else(|| non_empty(&info.bio))
                    .map(str::to_string),
            ),
        ];
        for (token, value) in leftovers {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                text = replace_token(&text, token, &escape_latex(&value));
            }
        }
        Populated::source(text)
    }
}
