//! Simple Hipster CV: every slot is a `\PLACEHOLDER…` control word in the source.

use crate::models::resume::{non_empty, ResumeData};

use super::escape::{esc, escape_latex};
use super::markup::replace_command;
use super::{FamilyAdapter, Populated};

pub struct SimpleHipsterCv;

const MAX_EVENTS: usize = 5;
const MAX_DEGREES: usize = 3;
const MAX_BARS: usize = 5;
const MAX_CERTIFICATES: usize = 5;
const MAX_LANGUAGES: usize = 4;
const MAX_PUBLICATIONS: usize = 3;
const ROW_BREAK: &str = " \\\\\n    ";

impl FamilyAdapter for SimpleHipsterCv {
    fn family(&self) -> &'static str {
        "hipster"
    }

    fn populate(&self, data: &ResumeData, raw: &str) -> Populated {
        let info = &data.personal_info;
        let (first, last) = info.name_parts();
        let title = non_empty(&info.title)
            .or_else(|| data.summary_first_sentence())
            .unwrap_or("Professional");
        let about = data
            .summary_text()
            .or_else(|| non_empty(&info.bio))
            .unwrap_or("Professional with expertise in multiple domains.");

        let events = experience_events(data);
        let curriculum = if events.is_empty() {
            String::new()
        } else {
            format!(
                "\\section*{{Curriculum}}\n\\begin{{tabular}}{{r| p{{0.5\\textwidth}} c}}\n    {events}\n\\end{{tabular}}"
            )
        };

        let slots: [(&str, String); 16] = [
            ("PLACEHOLDERFIRSTNAME", escape_latex(first.unwrap_or("Your"))),
            ("PLACEHOLDERLASTNAME", escape_latex(last.unwrap_or("Name"))),
            ("PLACEHOLDERTITLE", escape_latex(title)),
            ("PLACEHOLDERABOUTME", escape_latex(about)),
            ("PLACEHOLDERPERSONALINFO", personal_info(data)),
            ("PLACEHOLDERSPECIALIZATION", specialization(data)),
            ("PLACEHOLDERINTERESTS", interests(data)),
            ("PLACEHOLDERCONTACTBUBBLES", contact_bubbles(data)),
            ("PLACEHOLDEREXPERIENCE", or_comment(events, "% No experience provided")),
            ("PLACEHOLDEREDUCATION", or_comment(degrees(data), "% No education provided")),
            ("PLACEHOLDERPROGRAMMING", or_comment(skill_bars(data), "     % No programming skills provided")),
            ("PLACEHOLDERCURRICULUM", curriculum),
            ("PLACEHOLDERCERTIFICATES", certificates(data)),
            ("PLACEHOLDERLANGUAGES", or_comment(languages(data), "% No languages provided")),
            ("PLACEHOLDERPUBS", publications(data)),
            ("PLACEHOLDERFOOTER", or_comment(footer(data), "% No footer info provided")),
        ];

        let source = slots
            .iter()
            .fold(raw.to_string(), |text, (slot, value)| replace_command(&text, slot, value));
        Populated::source(source)
    }
}

fn or_comment(content: String, comment: &str) -> String {
    if content.is_empty() {
        comment.to_string()
    } else {
        content
    }
}

fn personal_info(data: &ResumeData) -> String {
    let info = &data.personal_info;
    let mut lines = vec![escape_latex(info.display_name().unwrap_or("Your Name"))];
    for (label, value) in [
        ("email", &info.email),
        ("phone", &info.phone),
        ("location", &info.location),
        ("nationality", &info.nationality),
    ] {
        if let Some(v) = non_empty(value) {
            lines.push(format!("{label}: {}", escape_latex(v)));
        }
    }
    lines.join("\n\n")
}

fn specialization(data: &ResumeData) -> String {
    data.skills
        .technical
        .iter()
        .map(|s| escape_latex(s))
        .collect::<Vec<_>>()
        .join(" ~•~ ")
}

fn interests(data: &ResumeData) -> String {
    let listed = if data.skills.interests.is_empty() {
        &data.personal_info.interests
    } else {
        &data.skills.interests
    };
    let interests = escape_latex(&listed.join(", "));
    let tech = data
        .skills
        .technical
        .iter()
        .take(6)
        .map(|s| format!("\\texttt{{{}}}", escape_latex(s)))
        .collect::<Vec<_>>()
        .join(" ~/~ ");

    match (interests.is_empty(), tech.is_empty()) {
        (false, false) => {
            format!("{interests}\n\n\\bg{{cvgreen}}{{white}}{{Interests}}\\\\[0.5em]\n\n{tech}")
        }
        (false, true) => interests,
        _ => tech,
    }
}

fn contact_bubbles(data: &ResumeData) -> String {
    let info = &data.personal_info;
    let bubbles: Vec<String> = [
        ("\\faAt", non_empty(&info.email).map(str::to_string)),
        ("\\faLinkedin", info.linkedin_handle()),
        ("\\faGithub", info.github_handle()),
        ("\\faGlobe", non_empty(&info.website).map(str::to_string)),
    ]
    .into_iter()
    .filter_map(|(icon, value)| {
        value.map(|v| format!("\\infobubble{{{icon}}}{{cvgreen}}{{white}}{{{}}}", escape_latex(&v)))
    })
    .collect();

    if bubbles.is_empty() {
        "% No contact bubbles provided".to_string()
    } else {
        bubbles.join("\n")
    }
}

fn experience_events(data: &ResumeData) -> String {
    data.experience
        .iter()
        .take(MAX_EVENTS)
        .map(|exp| {
            let description = exp
                .responsibilities()
                .iter()
                .take(2)
                .map(|r| escape_latex(r))
                .collect::<Vec<_>>()
                .join(". ");
            format!(
                "\\cvevent{{{}--{}}}{{{}}}{{{}}}{{{} \\color{{cvred}}}}{{{description}}}{{}}",
                esc(exp.start()),
                escape_latex(exp.end_or("Present")),
                esc(exp.position()),
                esc(exp.company()),
                esc(non_empty(&exp.location)),
            )
        })
        .collect::<Vec<_>>()
        .join(ROW_BREAK)
}

fn degrees(data: &ResumeData) -> String {
    data.education
        .iter()
        .take(MAX_DEGREES)
        .map(|edu| {
            let field = edu
                .field()
                .map(|f| format!(" {}", escape_latex(f)))
                .unwrap_or_default();
            format!(
                "\\cvdegree{{{}}}{{{}}}{{{}}}{{{}{field} \\color{{headerblue}}}}{{}}{{}}",
                esc(edu.date()),
                esc(edu.degree()),
                escape_latex(non_empty(&edu.level).unwrap_or("Degree")),
                esc(edu.institution()),
            )
        })
        .collect::<Vec<_>>()
        .join(ROW_BREAK)
}

fn skill_bars(data: &ResumeData) -> String {
    data.skills
        .technical
        .iter()
        .take(MAX_BARS)
        .enumerate()
        .map(|(i, skill)| {
            let level = 0.4 + i as f64 * 0.1;
            format!(
                "     \\bg{{skilllabelcolour}}{{iconcolour}}{{{}}} &  \\barrule{{{level:.2}}}{{0.5em}}{{cvpurple}}",
                escape_latex(skill)
            )
        })
        .collect::<Vec<_>>()
        .join(" \\\\\n")
}

fn certificates(data: &ResumeData) -> String {
    let rows: Vec<String> = data
        .certifications
        .iter()
        .take(MAX_CERTIFICATES)
        .filter_map(|cert| {
            non_empty(&cert.name)
                .map(|name| format!("    {} & {} \\\\\n", esc(cert.date()), escape_latex(name)))
        })
        .collect();
    if rows.is_empty() {
        return String::new();
    }
    format!(
        "\\section*{{Certificates \\& Grants}}\n\\begin{{tabular}}{{>{{\\footnotesize\\bfseries}}r >{{\\footnotesize}}p{{0.55\\textwidth}}}}\n{}\\end{{tabular}}",
        rows.concat()
    )
}

fn languages(data: &ResumeData) -> String {
    data.skills
        .languages
        .iter()
        .take(MAX_LANGUAGES)
        .filter_map(|lang| lang.name().map(|name| (name, lang.label())))
        .enumerate()
        .map(|(i, (name, label))| {
            format!(
                "\\textbf{{{}}} & {} & {{\\phantom{{x}}\\footnotesize {}}}",
                escape_latex(name),
                escape_latex(label.as_deref().unwrap_or("C2")),
                if i == 0 { "fluent" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join(" \\\\\n")
}

fn publications(data: &ResumeData) -> String {
    let rows: Vec<String> = data
        .publications
        .iter()
        .take(MAX_PUBLICATIONS)
        .filter_map(|publication| {
            let title = non_empty(&publication.title)?;
            let publisher = non_empty(&publication.publisher)
                .map(|p| format!(", {}", escape_latex(p)))
                .unwrap_or_default();
            Some(format!(
                "    {} & \\emph{{{}}}{publisher}. \\\\\n",
                esc(publication.year()),
                escape_latex(title)
            ))
        })
        .collect();
    if rows.is_empty() {
        return String::new();
    }
    format!(
        "\\section*{{Publications}}\n\\begin{{tabular}}{{>{{\\footnotesize\\bfseries}}r >{{\\footnotesize}}p{{0.7\\textwidth}}}}\n{}\\end{{tabular}}",
        rows.concat()
    )
}

fn footer(data: &ResumeData) -> String {
    let info = &data.personal_info;
    let mut footer = esc(info.display_name());
    if let Some(location) = non_empty(&info.location) {
        footer.push_str(&format!(" \\icon{{\\faMapMarker}}{{cvgreen}}{{}} {}", escape_latex(location)));
    }
    if let Some(phone) = non_empty(&info.phone) {
        footer.push_str(&format!(" \\icon{{\\faPhone}}{{cvgreen}}{{}} {}", escape_latex(phone)));
    }
    if let Some(email) = non_empty(&info.email) {
        footer.push_str(&format!(
            " \\newline\\icon{{\\faAt}}{{cvgreen}}{{}} \\protect\\url{{{}}}",
            escape_latex(email)
        ));
    }
    footer.trim_start().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injection::fixtures::make_resume;

    const HEADER: &str = "\\PLACEHOLDERFIRSTNAME{} \\PLACEHOLDERLASTNAME\n\\PLACEHOLDERTITLE\n";

    #[test]
    fn test_header_slots() {
        let out = SimpleHipsterCv.populate(&make_resume(), HEADER).source;
        assert_eq!(out, "Jane{} Doe\nSenior Engineer\n");
    }

    #[test]
    fn test_defaults_for_empty_resume() {
        let out = SimpleHipsterCv.populate(&ResumeData::default(), HEADER).source;
        assert_eq!(out, "Your{} Name\nProfessional\n");
    }

    #[test]
    fn test_experience_rows() {
        let out = SimpleHipsterCv
            .populate(&make_resume(), "\\PLACEHOLDEREXPERIENCE")
            .source;
        assert_eq!(
            out,
            "\\cvevent{2020--2023}{Engineer}{Acme \\& Co}{Remote \\color{cvred}}{Cut latency by 50\\%. Led team\\_of\\_4}{}"
        );
    }

    #[test]
    fn test_missing_sections_become_comments() {
        let raw = "\\PLACEHOLDEREXPERIENCE\n\\PLACEHOLDEREDUCATION\n\\PLACEHOLDERCONTACTBUBBLES\n\\PLACEHOLDERCURRICULUM|";
        let out = SimpleHipsterCv.populate(&ResumeData::default(), raw).source;
        assert_eq!(
            out,
            "% No experience provided\n% No education provided\n% No contact bubbles provided\n|"
        );
    }

    #[test]
    fn test_skill_bars_and_specialization() {
        let data = make_resume();
        assert_eq!(specialization(&data), "Rust ~•~ C\\# ~•~ Go");
        let bars = skill_bars(&data);
        assert!(bars.contains("\\barrule{0.40}{0.5em}{cvpurple}"));
        assert!(bars.contains("\\barrule{0.60}{0.5em}{cvpurple}"));
        assert_eq!(bars.matches("\\\\\n").count(), 2);
    }

    #[test]
    fn test_contact_bubbles_use_handles() {
        let bubbles = contact_bubbles(&make_resume());
        assert!(bubbles.contains("\\infobubble{\\faLinkedin}{cvgreen}{white}{janedoe}"));
        assert!(bubbles.contains("\\infobubble{\\faAt}{cvgreen}{white}{jane@example.com}"));
    }

    #[test]
    fn test_languages_use_labels() {
        let langs = languages(&make_resume());
        assert!(langs.starts_with("\\textbf{English} & C2 & {\\phantom{x}\\footnotesize fluent}"));
        assert!(langs.contains("\\textbf{German} & 4 &"));
    }
}
