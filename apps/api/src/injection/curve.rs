//! Curve CV: header fields go into the main source, body content into
//! per-rubric files the template `\input`s.

use crate::models::resume::{non_empty, ResumeData};
use crate::templates::config::Engine;

use super::escape::{esc, escape_latex, escape_url};
use super::markup::{comment_out_lines, replace_command};
use super::{FamilyAdapter, Populated};

pub struct CurveCv;

const RUBRICS: [&str; 6] = ["employment", "education", "skills", "publications", "misc", "referee"];

fn rubric_title(section: &str) -> &str {
    match section {
        "employment" => "Employment History",
        "education" => "Education",
        "skills" => "Skills",
        "publications" => "Research Publications",
        "misc" => "Miscellaneous Experience",
        "referee" => "Referees",
        other => other,
    }
}

impl FamilyAdapter for CurveCv {
    fn family(&self) -> &'static str {
        "curve"
    }

    fn preferred_engine(&self) -> Engine {
        Engine::Xelatex
    }

    fn populate(&self, data: &ResumeData, raw: &str) -> Populated {
        let info = &data.personal_info;

        // Bibliography and photo files are never shipped with a render.
        let mut source = comment_out_lines(raw, "\\addbibresource");
        source = comment_out_lines(&source, "\\photo");

        let name = escape_latex(info.display_name().unwrap_or("Your Name"));
        let heading = match non_empty(&info.title) {
            Some(title) => format!("{name}, {}", escape_latex(title)),
            None => name,
        };
        source = replace_command(&source, "PLACEHOLDERNAME", &heading);
        source = replace_command(&source, "PLACEHOLDERCONTACTINFO", &contact_fields(data));

        let section_files = RUBRICS
            .iter()
            .map(|section| (format!("{section}.tex"), section_body(section, data)))
            .collect();

        Populated {
            source,
            section_files,
        }
    }
}

fn contact_fields(data: &ResumeData) -> String {
    let info = &data.personal_info;
    let mut fields = Vec::new();
    if let Some(email) = non_empty(&info.email) {
        let email = escape_latex(email);
        fields.push(format!(
            "\\makefield{{\\faEnvelope[regular]}}{{\\href{{mailto:{email}}}{{\\texttt{{{email}}}}}}}"
        ));
    }
    if let Some(phone) = non_empty(&info.phone) {
        fields.push(format!("\\makefield{{\\faPhone}}{{\\texttt{{{}}}}}", escape_latex(phone)));
    }
    if let (Some(url), Some(handle)) = (non_empty(&info.linkedin), info.linkedin_handle()) {
        fields.push(format!(
            "\\makefield{{\\faLinkedin}}{{\\href{{{}}}{{\\texttt{{{}}}}}}}",
            escape_url(url),
            escape_latex(&handle)
        ));
    }
    if let (Some(url), Some(handle)) = (non_empty(&info.github), info.github_handle()) {
        fields.push(format!(
            "\\makefield{{\\faGithub}}{{\\href{{{}}}{{\\texttt{{{}}}}}}}",
            escape_url(url),
            escape_latex(&handle)
        ));
    }
    if let Some(site) = non_empty(&info.website) {
        fields.push(format!("\\makefield{{\\faGlobe}}{{\\url{{{}}}}}", escape_url(site)));
    }
    if fields.is_empty() {
        return "% No contact info provided".to_string();
    }
    fields.join("\n  ")
}

fn section_body(section: &str, data: &ResumeData) -> String {
    let entries = match section {
        "employment" => employment_entries(data),
        "education" => education_entries(data),
        "skills" => skill_entries(data),
        "publications" => {
            let entries = publication_entries(data);
            if entries.is_empty() {
                return "% No publications provided\n".to_string();
            }
            entries
        }
        _ => String::new(),
    };
    format!(
        "\\begin{{rubric}}{{{}}}\n{entries}\\end{{rubric}}\n",
        rubric_title(section)
    )
}

fn employment_entries(data: &ResumeData) -> String {
    let mut out = String::new();
    for exp in &data.experience {
        let range = format!("{} -- {}", esc(exp.start()), escape_latex(exp.end_or("Present")));
        out.push_str(&format!("\\entry*[{range}]%\n"));
        out.push_str(&format!(
            "\t\\textbf{{{},}} {}.\n",
            esc(exp.position()),
            esc(exp.company())
        ));
        for line in exp.responsibilities() {
            out.push_str(&format!("\t\\par {}\n", escape_latex(&line)));
        }
        out.push_str("%\n");
    }
    out
}

fn education_entries(data: &ResumeData) -> String {
    let mut out = String::new();
    for edu in &data.education {
        let field = edu
            .field()
            .map(|f| format!(" {}", escape_latex(f)))
            .unwrap_or_default();
        out.push_str(&format!("\\entry*[{}]%\n", esc(edu.date())));
        out.push_str(&format!(
            "\t\\textbf{{{},}} {}{field}.\n",
            esc(edu.degree()),
            esc(edu.institution())
        ));
        if let Some(thesis) = non_empty(&edu.thesis) {
            out.push_str(&format!("\t\\par Thesis title: \\emph{{{}}}.\n", escape_latex(thesis)));
        }
        if let Some(gpa) = non_empty(&edu.gpa) {
            out.push_str(&format!("\t\\par GPA: {}.\n", escape_latex(gpa)));
        }
        if let Some(honors) = non_empty(&edu.honors) {
            out.push_str(&format!("\t\\par {}.\n", escape_latex(honors)));
        }
        out.push_str("%\n");
    }
    out
}

fn skill_entries(data: &ResumeData) -> String {
    let skills = &data.skills;
    let mut out = String::new();
    let mut push_list = |label: &str, items: Vec<String>| {
        if !items.is_empty() {
            out.push_str(&format!("\\entry*[{label}]\n\t{}.\n", items.join(", ")));
        }
    };
    push_list(
        "Technical Skills\\hfill",
        skills.technical.iter().map(|s| escape_latex(s)).collect(),
    );
    push_list(
        "Soft Skills\\hfill",
        skills.soft.iter().map(|s| escape_latex(s)).collect(),
    );
    push_list(
        "Languages",
        skills
            .languages
            .iter()
            .filter_map(|l| l.name())
            .map(escape_latex)
            .collect(),
    );
    out
}

fn publication_entries(data: &ResumeData) -> String {
    let mut out = String::new();
    for publication in &data.publications {
        let Some(title) = non_empty(&publication.title) else {
            continue;
        };
        out.push_str(&format!("\\entry*[{}]%\n", esc(publication.year())));
        out.push_str(&format!("\t\\emph{{{}}}", escape_latex(title)));
        if let Some(publisher) = non_empty(&publication.publisher) {
            out.push_str(&format!(", {}", escape_latex(publisher)));
        }
        out.push_str(".\n%\n");
    }
    out
}
