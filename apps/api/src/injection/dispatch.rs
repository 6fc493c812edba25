//! Ordered family table: the first predicate matching the template id or
//! display name selects the adapter; the generic adapter catches the rest.

use super::alta::AltaCv;
use super::curve::CurveCv;
use super::cv_template::CvTemplate;
use super::generic::Generic;
use super::hipster::SimpleHipsterCv;
use super::maltacv::MAltaCv;
use super::resume_template::ResumeTemplate;
use super::sixty::SixtySecondsCv;
use super::FamilyAdapter;

#[derive(Debug, Clone, Copy)]
pub struct TemplateIdentity<'a> {
    pub template_id: &'a str,
    pub name: &'a str,
}

pub struct Family {
    pub name: &'static str,
    /// Tested against each lower-cased identity string in turn.
    pub matches: fn(&str) -> bool,
    pub adapter: &'static dyn FamilyAdapter,
}

static FAMILIES: &[Family] = &[
    Family {
        name: "curve",
        matches: |s| s.contains("curve"),
        adapter: &CurveCv,
    },
    Family {
        name: "maltacv",
        matches: |s| s.contains("maltacv"),
        adapter: &MAltaCv,
    },
    Family {
        name: "alta",
        matches: |s| s.contains("alta"),
        adapter: &AltaCv,
    },
    Family {
        name: "hipster",
        matches: |s| s.contains("hipster") || s.contains("simple"),
        adapter: &SimpleHipsterCv,
    },
    Family {
        name: "sixty",
        matches: |s| s.contains("sixty"),
        adapter: &SixtySecondsCv,
    },
    // Generic layouts only match on the exact phrase or slug.
    Family {
        name: "resume-template",
        matches: |s| s.contains("resume template") || s.contains("resume-template"),
        adapter: &ResumeTemplate,
    },
    Family {
        name: "cv-template",
        matches: |s| s.contains("cv template") || s.contains("cv-template"),
        adapter: &CvTemplate,
    },
];

static GENERIC: Generic = Generic;

/// The dispatch table in precedence order (excluding the generic fallback).
pub fn families() -> &'static [Family] {
    FAMILIES
}

/// Returns the adapter and whether the generic fallback was used.
pub fn select_adapter(identity: TemplateIdentity<'_>) -> (&'static dyn FamilyAdapter, bool) {
    let id = identity.template_id.to_lowercase();
    let name = identity.name.to_lowercase();
    FAMILIES
        .iter()
        .find(|family| (family.matches)(&id) || (family.matches)(&name))
        .map(|family| (family.adapter, false))
        .unwrap_or((&GENERIC as &dyn FamilyAdapter, true))
}
