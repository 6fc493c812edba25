// Data Injector: per-family adapters that fill a raw template with resume data.
pub mod alta;
pub mod curve;
pub mod cv_template;
pub mod dispatch;
pub mod escape;
pub mod generic;
pub mod hipster;
pub mod maltacv;
pub mod markup;
pub mod resume_template;
pub mod sixty;

use std::path::Path;

use tracing::{debug, warn};

use crate::errors::{RenderError, RenderWarning};
use crate::models::resume::ResumeData;
use crate::templates::config::Engine;

pub use dispatch::{families, select_adapter, TemplateIdentity};

/// Output of a pure adapter run: the filled main source plus any auxiliary
/// files the family `\input`s.
#[derive(Debug, Clone, Default)]
pub struct Populated {
    pub source: String,
    pub section_files: Vec<(String, String)>,
}

impl Populated {
    pub fn source(source: String) -> Self {
        Self {
            source,
            section_files: Vec::new(),
        }
    }
}

/// One template family's markup dialect.
pub trait FamilyAdapter: Send + Sync {
    fn family(&self) -> &'static str;

    fn preferred_engine(&self) -> Engine {
        Engine::Pdflatex
    }

    fn populate(&self, data: &ResumeData, raw: &str) -> Populated;
}

#[derive(Debug)]
pub struct Injected {
    pub source: String,
    pub family: &'static str,
    pub preferred_engine: Engine,
    pub warning: Option<RenderWarning>,
}

/// Selects the family adapter, populates `raw`, and writes section files into `workspace`.
pub async fn inject(
    identity: TemplateIdentity<'_>,
    data: &ResumeData,
    raw: &str,
    workspace: &Path,
) -> Result<Injected, RenderError> {
    let (adapter, fallback) = select_adapter(identity);
    let warning = fallback.then(|| {
        let w = RenderWarning::InjectorFallbackUsed {
            template_id: identity.template_id.to_string(),
        };
        warn!(template_id = identity.template_id, "{w}");
        w
    });

    let populated = adapter.populate(data, raw);
    for (name, body) in &populated.section_files {
        tokio::fs::write(workspace.join(name), body)
            .await
            .map_err(RenderError::io(format!("writing section file {name}")))?;
    }
    debug!(
        template_id = identity.template_id,
        family = adapter.family(),
        section_files = populated.section_files.len(),
        "Injected resume data"
    );

    Ok(Injected {
        source: populated.source,
        family: adapter.family(),
        preferred_engine: adapter.preferred_engine(),
        warning,
    })
}
