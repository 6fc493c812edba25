//! Render orchestration: config -> workspace -> inject -> customize -> sanitize -> compile.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

use crate::customize::customizer::Customizer;
use crate::errors::{RenderError, RenderWarning};
use crate::injection::{inject, TemplateIdentity};
use crate::models::customization::Customizations;
use crate::models::resume::ResumeData;
use crate::render::assets::{
    FIGURE_VERSIONS_STY, FIGURE_VERSIONS_STY_NAME, PLACEHOLDER_PNG, PLACEHOLDER_PNG_NAME,
};
use crate::render::compiler::DocumentCompiler;
use crate::render::sanitizer::sanitize;
use crate::render::workspace::Workspace;
use crate::templates::config::{Engine, TemplateConfig};
use crate::templates::placeholders::{build_catalog, PlaceholderCatalog};
use crate::templates::registry::{generated_file_name, TemplateRegistry};
use crate::templates::store::TemplateConfigStore;

#[derive(Debug)]
pub struct RenderedDocument {
    pub job_id: Uuid,
    pub pdf: Bytes,
    pub engine: Engine,
    /// Generated `.tex` file name inside the workspace.
    pub file_name: String,
    pub warnings: Vec<RenderWarning>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EngineStatus {
    pub engine: Engine,
    pub available: bool,
}

/// Tunables for `RenderService`.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub temp_root: PathBuf,
    pub cleanup_grace: Duration,
    pub max_concurrent: usize,
}

#[derive(Clone)]
pub struct RenderService {
    store: Arc<TemplateConfigStore>,
    registry: Arc<TemplateRegistry>,
    compiler: Arc<dyn DocumentCompiler>,
    permits: Arc<Semaphore>,
    temp_root: PathBuf,
    cleanup_grace: Duration,
}

impl RenderService {
    pub fn new(
        store: Arc<TemplateConfigStore>,
        registry: Arc<TemplateRegistry>,
        compiler: Arc<dyn DocumentCompiler>,
        settings: RenderSettings,
    ) -> Self {
        Self {
            store,
            registry,
            compiler,
            permits: Arc::new(Semaphore::new(settings.max_concurrent.max(1))),
            temp_root: settings.temp_root,
            cleanup_grace: settings.cleanup_grace,
        }
    }

    /// Renders one document on its own task; dropping the returned future does
    /// not cancel the compile, and the workspace is always scheduled for cleanup.
    pub async fn render(
        &self,
        template_id: String,
        data: ResumeData,
        customizations: Customizations,
    ) -> Result<RenderedDocument, RenderError> {
        let service = self.clone();
        tokio::spawn(async move { service.run_job(&template_id, &data, &customizations).await })
            .await
            .map_err(|e| RenderError::Worker(e.to_string()))?
    }

    async fn run_job(
        &self,
        template_id: &str,
        data: &ResumeData,
        customizations: &Customizations,
    ) -> Result<RenderedDocument, RenderError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| RenderError::Worker(e.to_string()))?;

        let job_id = Uuid::new_v4();
        let (config, main_path) = self.resolve_template(template_id).await?;

        let workspace = Workspace::create(&self.temp_root, job_id).await?;
        info!(job_id = %job_id, template_id, "Render started");
        let result = self
            .build(&workspace, &config, &main_path, data, customizations)
            .await;
        workspace.schedule_cleanup(self.cleanup_grace);

        match &result {
            Ok(doc) => info!(
                job_id = %job_id,
                template_id,
                engine = %doc.engine,
                bytes = doc.pdf.len(),
                warnings = doc.warnings.len(),
                "Render finished"
            ),
            Err(e) => warn!(job_id = %job_id, template_id, kind = e.kind(), "Render failed: {e}"),
        }
        result
    }

    async fn build(
        &self,
        workspace: &Workspace,
        config: &TemplateConfig,
        main_path: &Path,
        data: &ResumeData,
        customizations: &Customizations,
    ) -> Result<RenderedDocument, RenderError> {
        self.registry.copy_assets(main_path, workspace.path()).await?;
        write(workspace, PLACEHOLDER_PNG_NAME, &PLACEHOLDER_PNG[..]).await?;

        let raw = read_source(main_path).await?;
        let identity = TemplateIdentity {
            template_id: &config.template_id,
            name: &config.metadata.name,
        };
        let injected = inject(identity, data, &raw, workspace.path()).await?;

        let (source, customize_warnings) = if customizations.is_empty() {
            (injected.source, Vec::new())
        } else {
            let mut customizer = Customizer::new(injected.source, config);
            customizer.apply_all(&customizations.to_ops(config));
            customizer.into_parts()
        };

        let mut warnings: Vec<RenderWarning> = injected.warning.into_iter().collect();
        warnings.extend(customize_warnings);

        let file_name = generated_file_name(&config.metadata.main_file);
        write(workspace, &file_name, sanitize(&source).as_bytes()).await?;

        let engine = config.engine.unwrap_or(injected.preferred_engine);
        if engine == Engine::Pdflatex {
            write(workspace, FIGURE_VERSIONS_STY_NAME, FIGURE_VERSIONS_STY.as_bytes()).await?;
        }

        let pdf = self
            .compiler
            .compile(workspace.path(), &file_name, engine)
            .await?;

        Ok(RenderedDocument {
            job_id: workspace.job_id(),
            pdf,
            engine,
            file_name,
            warnings,
        })
    }

    /// Placeholders and section presence for the raw template source.
    pub async fn placeholder_catalog(
        &self,
        template_id: &str,
    ) -> Result<PlaceholderCatalog, RenderError> {
        let (config, main_path) = self.resolve_template(template_id).await?;
        let raw = read_source(&main_path).await?;
        Ok(build_catalog(&config, &raw))
    }

    /// Loads the config and locates its main source on the blocking pool.
    async fn resolve_template(
        &self,
        template_id: &str,
    ) -> Result<(Arc<TemplateConfig>, PathBuf), RenderError> {
        let store = Arc::clone(&self.store);
        let registry = Arc::clone(&self.registry);
        let template_id = template_id.to_string();
        tokio::task::spawn_blocking(move || {
            let config = store.load_config(&template_id)?;
            let main_path = registry.resolve_main_file(&config)?;
            Ok::<_, RenderError>((config, main_path))
        })
        .await
        .map_err(|e| RenderError::Worker(e.to_string()))?
    }

    pub async fn engine_status(&self) -> Vec<EngineStatus> {
        let mut statuses = Vec::with_capacity(Engine::ALL.len());
        for engine in Engine::ALL {
            statuses.push(EngineStatus {
                engine,
                available: self.compiler.engine_available(engine).await,
            });
        }
        statuses
    }
}

async fn read_source(path: &Path) -> Result<String, RenderError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(RenderError::io(format!("reading {}", path.display())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn write(workspace: &Workspace, name: &str, contents: &[u8]) -> Result<(), RenderError> {
    tokio::fs::write(workspace.join(name), contents)
        .await
        .map_err(RenderError::io(format!("writing {name}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    /// Records what it was asked to compile and returns a stub PDF.
    #[derive(Default)]
    struct FakeCompiler {
        seen: Mutex<Option<(String, Engine, bool)>>,
        fail_with_missing: Option<&'static str>,
    }

    #[async_trait]
    impl DocumentCompiler for FakeCompiler {
        async fn compile(
            &self,
            workspace: &Path,
            file_name: &str,
            engine: Engine,
        ) -> Result<Bytes, RenderError> {
            let source = std::fs::read_to_string(workspace.join(file_name)).unwrap();
            let has_stub = workspace.join(FIGURE_VERSIONS_STY_NAME).exists()
                && workspace.join(PLACEHOLDER_PNG_NAME).exists();
            *self.seen.lock().unwrap() = Some((source, engine, has_stub));
            if let Some(package) = self.fail_with_missing {
                return Err(RenderError::CompilerMissingPackage {
                    package: package.to_string(),
                    file: format!("{package}.sty"),
                    log_excerpt: vec![],
                });
            }
            Ok(Bytes::from_static(b"%PDF-1.4 fake"))
        }

        async fn engine_available(&self, engine: Engine) -> bool {
            engine == Engine::Pdflatex
        }
    }

    impl FakeCompiler {
        fn source(&self) -> String {
            self.seen.lock().unwrap().as_ref().unwrap().0.clone()
        }
    }

    fn fixture_dir(sub: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("templates").join(sub)
    }

    fn make_service(compiler: Arc<FakeCompiler>, temp_root: &Path) -> RenderService {
        RenderService::new(
            Arc::new(TemplateConfigStore::new(fixture_dir("config"))),
            Arc::new(TemplateRegistry::new(fixture_dir("store"))),
            compiler,
            RenderSettings {
                temp_root: temp_root.to_path_buf(),
                cleanup_grace: Duration::ZERO,
                max_concurrent: 2,
            },
        )
    }

    fn make_minimal_resume(full_name: &str) -> ResumeData {
        serde_json::from_value(json!({
            "personalInfo": { "fullName": full_name },
            "experience": [],
            "education": [],
            "skills": { "technical": [] }
        }))
        .unwrap()
    }

    fn make_customizations(value: serde_json::Value) -> Customizations {
        serde_json::from_value(value).unwrap()
    }

    /// Unescaped braces outside comments pair up.
    fn braces_balanced(text: &str) -> bool {
        let mut depth: i64 = 0;
        for line in text.lines() {
            let mut escaped = false;
            for c in line.chars() {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '%' => break,
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth < 0 {
                            return false;
                        }
                    }
                    _ => {}
                }
            }
        }
        depth == 0
    }

    #[tokio::test]
    async fn test_minimal_resume_renders() {
        let temp = tempfile::tempdir().unwrap();
        let compiler = Arc::new(FakeCompiler::default());
        let service = make_service(compiler.clone(), temp.path());

        let doc = service
            .render(
                "simple-hipster-cv".into(),
                make_minimal_resume("Jane Doe"),
                Customizations::default(),
            )
            .await
            .unwrap();

        assert!(!doc.pdf.is_empty());
        assert_eq!(doc.engine, Engine::Pdflatex);
        assert_eq!(doc.file_name, "main.tex");
        assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);

        let source = compiler.source();
        assert!(source.contains("% No experience provided"));
        assert!(!source.contains("PLACEHOLDER"));
        assert!(source.contains("\\bfseries Jane{} Doe}"));
        assert!(braces_balanced(&source));
        assert!(compiler.seen.lock().unwrap().as_ref().unwrap().2);
    }

    #[tokio::test]
    async fn test_disabled_skills_section_is_removed() {
        let temp = tempfile::tempdir().unwrap();
        let compiler = Arc::new(FakeCompiler::default());
        let service = make_service(compiler.clone(), temp.path());

        let doc = service
            .render(
                "simple-hipster-cv".into(),
                make_minimal_resume("Jane Doe"),
                make_customizations(json!({ "enabledSections": { "skills": false } })),
            )
            .await
            .unwrap();

        assert!(doc.warnings.is_empty());
        let source = compiler.source();
        assert!(!source.contains("Programming"));
        assert!(!source.contains("barrule{"));
        assert!(!source.contains("No programming skills"));
        assert!(source.contains("\\section*{Languages}"));
        assert!(braces_balanced(&source));
    }

    #[tokio::test]
    async fn test_special_characters_in_name_are_escaped() {
        let temp = tempfile::tempdir().unwrap();
        let compiler = Arc::new(FakeCompiler::default());
        let service = make_service(compiler.clone(), temp.path());

        service
            .render(
                "simple-hipster-cv".into(),
                make_minimal_resume("O'Brien & Sons {Inc.}"),
                Customizations::default(),
            )
            .await
            .unwrap();

        let source = compiler.source();
        assert!(source.contains("O'Brien{} \\& Sons \\{Inc.\\}"));
        assert!(braces_balanced(&source));
    }

    #[tokio::test]
    async fn test_invalid_custom_color_is_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let compiler = Arc::new(FakeCompiler::default());
        let service = make_service(compiler.clone(), temp.path());

        let doc = service
            .render(
                "simple-hipster-cv".into(),
                make_minimal_resume("Jane Doe"),
                make_customizations(json!({ "customColors": { "primary": "not-a-color" } })),
            )
            .await
            .unwrap();

        assert!(!compiler.source().contains("{primary}"));
        assert!(matches!(
            doc.warnings.as_slice(),
            [RenderWarning::CustomColorRejected { .. }]
        ));
    }

    #[tokio::test]
    async fn test_color_scheme_and_font_applied() {
        let temp = tempfile::tempdir().unwrap();
        let compiler = Arc::new(FakeCompiler::default());
        let service = make_service(compiler.clone(), temp.path());

        service
            .render(
                "simple-hipster-cv".into(),
                make_minimal_resume("Jane Doe"),
                make_customizations(json!({
                    "colorScheme": "teal",
                    "font": "helvetica",
                    "customColors": { "brand": "#A1B2C3" }
                })),
            )
            .await
            .unwrap();

        let source = compiler.source();
        assert!(source.contains("\\colorlet{cvaccent}{cvteal}"));
        assert!(!source.contains("\\colorlet{cvaccent}{cvgreen}"));
        assert!(source.contains("\\definecolor{cvred}{HTML}{C62828}"));
        assert!(source.contains("\\usepackage{helvet}"));
        assert!(source.contains("\\definecolor{brand}{RGB}{161,178,195}"));
    }

    #[tokio::test]
    async fn test_unknown_template_is_config_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let service = make_service(Arc::new(FakeCompiler::default()), temp.path());

        let err = service
            .render(
                "no-such-template".into(),
                ResumeData::default(),
                Customizations::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "config_not_found");
    }

    #[tokio::test]
    async fn test_compiler_error_propagates_and_workspace_is_cleaned() {
        let temp = tempfile::tempdir().unwrap();
        let compiler = Arc::new(FakeCompiler {
            fail_with_missing: Some("fontawesome5"),
            ..Default::default()
        });
        let service = make_service(compiler, temp.path());

        let err = service
            .render(
                "simple-hipster-cv".into(),
                make_minimal_resume("Jane Doe"),
                Customizations::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "compiler_missing_package");

        for _ in 0..100 {
            if std::fs::read_dir(temp.path()).unwrap().next().is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(std::fs::read_dir(temp.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_placeholder_catalog() {
        let temp = tempfile::tempdir().unwrap();
        let service = make_service(Arc::new(FakeCompiler::default()), temp.path());

        let catalog = service.placeholder_catalog("simple-hipster-cv").await.unwrap();
        assert_eq!(catalog.template_id, "simple-hipster-cv");
        let title = catalog
            .placeholders
            .iter()
            .find(|p| p.name == "PLACEHOLDERTITLE")
            .unwrap();
        assert!(title.configured);
        assert!(catalog
            .placeholders
            .iter()
            .any(|p| p.name == "PLACEHOLDEREXPERIENCE" && !p.configured));
        assert!(catalog.sections.iter().all(|s| s.exists));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_resolve_template_off_the_runtime_thread() {
        let temp = tempfile::tempdir().unwrap();
        let service = make_service(Arc::new(FakeCompiler::default()), temp.path());

        let (config, main_path) = service.resolve_template("simple-hipster-cv").await.unwrap();
        assert_eq!(config.template_id, "simple-hipster-cv");
        assert!(main_path.ends_with("simple-hipster-cv/main.tex"));

        let err = service.resolve_template("no-such-template").await.unwrap_err();
        assert_eq!(err.kind(), "config_not_found");
    }

    #[tokio::test]
    async fn test_missing_main_file_is_reported() {
        let config_dir = tempfile::tempdir().unwrap();
        let store_dir = tempfile::tempdir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            config_dir.path().join("ghost.config.json"),
            json!({
                "templateId": "ghost",
                "metadata": { "name": "Ghost", "mainFile": "ghost/main.tex" }
            })
            .to_string(),
        )
        .unwrap();

        let service = RenderService::new(
            Arc::new(TemplateConfigStore::new(config_dir.path())),
            Arc::new(TemplateRegistry::new(store_dir.path())),
            Arc::new(FakeCompiler::default()),
            RenderSettings {
                temp_root: temp.path().to_path_buf(),
                cleanup_grace: Duration::ZERO,
                max_concurrent: 1,
            },
        );
        let err = service
            .render("ghost".into(), ResumeData::default(), Customizations::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "template_file_not_found");
    }

    #[tokio::test]
    async fn test_engine_status_lists_every_engine() {
        let temp = tempfile::tempdir().unwrap();
        let service = make_service(Arc::new(FakeCompiler::default()), temp.path());

        let statuses = service.engine_status().await;
        assert_eq!(statuses.len(), 3);
        assert!(statuses[0].available);
        assert!(!statuses[1].available);
    }
}
