use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Render core errors
// ────────────────────────────────────────────────────────────────────────────

/// A single field-level problem found while validating a template config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Terminal failure of a render or config operation.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No configuration found for template '{template_id}'")]
    ConfigNotFound { template_id: String },

    #[error("Configuration for template '{template_id}' is invalid ({} problem(s))", errors.len())]
    ConfigInvalid {
        template_id: String,
        errors: Vec<FieldError>,
    },

    #[error("Configuration file '{file_stem}.config.json' declares templateId '{declared}'")]
    ConfigIdMismatch { file_stem: String, declared: String },

    #[error("Template source '{file}' not found for template '{template_id}'")]
    TemplateFileNotFound {
        template_id: String,
        file: String,
        available: Vec<String>,
    },

    #[error("LaTeX package '{package}' is not installed (missing file '{file}')")]
    CompilerMissingPackage {
        package: String,
        file: String,
        log_excerpt: Vec<String>,
    },

    #[error("LaTeX compilation failed: {summary}")]
    CompilerFatal {
        summary: String,
        log_excerpt: Vec<String>,
    },

    #[error("LaTeX compilation did not finish within {seconds}s")]
    CompilerTimeout { seconds: u64 },

    #[error("LaTeX engine '{engine}' is not available on this host")]
    EngineUnavailable { engine: String },

    #[error("Workspace I/O failed while {context}: {source}")]
    WorkspaceIo {
        context: String,
        source: std::io::Error,
    },

    #[error("Render task failed: {0}")]
    Worker(String),
}

impl RenderError {
    /// Adapter for `map_err` on filesystem calls: `.map_err(RenderError::io("copying assets"))`.
    pub fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> RenderError {
        let context = context.into();
        move |source| RenderError::WorkspaceIo { context, source }
    }

    /// Stable snake_case identifier for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::ConfigNotFound { .. } => "config_not_found",
            RenderError::ConfigInvalid { .. } => "config_invalid",
            RenderError::ConfigIdMismatch { .. } => "config_id_mismatch",
            RenderError::TemplateFileNotFound { .. } => "template_file_not_found",
            RenderError::CompilerMissingPackage { .. } => "compiler_missing_package",
            RenderError::CompilerFatal { .. } => "compiler_fatal",
            RenderError::CompilerTimeout { .. } => "compiler_timeout",
            RenderError::EngineUnavailable { .. } => "engine_unavailable",
            RenderError::WorkspaceIo { .. } => "workspace_io",
            RenderError::Worker(_) => "worker",
        }
    }

    /// Diagnostic payload: field errors, available files, or the tail of the compiler log.
    pub fn detail(&self) -> Option<Value> {
        match self {
            RenderError::ConfigInvalid { errors, .. } => Some(json!({ "errors": errors })),
            RenderError::TemplateFileNotFound { available, .. } => {
                Some(json!({ "available": available }))
            }
            RenderError::CompilerMissingPackage { log_excerpt, .. }
            | RenderError::CompilerFatal { log_excerpt, .. } => {
                Some(json!({ "log": log_excerpt }))
            }
            RenderError::WorkspaceIo { source, .. } => Some(json!({ "io": source.to_string() })),
            _ => None,
        }
    }

    /// Remediation hint for errors the template author or operator can fix.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RenderError::ConfigNotFound { .. } => {
                Some("Add a <templateId>.config.json file to the template config directory")
            }
            RenderError::ConfigInvalid { .. } => Some("Fix the listed fields in the config file"),
            RenderError::ConfigIdMismatch { .. } => {
                Some("Make templateId match the config file name")
            }
            RenderError::TemplateFileNotFound { .. } => {
                Some("Check metadata.mainFile against the files in the template store")
            }
            RenderError::CompilerMissingPackage { .. } => {
                Some("Install the package into the TeX distribution (e.g. tlmgr install <package>)")
            }
            RenderError::EngineUnavailable { .. } => {
                Some("Install a TeX distribution providing the engine and put it on PATH")
            }
            _ => None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            RenderError::ConfigNotFound { .. } | RenderError::TemplateFileNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            RenderError::ConfigInvalid { .. } | RenderError::ConfigIdMismatch { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            RenderError::CompilerTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RenderError::EngineUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RenderError::CompilerMissingPackage { .. }
            | RenderError::CompilerFatal { .. }
            | RenderError::WorkspaceIo { .. }
            | RenderError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Recoverable anomaly: logged, collected on the job, and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderWarning {
    #[error("No dedicated adapter for template '{template_id}', used the generic injector")]
    InjectorFallbackUsed { template_id: String },

    #[error("Placeholder '{name}' not found in template source")]
    PlaceholderUnresolved { name: String },

    #[error("Color scheme '{scheme}' skipped: {reason}")]
    ColorSchemeSkipped { scheme: String, reason: String },

    #[error("Font '{font}' skipped: {reason}")]
    FontSkipped { font: String, reason: String },

    #[error("Section '{section}' skipped: {reason}")]
    SectionSkipped { section: String, reason: String },

    #[error("Custom color '{name}' = '{value}' rejected: {reason}")]
    CustomColorRejected {
        name: String,
        value: String,
        reason: String,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP boundary
// ────────────────────────────────────────────────────────────────────────────

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{error}")]
    Render {
        error: RenderError,
        /// Include `detail` in the response body (diagnostic mode).
        include_detail: bool,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn render(error: RenderError, include_detail: bool) -> Self {
        AppError::Render {
            error,
            include_detail,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "code": "VALIDATION_ERROR", "message": msg }),
            ),
            AppError::Render {
                error,
                include_detail,
            } => {
                let status = error.status();
                if status.is_server_error() {
                    tracing::error!(kind = error.kind(), "Render error: {error}");
                }
                let mut payload = json!({
                    "code": error.kind().to_uppercase(),
                    "message": error.to_string(),
                });
                if let Some(hint) = error.hint() {
                    payload["hint"] = json!(hint);
                }
                if *include_detail {
                    if let Some(detail) = error.detail() {
                        payload["detail"] = detail;
                    }
                }
                (status, payload)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "code": "INTERNAL_ERROR",
                        "message": "An internal server error occurred",
                    }),
                )
            }
        };

        let (status, error) = body;
        (status, Json(json!({ "error": error }))).into_response()
    }
}
