//! Axum route handlers for the Render API.

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::customization::Customizations;
use crate::models::resume::ResumeData;
use crate::render::pipeline::EngineStatus;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template_id: String,
    pub resume_data: ResumeData,
    #[serde(default)]
    pub customizations: Customizations,
}

#[derive(Debug, Serialize)]
pub struct EnginesResponse {
    pub engines: Vec<EngineStatus>,
}

static JOB_ID_HEADER: HeaderName = HeaderName::from_static("x-render-job-id");
static WARNINGS_HEADER: HeaderName = HeaderName::from_static("x-render-warnings");

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/render
///
/// Renders the resume with the given template and returns the PDF as an attachment.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, AppError> {
    let template_id = request.template_id.trim().to_string();
    if template_id.is_empty() {
        return Err(AppError::Validation("templateId cannot be empty".to_string()));
    }

    let document = state
        .render
        .render(template_id.clone(), request.resume_data, request.customizations)
        .await
        .map_err(|e| state.render_error(e))?;

    info!(
        job_id = %document.job_id,
        template_id = %template_id,
        engine = %document.engine,
        source = %document.file_name,
        warnings = ?document.warnings,
        "Serving rendered PDF"
    );

    let disposition = format!("attachment; filename=\"resume-{template_id}.pdf\"");
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition).map_err(anyhow::Error::from)?,
        ),
        (
            JOB_ID_HEADER.clone(),
            HeaderValue::from_str(&document.job_id.to_string()).map_err(anyhow::Error::from)?,
        ),
        (WARNINGS_HEADER.clone(), HeaderValue::from(document.warnings.len())),
    ];
    Ok((headers, document.pdf).into_response())
}

/// GET /api/v1/engines
///
/// Reports which LaTeX engines are installed on this host.
pub async fn handle_engines(State(state): State<AppState>) -> Json<EnginesResponse> {
    Json(EnginesResponse {
        engines: state.render.engine_status().await,
    })
}
