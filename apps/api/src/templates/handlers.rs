//! Axum route handlers for the Template API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;
use crate::templates::config::{TemplateConfig, TemplateFeatures, TemplateSummary};
use crate::templates::placeholders::PlaceholderCatalog;

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheClearedResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub cleared: bool,
}

/// GET /api/v1/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateListResponse>, AppError> {
    let store = Arc::clone(&state.store);
    let templates = tokio::task::spawn_blocking(move || store.available_templates())
        .await
        .context("template listing task failed")?
        .map_err(|e| state.render_error(e))?;

    Ok(Json(TemplateListResponse { templates }))
}

/// GET /api/v1/templates/:template_id/config
pub async fn handle_get_config(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<TemplateConfig>, AppError> {
    let store = Arc::clone(&state.store);
    let config = tokio::task::spawn_blocking(move || store.load_config(&template_id))
        .await
        .context("config load task failed")?
        .map_err(|e| state.render_error(e))?;

    Ok(Json(config.as_ref().clone()))
}

/// GET /api/v1/templates/:template_id/features
pub async fn handle_get_features(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<TemplateFeatures>, AppError> {
    let store = Arc::clone(&state.store);
    let features = tokio::task::spawn_blocking(move || store.template_features(&template_id))
        .await
        .context("feature lookup task failed")?
        .map_err(|e| state.render_error(e))?;

    Ok(Json(features))
}

/// GET /api/v1/templates/:template_id/placeholders
///
/// Placeholders and sections an edit UI can offer for this template.
pub async fn handle_get_placeholders(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<PlaceholderCatalog>, AppError> {
    let catalog = state
        .render
        .placeholder_catalog(&template_id)
        .await
        .map_err(|e| state.render_error(e))?;

    Ok(Json(catalog))
}

/// DELETE /api/v1/templates/cache
pub async fn handle_clear_cache(State(state): State<AppState>) -> Json<CacheClearedResponse> {
    state.store.clear_cache();
    info!("Template config cache cleared");
    Json(CacheClearedResponse {
        template_id: None,
        cleared: true,
    })
}

/// DELETE /api/v1/templates/:template_id/cache
pub async fn handle_clear_template_cache(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Json<CacheClearedResponse> {
    let cleared = state.store.clear_template_cache(&template_id);
    info!(template_id = %template_id, cleared, "Template config cache entry cleared");
    Json(CacheClearedResponse {
        template_id: Some(template_id),
        cleared,
    })
}
