use std::sync::Arc;

use crate::config::Config;
use crate::errors::{AppError, RenderError};
use crate::render::pipeline::RenderService;
use crate::templates::store::TemplateConfigStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<TemplateConfigStore>,
    pub render: Arc<RenderService>,
}

impl AppState {
    /// Wraps a core error for the HTTP boundary, honoring the diagnostics setting.
    pub fn render_error(&self, error: RenderError) -> AppError {
        AppError::render(error, self.config.render_diagnostics)
    }
}
