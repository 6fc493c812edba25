pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::render::handlers as render;
use crate::state::AppState;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Template API
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route(
            "/api/v1/templates/cache",
            delete(templates::handle_clear_cache),
        )
        .route(
            "/api/v1/templates/:template_id/config",
            get(templates::handle_get_config),
        )
        .route(
            "/api/v1/templates/:template_id/features",
            get(templates::handle_get_features),
        )
        .route(
            "/api/v1/templates/:template_id/placeholders",
            get(templates::handle_get_placeholders),
        )
        .route(
            "/api/v1/templates/:template_id/cache",
            delete(templates::handle_clear_template_cache),
        )
        // Render API
        .route("/api/v1/render", post(render::handle_render))
        .route("/api/v1/engines", get(render::handle_engines))
        .with_state(state)
}
