mod config;
mod customize;
mod errors;
mod injection;
mod models;
mod render;
mod routes;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::render::compiler::{DocumentCompiler, LatexCompiler};
use crate::render::pipeline::{RenderService, RenderSettings};
use crate::routes::build_router;
use crate::state::AppState;
use crate::templates::registry::TemplateRegistry;
use crate::templates::store::TemplateConfigStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvforge v{}", env!("CARGO_PKG_VERSION"));

    // Template config store and source registry
    let store = Arc::new(TemplateConfigStore::new(&config.template_config_dir));
    let registry = Arc::new(TemplateRegistry::new(&config.template_store_dir));
    info!(
        config_dir = %config.template_config_dir.display(),
        store_dir = %config.template_store_dir.display(),
        "Template store initialized"
    );

    let families: Vec<&str> = injection::families().iter().map(|f| f.name).collect();
    debug!(?families, "Injector families registered");

    // LaTeX compiler
    let mut compiler = LatexCompiler::new(
        Duration::from_secs(config.compile_timeout_secs),
        config.compiler_output_limit_bytes,
    );
    if let Some(dir) = &config.tex_bin_dir {
        compiler = compiler.with_bin_dir(dir);
    }
    let compiler: Arc<dyn DocumentCompiler> = Arc::new(compiler);

    let render = RenderService::new(
        Arc::clone(&store),
        registry,
        compiler,
        RenderSettings {
            temp_root: config.render_temp_dir.clone(),
            cleanup_grace: Duration::from_secs(config.cleanup_grace_secs),
            max_concurrent: config.max_concurrent_renders,
        },
    );
    for status in render.engine_status().await {
        if status.available {
            info!(engine = %status.engine, "LaTeX engine available");
        } else {
            warn!(engine = %status.engine, "LaTeX engine not found");
        }
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        store,
        render: Arc::new(render),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
