mod config;
mod errors;
mod extraction;
mod generation;
mod llm_client;
mod prompt_loader;
mod routes;
mod state;
mod store;
mod ui;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::render::PdftoppmRenderer;
use crate::llm_client::GeminiClient;
use crate::prompt_loader::{PromptLoader, PromptName};
use crate::routes::build_router;
use crate::state::AppState;
use crate::ui::Views;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeMagic v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Gemini clients (one per model)
    let timeout = Duration::from_secs(config.model_timeout_secs);
    let vision = GeminiClient::new(
        config.google_api_key.clone(),
        &config.gemini_api_url,
        &config.vision_model,
        timeout,
    )?;
    let text = GeminiClient::new(
        config.google_api_key.clone(),
        &config.gemini_api_url,
        &config.text_model,
        timeout,
    )?;
    info!(
        "LLM clients initialized (vision: {}, text: {})",
        vision.model(),
        text.model()
    );

    // Prompt templates are re-read per call; only report missing ones here
    let prompts = PromptLoader::new(config.prompts_dir.clone());
    for name in PromptName::ALL {
        if prompts.load(name).await.is_err() {
            warn!(
                "Prompt template {} not found under {}",
                name.file_name(),
                prompts.dir().display()
            );
        }
    }

    let renderer = PdftoppmRenderer::new(config.pdftoppm_bin.clone(), config.render_dpi);
    if let Some(dir) = &config.scratch_dir {
        info!("Mirroring intermediate state to {}", dir.display());
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        prompts,
        renderer: Arc::new(renderer),
        vision: Arc::new(vision),
        text: Arc::new(text),
        views: Arc::new(Views::new()?),
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
