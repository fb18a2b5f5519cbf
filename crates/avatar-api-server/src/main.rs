use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use avatar_api_server::config::Settings;
use avatar_api_server::handlers;
use avatar_api_server::services::{
    ConversationService, LlmService, SpeechSynthesizer, VoicevoxService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,avatar_api_server=debug".to_string()),
        )
        .with_target(true)
        .init();

    info!("🚀 Starting Avatar API Server...");

    // Load configuration; a missing API key refuses to start
    let settings = Settings::load()?;
    let api_key = Settings::api_key()?;
    info!("✅ Configuration loaded");

    // Initialize services
    let llm_service = Arc::new(LlmService::new(
        settings.llm.clone(),
        api_key,
        settings.prompts.vision_prompt.clone(),
    ));

    let voicevox_service: Arc<dyn SpeechSynthesizer> =
        Arc::new(VoicevoxService::new(settings.voicevox.clone()));

    let conversation_service = Arc::new(ConversationService::new(
        llm_service.clone(),
        settings.prompts.default_system_prompt.clone(),
    ));

    // Build router
    let app = build_router(conversation_service, llm_service, voicevox_service);

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(
    conversation_service: Arc<ConversationService>,
    llm_service: Arc<LlmService>,
    voicevox_service: Arc<dyn SpeechSynthesizer>,
) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route("/api/chat", post(handlers::chat::chat_handler))
        .route("/api/tts", get(handlers::tts::tts_handler))
        .route("/api/vision", post(handlers::vision::vision_handler))
        // Shared state
        .layer(Extension(conversation_service))
        .layer(Extension(llm_service))
        .layer(Extension(voicevox_service))
        // CORS (the browser front end runs on a different origin)
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        // A handler panic must become a 500, not a dead connection
        .layer(CatchPanicLayer::new())
        // Body limit (image uploads - max 10MB)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}
