//! Axum-based API Gateway: entry point for Empath. Config-driven via CoreConfig.

mod handlers;

use axum::http::{HeaderValue, Method};
use axum::{extract::State, routing::get, routing::post, Router};
use empath_core::{tone, CoreConfig, Orchestrator};
use empath_skills::{LlmMode, ModelRouter, ENV_LLM_API_KEY};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pre-flight check: config loads, the provider credential is present, and the port is free.
fn run_verify() -> Result<(), String> {
    print!("Checking config... ");
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;
    println!("OK ({} mode, model {})", config.llm_mode, config.llm_model);

    print!("Checking generation client... ");
    let router = ModelRouter::from_config(&config).map_err(|e| format!("Generation client: {}", e))?;
    match router.mode() {
        LlmMode::Live => println!("OK ({} present)", ENV_LLM_API_KEY),
        LlmMode::Mock => println!("OK (mock mode, no credential needed)"),
    }

    let addr = config.bind_addr();
    print!("Checking {}... ", addr);
    match std::net::TcpListener::bind(&addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => {
            return Err(format!("{} BLOCKED: {}", addr, e));
        }
    }

    println!("\n✅ SUCCESS: All systems GO. Ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[empath-gateway] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("❌ PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match CoreConfig::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(target: "empath::gateway", error = %e, "Config load failed");
            std::process::exit(1);
        }
    };

    // Missing credential in live mode: refuse to start.
    let router = match ModelRouter::from_config(&config) {
        Ok(router) => router,
        Err(e) => {
            tracing::error!(target: "empath::gateway", error = %e, "Generation client unavailable");
            std::process::exit(1);
        }
    };
    tracing::info!(
        target: "empath::gateway",
        mode = router.mode().as_str(),
        model = %config.llm_model,
        temperature = config.temperature,
        "Generation client ready"
    );

    let orchestrator = Arc::new(Orchestrator::new(Arc::new(router)));
    let app = build_app(AppState {
        config: Arc::clone(&config),
        orchestrator,
    });

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(target: "empath::gateway", error = %e, "Failed to bind {}", addr);
            std::process::exit(1);
        }
    };
    tracing::info!("{} listening on {}", config.app_name, addr);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(target: "empath::gateway", error = %e, "Server error");
    }
}

fn build_cors(config: &CoreConfig) -> CorsLayer {
    let origins = if config.cors_allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let list: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o.trim()) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(target: "empath::gateway", origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

fn build_app(state: AppState) -> Router {
    let cors = build_cors(&state.config);

    Router::new()
        .route("/support", post(handlers::support::support))
        .route("/v1/status", get(status))
        .route("/api/v1/health", get(health))
        .with_state(state)
        .layer(cors)
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) orchestrator: Arc<Orchestrator>,
}

/// GET /api/v1/health – liveness check for UI and scripts.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// GET /v1/status – app identity, generation settings and the tone labels in use.
async fn status(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "app_name": state.config.app_name,
        "llm_mode": state.config.llm_mode,
        "llm_model": state.config.llm_model,
        "generator": state.orchestrator.generator_name(),
        "tones": tone::labels(),
    }))
}
