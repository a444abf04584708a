//! # KRODE Site Server Implementation
//!
//! File: cli/src/commands/srv/server_logic.rs
//!
//! ## Overview
//!
//! This module implements the HTTP server behind `krode srv`. It serves the
//! website from a local directory and exposes the assistant to the chat
//! widget:
//! - `GET /` serves the configured index file
//! - `POST /api/chat` answers `{"message": "..."}` with `{"reply", "category"}`
//! - `GET /api/quick-replies` lists the quick-reply presets
//! - every other path is a static file lookup
//!
//! ## Architecture
//!
//! The server uses Axum and follows these steps:
//! 1. Find an available port if the requested one is in use
//! 2. Build the router with the shared rule table as state
//! 3. Apply tracing and CORS middleware
//! 4. Serve until Ctrl+C or SIGTERM
//!
//! The reply is returned as template markup; the browser renders it.
//!
use super::config::ServerConfig;
use super::utils;
use crate::core::error::{KrodeError, Result};
use crate::core::responder::QUICK_REPLIES;
use crate::core::rules::{Category, RuleTable};
use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, error, info, warn, Level};

/// Number of consecutive ports tried before giving up.
const MAX_PORT_ATTEMPTS: u8 = 10;

/// State shared by the API handlers.
#[derive(Clone)]
pub struct AppState {
    pub rules: Arc<RuleTable>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub reply: String,
    pub category: Category,
}

/// # Run HTTP Server (`run_server`)
///
/// Binds the first free port starting at `config.port`, prints the
/// connection banner and serves the site until a shutdown signal arrives.
///
/// ## Errors
///
/// Fails if no port in range can be bound, or if the server itself errors.
pub async fn run_server(config: ServerConfig, rules: Arc<RuleTable>) -> Result<()> {
    let addr = find_available_port(config.host, config.port, MAX_PORT_ATTEMPTS).await?;

    let summary = utils::summarize_site(&config.directory, &config.index_file);
    let local_ip = utils::get_local_ip();
    let rule_count = rules.len();

    let app = create_app(&config, rules);

    println!("\n=================================================================");
    println!("📂 Serving files from: {}", config.directory.display());
    println!("🌐 Local URL:         http://localhost:{}", addr.port());
    if let Some(ip) = local_ip {
        println!("🔗 Network URL:       http://{}:{}", ip, addr.port());
    }
    println!("⚙️  Binding to address: {}", addr);
    println!(
        "❓ Index file:        {}{}",
        config.index_file,
        if summary.has_index { "" } else { " (missing)" }
    );
    println!(
        "📄 Site entries:      {} files, {} directories",
        summary.files, summary.directories
    );
    println!("💬 Chat endpoint:     POST /api/chat ({} rules)", rule_count);
    println!("🔒 CORS enabled:      {}", config.enable_cors);
    println!("=================================================================\n");

    info!(
        "Starting server on {} for directory {}",
        addr,
        config.directory.display()
    );
    println!("Server starting! Press Ctrl+C to stop.");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    println!("\nServer shutdown complete.");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!(
                    "Failed to install SIGTERM handler: {}. Shutdown on SIGTERM might not work.",
                    e
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// # Find Available Port (`find_available_port`)
///
/// Tries `start_port`, then the following ports, up to `max_attempts`
/// binds in total. The probe listener is dropped before returning.
async fn find_available_port(
    req_host: std::net::IpAddr,
    start_port: u16,
    max_attempts: u8,
) -> Result<SocketAddr> {
    let mut current_port = start_port;

    for attempt in 0..max_attempts {
        let addr = SocketAddr::new(req_host, current_port);
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                drop(listener);
                if attempt > 0 {
                    info!(
                        "Port {} was unavailable, successfully bound to available port {}.",
                        start_port, current_port
                    );
                }
                return Ok(addr);
            }
            Err(e) => {
                warn!(
                    "Attempt {}: Port {} on host {} is unavailable (Error: {}). Trying next port...",
                    attempt + 1,
                    current_port,
                    req_host,
                    e
                );
                current_port = match current_port.checked_add(1) {
                    Some(p) => p,
                    None => break,
                };
            }
        }
    }

    Err(KrodeError::Server(format!(
        "Could not find an available port on host {} starting from port {} after trying {} ports.",
        req_host, start_port, max_attempts
    ))
    .into())
}

/// `POST /api/chat`. A blank message is rejected with 400 before the
/// responder runs.
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> std::result::Result<Json<ChatResponse>, (StatusCode, Json<serde_json::Value>)> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": KrodeError::EmptyMessage.to_string() })),
        ));
    }

    let rule = state.rules.classify(message);
    debug!(category = %rule.category(), "Chat request answered");
    Ok(Json(ChatResponse {
        reply: rule.template().to_string(),
        category: rule.category(),
    }))
}

/// `GET /api/quick-replies`.
async fn quick_replies_handler() -> Json<&'static [&'static str]> {
    Json(QUICK_REPLIES)
}

/// # Create Axum Application (`create_app`)
///
/// Builds the router: API routes first, the index file at `/`, and a
/// `ServeDir` fallback for everything else. Tracing wraps CORS.
fn create_app(config: &ServerConfig, rules: Arc<RuleTable>) -> Router {
    let cors_layer = if config.enable_cors {
        info!("CORS middleware enabled (permissive).");
        CorsLayer::permissive()
    } else {
        info!("CORS middleware disabled.");
        CorsLayer::new()
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let index_service = ServeFile::new(config.directory.join(&config.index_file));
    let static_service = ServeDir::new(&config.directory);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/quick-replies", get(quick_replies_handler))
        .route_service("/", index_service)
        .fallback_service(static_service)
        .with_state(AppState { rules })
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(cors_layer),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use std::net::Ipv4Addr;
    use tempfile::TempDir;
    use tokio::fs;
    use tower::ServiceExt;

    fn test_config(dir: &std::path::Path) -> ServerConfig {
        ServerConfig {
            port: 0,
            host: Ipv4Addr::LOCALHOST.into(),
            directory: dir.to_path_buf(),
            enable_cors: true,
            index_file: "index.html".to_string(),
            rules_file: None,
        }
    }

    fn builtin_rules() -> Arc<RuleTable> {
        Arc::new(RuleTable::builtin().clone())
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_find_available_port_start_is_free() -> Result<()> {
        let host = Ipv4Addr::LOCALHOST.into();
        let start_port = 50000;

        let addr = find_available_port(host, start_port, 5).await?;

        assert_eq!(addr.port(), start_port);
        assert_eq!(addr.ip(), host);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_available_port_start_occupied() -> Result<()> {
        let host = Ipv4Addr::LOCALHOST.into();
        let start_port = 51000;

        let _listener = TcpListener::bind(SocketAddr::new(host, start_port)).await?;
        let addr = find_available_port(host, start_port, 5).await?;

        assert!(addr.port() > start_port);
        assert!(addr.port() < start_port + 5);
        assert_eq!(addr.ip(), host);
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_endpoint_answers() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let app = create_app(&test_config(temp_dir.path()), builtin_rules());

        let response = app
            .oneshot(chat_request(r#"{"message": "On esteu ubicats?"}"#))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let parsed: ChatResponse = serde_json::from_slice(&body)?;
        assert_eq!(parsed.category, Category::Location);
        assert!(parsed.reply.contains("Carrer Compositor Pep Ventura, 58"));
        assert!(parsed.reply.contains("<strong>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_endpoint_category_is_snake_case() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let app = create_app(&test_config(temp_dir.path()), builtin_rules());

        let response = app.oneshot(chat_request(r#"{"message": "hello"}"#)).await?;
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(value["category"], "fallback");
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_endpoint_rejects_blank_message() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let app = create_app(&test_config(temp_dir.path()), builtin_rules());

        let response = app.oneshot(chat_request(r#"{"message": "   "}"#)).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        assert!(value["error"].as_str().unwrap().contains("empty"));
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_endpoint_uses_given_rules() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let rules = RuleTable::from_toml_str(
            r#"
            [[rules]]
            category = "pricing"
            terms = ["quant"]
            template = "Pressupost gratuït."

            [[rules]]
            category = "fallback"
            template = "No ho entenc."
            "#,
        )?;
        let app = create_app(&test_config(temp_dir.path()), Arc::new(rules));

        let response = app
            .oneshot(chat_request(r#"{"message": "Quant costa?"}"#))
            .await?;
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let parsed: ChatResponse = serde_json::from_slice(&body)?;
        assert_eq!(
            parsed,
            ChatResponse {
                reply: "Pressupost gratuït.".to_string(),
                category: Category::Pricing,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_quick_replies_endpoint() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let app = create_app(&test_config(temp_dir.path()), builtin_rules());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/quick-replies")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let presets: Vec<String> = serde_json::from_slice(&body)?;
        assert_eq!(presets, QUICK_REPLIES);
        Ok(())
    }

    #[tokio::test]
    async fn test_serves_index_and_static_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut config = test_config(temp_dir.path());
        config.index_file = "inici.html".to_string();
        fs::write(temp_dir.path().join("inici.html"), "<h1>KRODE</h1>").await?;
        fs::write(temp_dir.path().join("style.css"), "body {}").await?;

        let app = create_app(&config, builtin_rules());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&body[..], b"<h1>KRODE</h1>");

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/style.css").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/missing.html").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
