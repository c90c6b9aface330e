//! HTTP surface for the code execution service.
//!
//! Two routes make up the whole contract: `POST /api/run` accepts a snippet
//! and a language tag and answers with `{success, output}`, and
//! `GET /api/health` reports liveness. Validation failures are the only
//! 400s; anything unexpected is logged server-side and surfaced as a
//! generic 500 so internals never leak to the caller.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::{middleware, Router};
use codelab_core::core_types::{ExecutionResult, Language, RunRequest};
use codelab_core::executors::CodeExecutor;
use serde::Serialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Liveness payload for `GET /api/health`.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn CodeExecutor>,
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/run", post(run_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Code execution server is running".to_string(),
    })
}

/// Handler for the `POST /api/run` endpoint.
async fn run_handler(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<ExecutionResult>, (StatusCode, Json<serde_json::Value>)> {
    let code = request.code.unwrap_or_default();
    let language_tag = request.language.unwrap_or_default();

    // Nothing is allocated and nothing runs until both fields check out.
    if code.trim().is_empty() || language_tag.trim().is_empty() {
        return Err(bad_request("Code and language are required"));
    }
    let language = match Language::from_str(&language_tag) {
        Ok(language) => language,
        Err(e) => {
            log::warn!("rejected run request: {}", e);
            return Err(bad_request("Unsupported language"));
        }
    };

    log::info!("running {} snippet ({} bytes)", language, code.len());
    match state.executor.execute_code(language, &code).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            log::error!("execution failed before the program could run: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            ))
        }
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
}

async fn log_requests(
    request: axum::extract::Request,
    next: middleware::Next,
) -> axum::response::Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    log::info!("Request {} {} {}", request_id, method, uri);

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    log::info!(
        "Response {} {} completed in {:?}",
        request_id,
        response.status(),
        start.elapsed()
    );
    response
}

/// Shutdown signal that resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            log::info!("Received SIGTERM, shutting down...");
        },
    }
}
