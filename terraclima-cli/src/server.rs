use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use serde_json::json;
use terraclima_core::{ProviderFactory, WeatherService, handle};
use tower_http::trace::TraceLayer;
use tracing::info;

pub const HUMIDITY_PATH: &str = "/api/humidity";

pub fn router(service: WeatherService) -> Router {
    Router::new()
        .route(HUMIDITY_PATH, any(humidity_handler))
        .route("/api/providers", get(providers_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(service))
}

pub async fn serve(bind: &str, service: WeatherService) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;

    info!(address = %listener.local_addr()?, "humidity endpoint listening on {HUMIDITY_PATH}");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")
}

async fn humidity_handler(
    State(service): State<Arc<WeatherService>>,
    method: Method,
    body: Bytes,
) -> Response {
    let res = handle(&service, method.as_str(), &body).await;
    let status = StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(res.body)).into_response()
}

async fn providers_handler() -> Json<serde_json::Value> {
    Json(json!({ "providers": ProviderFactory::available_providers() }))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
