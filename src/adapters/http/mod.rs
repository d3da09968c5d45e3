//! Status HTTP server.
//!
//! Exposes the latest detection snapshot, on-demand checks and push
//! subscription registration.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::models::{PushSubscription, ServerConfig, StatusSnapshot};
use crate::services::CheckScheduler;

/// Response returned when a subscription is stored.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeyResponse {
    pub public_key: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

/// Shared state for the status HTTP server.
pub struct AppState {
    pub scheduler: Arc<CheckScheduler>,
    pub trigger_token: Option<String>,
    pub vapid_public_key: Option<String>,
}

impl AppState {
    pub fn new(
        scheduler: Arc<CheckScheduler>,
        trigger_token: Option<String>,
        vapid_public_key: Option<String>,
    ) -> Self {
        Self {
            scheduler,
            trigger_token: trigger_token.filter(|t| !t.trim().is_empty()),
            vapid_public_key: vapid_public_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Build the router.
pub fn build_router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/status", get(get_status))
        .route("/check", post(run_check))
        .route("/trigger", post(trigger_check))
        .route("/subscribe", post(subscribe))
        .route("/vapid-public-key", get(vapid_public_key))
        .route("/health", get(health_check))
        .with_state(state);

    if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

/// Status HTTP server.
pub struct StatusHttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl StatusHttpServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.config.host, self.config.port).parse()
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = build_router(self.state, self.config.enable_cors);

        tracing::info!("Status HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.scheduler.status().await)
}

async fn run_check(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.scheduler.check_or_current().await)
}

async fn trigger_check(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let Some(expected) = state.trigger_token.as_deref() else {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "TRIGGER_DISABLED",
            "no trigger token configured",
        ));
    };

    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|presented| constant_time_eq(presented.trim().as_bytes(), expected.as_bytes()));
    if !authorized {
        tracing::warn!("rejected trigger with missing or invalid token");
        return Err(api_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "invalid trigger token"));
    }

    Ok(Json(state.scheduler.check_or_current().await))
}

/// Compare secrets without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

async fn subscribe(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PushSubscription>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscribeResponse>), ApiError> {
    let Json(subscription) =
        payload.map_err(|e| api_error(StatusCode::BAD_REQUEST, "INVALID_BODY", e.body_text()))?;
    subscription
        .validate()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()))?;

    match state.scheduler.notifier().store().upsert(&subscription).await {
        Ok(key) => {
            tracing::info!(key = %key, "push subscription stored");
            Ok((StatusCode::CREATED, Json(SubscribeResponse { key })))
        }
        Err(e) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "STORE_ERROR",
            e.to_string(),
        )),
    }
}

async fn vapid_public_key(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VapidKeyResponse>, ApiError> {
    match &state.vapid_public_key {
        Some(key) => Ok(Json(VapidKeyResponse {
            public_key: key.clone(),
        })),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            "PUSH_DISABLED",
            "push notifications are not configured",
        )),
    }
}
