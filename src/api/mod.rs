//! API module
//!
//! HTTP handlers through which a front end reads store snapshots and
//! triggers store operations.

pub mod agents;
pub mod catalog;
pub mod chat;
pub mod explorer;
pub mod home;
pub mod profile;

use crate::chat::ReplyScheduler;
use crate::config::Config;
use crate::state::{AgentStore, SharedStore};
use crate::websocket;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Everything a handler needs, injected as router state
#[derive(Clone)]
pub struct AppContext {
    /// The agent store
    pub store: SharedStore,
    /// Pending simulated replies
    pub replies: Arc<ReplyScheduler>,
}

impl AppContext {
    /// Wrap a loaded store and build the reply scheduler from `config`
    pub fn new(store: AgentStore, config: &Config) -> Self {
        Self {
            store: store.into_shared(),
            replies: Arc::new(ReplyScheduler::new(config.chat.reply_delay())),
        }
    }
}

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
    /// Status indicator (e.g., "ok", "error")
    pub status: String,
}

impl MessageResponse {
    /// Successful response carrying `message`
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: "ok".to_string(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

/// Build the application router
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/catalog", get(catalog::get_catalog))
        // Agent management
        .route(
            "/api/agents",
            get(agents::list_agents).post(agents::create_agent),
        )
        .route("/api/agents/mine", get(agents::my_agents))
        .route(
            "/api/agents/:id",
            get(agents::get_agent)
                .put(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route("/api/agents/:id/publish", post(agents::publish_agent))
        .route("/api/explore", get(explorer::explore))
        // Chat
        .route("/api/chat/:id", get(chat::resolve_chat))
        .route(
            "/api/chat/:id/messages",
            get(chat::list_messages).post(chat::send_message),
        )
        .route("/api/home", get(home::home))
        // Profile
        .route(
            "/api/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/api/profile/api-keys/:provider",
            put(profile::save_api_key).delete(profile::remove_api_key),
        )
        // WebSocket for store events
        .route("/ws", get(websocket::websocket_handler))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()) // Allow CORS for a locally served front end
        .with_state(ctx)
}

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Agent hub is healthy".to_string(),
    })
}
