//! Chat API endpoints
//!
//! Resolves chat views and records messages.

use super::explorer::AgentCard;
use super::AppContext;
use crate::chat::{service, Message};
use crate::error::AppError;
use crate::state::AgentId;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::{Deserialize, Serialize};

/// Where the chat view sends users when the agent cannot be resolved
pub const FALLBACK_VIEW: &str = "/explore";

/// Request to send a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Message content
    pub content: String,
}

/// Chat view: the agent and its conversation
#[derive(Debug, Serialize)]
pub struct ChatViewResponse {
    /// The agent being chatted with
    pub agent: AgentCard,
    /// Messages in insertion order
    pub messages: Vec<Message>,
}

/// Messages of one conversation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesResponse {
    /// Owning agent id
    pub agent_id: AgentId,
    /// Messages in insertion order
    pub messages: Vec<Message>,
    /// Number of messages
    pub count: usize,
}

/// GET /api/chat/:id - Resolve a chat view
///
/// Redirects to the explorer when the agent does not exist.
pub async fn resolve_chat(State(ctx): State<AppContext>, Path(id): Path<AgentId>) -> Response {
    let store = ctx.store.read().await;
    match store.agent(&id) {
        Some(agent) => Json(ChatViewResponse {
            agent: AgentCard::from(agent),
            messages: store.messages(&id).to_vec(),
        })
        .into_response(),
        None => {
            tracing::debug!(agent_id = %id, "Chat target missing, redirecting");
            Redirect::to(FALLBACK_VIEW).into_response()
        }
    }
}

/// GET /api/chat/:id/messages - Conversation messages
pub async fn list_messages(
    State(ctx): State<AppContext>,
    Path(id): Path<AgentId>,
) -> Json<MessagesResponse> {
    let store = ctx.store.read().await;
    let messages = store.messages(&id).to_vec();
    Json(MessagesResponse {
        agent_id: id,
        count: messages.len(),
        messages,
    })
}

/// POST /api/chat/:id/messages - Send a user message
///
/// The simulated reply is appended later and announced on the WebSocket.
pub async fn send_message(
    State(ctx): State<AppContext>,
    Path(id): Path<AgentId>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message = service::send_message(&ctx.store, &ctx.replies, &id, &request.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
