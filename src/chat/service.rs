//! Chat flows that span the store and the reply scheduler

use super::models::{Message, MessageRole};
use super::scheduler::ReplyScheduler;
use crate::error::AppError;
use crate::state::SharedStore;
use crate::validation::validate_chat_message;
use std::sync::Arc;
use tracing::info;

/// Record a user message and schedule the agent's reply
///
/// Blank input is rejected before anything is stored. The content is kept
/// as typed.
pub async fn send_message(
    store: &SharedStore,
    replies: &ReplyScheduler,
    agent_id: &str,
    content: &str,
) -> Result<Message, AppError> {
    validate_chat_message(content)?;

    let (agent, message) = {
        let mut store = store.write().await;
        let agent = store
            .agent(agent_id)
            .cloned()
            .ok_or_else(|| AppError::AgentNotFound(agent_id.to_string()))?;
        let message = store.add_message(agent_id, content, MessageRole::User)?;
        (agent, message)
    };

    replies.schedule(Arc::clone(store), &agent, content);
    Ok(message)
}

/// Delete an agent, its conversation and any reply still pending for it
///
/// Returns `false` when there was nothing to delete.
pub async fn delete_agent(
    store: &SharedStore,
    replies: &ReplyScheduler,
    agent_id: &str,
) -> Result<bool, AppError> {
    let cancelled = replies.cancel(agent_id);
    let deleted = store.write().await.delete_agent(agent_id)?;
    if deleted {
        info!(agent_id = %agent_id, cancelled_replies = cancelled, "Agent removed");
    }
    Ok(deleted)
}
