//! Home view API handler

use super::AppContext;
use crate::chat::Message;
use crate::state::views::{platform_stats, recent_chats, PlatformStats, RECENT_CHATS_LIMIT};
use crate::state::Agent;
use axum::{extract::State, response::Json};
use serde::Serialize;

/// One entry of the recent chats list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentChatResponse {
    /// The agent
    pub agent: Agent,
    /// Last message of its conversation
    pub last_message: Message,
}

/// Home view response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    /// Platform counts
    pub stats: PlatformStats,
    /// Most recent conversations, newest first
    pub recent_chats: Vec<RecentChatResponse>,
}

/// GET /api/home - Stats and recent chats
pub async fn home(State(ctx): State<AppContext>) -> Json<HomeResponse> {
    let store = ctx.store.read().await;
    let recent = recent_chats(store.agents(), store.conversations(), RECENT_CHATS_LIMIT)
        .into_iter()
        .map(|chat| RecentChatResponse {
            agent: chat.agent.clone(),
            last_message: chat.last_message.clone(),
        })
        .collect();

    Json(HomeResponse {
        stats: platform_stats(store.agents(), store.conversations()),
        recent_chats: recent,
    })
}
