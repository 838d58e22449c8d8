//! WebSocket handlers for real-time updates
//!
//! Streams store events to connected clients so a front end can refresh when
//! a deferred reply lands. Supports ping/pong for connection keepalive.

use crate::api::AppContext;
use crate::state::views::platform_stats;
use crate::state::StoreEvent;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{error, info, warn};

/// Control messages exchanged with clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum WebSocketMessage {
    /// Ping message for connection keepalive
    #[serde(rename = "ping")]
    Ping,
    /// Pong message responding to ping
    #[serde(rename = "pong")]
    Pong,
    /// Client fell behind and missed events; it should refetch
    #[serde(rename = "resync")]
    Resync {
        /// Number of events dropped
        missed: u64,
    },
}

/// WebSocket upgrade handler
///
/// Sends the current stats, then every store event as it happens.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(ctx): State<AppContext>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, ctx))
}

// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, ctx: AppContext) {
    let (mut sender, mut receiver) = socket.split();

    info!("WebSocket client connected");

    // Subscribe before reading the snapshot so no event falls in between
    let (initial_state, events) = {
        let store = ctx.store.read().await;
        let initial = serde_json::json!({
            "type": "initial_state",
            "stats": platform_stats(store.agents(), store.conversations()),
        });
        (initial, store.subscribe())
    };

    if let Err(e) = sender.send(Message::Text(initial_state.to_string())).await {
        error!("Failed to send initial state: {}", e);
        return;
    }

    // Use a channel to send messages from receiver to sender
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Message>();

    // Task to forward messages from channel to sender
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(msg).await {
                error!("Failed to send message: {}", e);
                break;
            }
        }
    });

    // Task to forward store events
    let event_tx = tx.clone();
    let mut event_task = tokio::spawn(async move {
        let mut events = BroadcastStream::new(events);
        while let Some(event) = events.next().await {
            let text = match event {
                Ok(event) => encode_event(&event),
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    warn!(missed, "WebSocket client lagged behind store events");
                    serde_json::to_string(&WebSocketMessage::Resync { missed }).ok()
                }
            };
            if let Some(text) = text {
                if event_tx.send(Message::Text(text)).is_err() {
                    break;
                }
            }
        }
    });

    // Receive messages
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Ok(ws_msg) = serde_json::from_str::<WebSocketMessage>(&text) {
                        match ws_msg {
                            WebSocketMessage::Ping => {
                                if let Ok(pong_msg) = serde_json::to_string(&WebSocketMessage::Pong)
                                {
                                    if tx.send(Message::Text(pong_msg)).is_err() {
                                        break;
                                    }
                                }
                            }
                            _ => {
                                warn!("Received unhandled WebSocket message: {:?}", ws_msg);
                            }
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket client disconnected");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for any task to complete
    tokio::select! {
        _ = &mut send_task => {
            event_task.abort();
            recv_task.abort();
        }
        _ = &mut event_task => {
            send_task.abort();
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
            event_task.abort();
        }
    }

    info!("WebSocket connection closed");
}

fn encode_event(event: &StoreEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(text) => Some(text),
        Err(e) => {
            error!("Failed to encode store event: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_messages_wire_format() {
        assert_eq!(
            serde_json::to_string(&WebSocketMessage::Pong).unwrap(),
            r#"{"type":"pong"}"#
        );
        let ping: WebSocketMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(ping, WebSocketMessage::Ping);
    }

    #[test]
    fn test_store_event_wire_format() {
        let text = encode_event(&StoreEvent::AgentPublished {
            agent_id: "a1".to_string(),
        })
        .unwrap();
        assert_eq!(text, r#"{"type":"agent_published","agent_id":"a1"}"#);
        assert_eq!(
            encode_event(&StoreEvent::ProfileUpdated).unwrap(),
            r#"{"type":"profile_updated"}"#
        );
    }
}
