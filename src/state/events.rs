//! Store change notifications

use crate::chat::Message;
use crate::state::AgentId;
use serde::{Deserialize, Serialize};

/// Emitted after every committed store mutation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A new agent was appended
    AgentCreated {
        /// ID of the new agent
        agent_id: AgentId,
    },
    /// An agent record was replaced
    AgentUpdated {
        /// ID of the updated agent
        agent_id: AgentId,
    },
    /// An agent became visible in the explorer
    AgentPublished {
        /// ID of the published agent
        agent_id: AgentId,
    },
    /// An agent and its conversation were removed
    AgentDeleted {
        /// ID of the deleted agent
        agent_id: AgentId,
    },
    /// A message was appended to a conversation
    MessageAdded {
        /// The appended message
        message: Message,
    },
    /// The user profile or its API keys changed
    ProfileUpdated,
}
