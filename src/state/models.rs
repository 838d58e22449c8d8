//! Agent and user data models
//!
//! Serialized field names follow the persisted blob layout (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an agent
pub type AgentId = String;

/// A user-authored agent definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Unique identifier, immutable after creation
    pub id: AgentId,
    /// Display name of the agent
    pub name: String,
    /// What the agent does
    pub description: String,
    /// Identifier of the target model (e.g. "gpt-4")
    pub model: String,
    /// Explorer category
    pub category: String,
    /// Behavior instructions
    pub instructions: String,
    /// Attribution string
    pub created_by: String,
    /// When the agent was created
    pub created_at: DateTime<Utc>,
    /// Whether the agent is visible in the explorer
    pub published: bool,
}

impl Agent {
    /// Generate a new unique ID for an agent
    /// Uses UUID v4 for uniqueness
    pub fn generate_id() -> AgentId {
        Uuid::new_v4().to_string()
    }
}

/// Fields supplied when creating an agent
///
/// The store assigns `id` and `createdAt`; new agents always start unpublished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    /// Display name of the agent
    pub name: String,
    /// What the agent does
    pub description: String,
    /// Identifier of the target model
    pub model: String,
    /// Explorer category
    pub category: String,
    /// Behavior instructions
    pub instructions: String,
    /// Attribution string
    pub created_by: String,
}

impl NewAgent {
    pub(crate) fn into_agent(self, id: AgentId, created_at: DateTime<Utc>) -> Agent {
        Agent {
            id,
            name: self.name,
            description: self.description,
            model: self.model,
            category: self.category,
            instructions: self.instructions,
            created_by: self.created_by,
            created_at,
            published: false,
        }
    }
}

/// An API key for one model provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey {
    /// Provider identifier (e.g. "openai")
    pub provider: String,
    /// Secret key
    pub key: String,
}

/// The single local user profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Display name, also used as `createdBy` for new agents
    pub name: String,
    /// Contact email
    pub email: String,
    /// Stored provider keys, at most one per provider
    pub api_keys: Vec<ApiKey>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            name: "Demo User".to_string(),
            email: "user@example.com".to_string(),
            api_keys: Vec::new(),
        }
    }
}

impl User {
    /// Key stored for `provider`, if any
    pub fn api_key(&self, provider: &str) -> Option<&ApiKey> {
        self.api_keys.iter().find(|k| k.provider == provider)
    }

    /// Whether a key is stored for `provider`
    pub fn has_api_key(&self, provider: &str) -> bool {
        self.api_key(provider).is_some()
    }
}
