//! Derived views
//!
//! Pure functions over a store snapshot. Nothing here is persisted.

use super::models::Agent;
use crate::chat::{Conversations, Message};
use serde::{Deserialize, Serialize};

/// Category filter value meaning "no category restriction"
pub const ALL_CATEGORIES: &str = "All";

/// Number of entries shown in the recent chats list
pub const RECENT_CHATS_LIMIT: usize = 3;

/// Agents that are not published yet
pub fn my_agents(agents: &[Agent]) -> Vec<&Agent> {
    agents.iter().filter(|a| !a.published).collect()
}

/// Agents visible in the explorer
pub fn published_agents(agents: &[Agent]) -> Vec<&Agent> {
    agents.iter().filter(|a| a.published).collect()
}

/// Explorer category and search filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerFilter {
    /// Exact category, `None` or `"All"` for every category
    pub category: Option<String>,
    /// Case-insensitive substring of name or description; empty matches all
    pub query: String,
}

impl ExplorerFilter {
    /// Build a filter from raw category and query inputs
    pub fn new(category: Option<String>, query: impl Into<String>) -> Self {
        Self {
            category,
            query: query.into(),
        }
    }

    /// Whether `agent` passes both the category and the text filter
    ///
    /// Publication is checked separately by [`explorer_results`].
    pub fn matches(&self, agent: &Agent) -> bool {
        let category_match = match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) => true,
            Some(category) => agent.category == category,
        };
        if !category_match {
            return false;
        }
        if self.query.is_empty() {
            return true;
        }

        let query = self.query.to_lowercase();
        agent.name.to_lowercase().contains(&query)
            || agent.description.to_lowercase().contains(&query)
    }
}

/// Published agents matching `filter`, in store order
pub fn explorer_results<'a>(agents: &'a [Agent], filter: &ExplorerFilter) -> Vec<&'a Agent> {
    published_agents(agents)
        .into_iter()
        .filter(|a| filter.matches(a))
        .collect()
}

/// `"All"` followed by the distinct categories of published agents
pub fn explorer_categories(agents: &[Agent]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for agent in published_agents(agents) {
        if !categories.contains(&agent.category) {
            categories.push(agent.category.clone());
        }
    }
    categories
}

/// An agent paired with the last message of its conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentChat<'a> {
    /// The agent
    pub agent: &'a Agent,
    /// Last message of its conversation
    pub last_message: &'a Message,
}

/// Most recently active conversations, newest first
///
/// Conversations whose agent no longer exists, or that are empty, are skipped.
pub fn recent_chats<'a>(
    agents: &'a [Agent],
    conversations: &'a Conversations,
    limit: usize,
) -> Vec<RecentChat<'a>> {
    let mut chats: Vec<RecentChat<'a>> = conversations
        .iter()
        .filter_map(|(agent_id, messages)| {
            let agent = agents.iter().find(|a| &a.id == agent_id)?;
            let last_message = messages.last()?;
            Some(RecentChat {
                agent,
                last_message,
            })
        })
        .collect();

    chats.sort_by(|a, b| b.last_message.timestamp.cmp(&a.last_message.timestamp));
    chats.truncate(limit);
    chats
}

/// Counts shown on the home view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    /// Number of agents
    pub total_agents: usize,
    /// Number of published agents
    pub published_agents: usize,
    /// Number of unpublished agents
    pub unpublished_agents: usize,
    /// Number of conversation entries
    pub conversations: usize,
}

/// Compute [`PlatformStats`] for a snapshot
pub fn platform_stats(agents: &[Agent], conversations: &Conversations) -> PlatformStats {
    let published = agents.iter().filter(|a| a.published).count();
    PlatformStats {
        total_agents: agents.len(),
        published_agents: published,
        unpublished_agents: agents.len() - published,
        conversations: conversations.len(),
    }
}

/// Human readable model name: `gpt-3.5-turbo` -> `Gpt 3.5 Turbo`
pub fn format_model_name(model: &str) -> String {
    model
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
