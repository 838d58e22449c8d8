//! Explorer API handler

use super::AppContext;
use crate::state::views::{
    explorer_categories, explorer_results, format_model_name, ExplorerFilter,
};
use crate::state::Agent;
use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

/// Explorer query string: `?category=Coding&q=review`
#[derive(Debug, Default, Deserialize)]
pub struct ExploreQuery {
    /// Exact category, or "All"
    pub category: Option<String>,
    /// Search text
    pub q: Option<String>,
}

/// An agent as shown on a card, with a readable model name
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// The agent record
    #[serde(flatten)]
    pub agent: Agent,
    /// `gpt-3.5-turbo` shown as `Gpt 3.5 Turbo`
    pub model_label: String,
}

impl From<&Agent> for AgentCard {
    fn from(agent: &Agent) -> Self {
        Self {
            model_label: format_model_name(&agent.model),
            agent: agent.clone(),
        }
    }
}

/// Explorer response
#[derive(Debug, Serialize)]
pub struct ExploreResponse {
    /// Matching published agents
    pub agents: Vec<AgentCard>,
    /// Category choices, starting with "All"
    pub categories: Vec<String>,
    /// Number of matches
    pub count: usize,
}

/// GET /api/explore - Search published agents
pub async fn explore(
    State(ctx): State<AppContext>,
    Query(query): Query<ExploreQuery>,
) -> Json<ExploreResponse> {
    let filter = ExplorerFilter::new(query.category, query.q.unwrap_or_default());
    let store = ctx.store.read().await;
    let agents: Vec<AgentCard> = explorer_results(store.agents(), &filter)
        .into_iter()
        .map(AgentCard::from)
        .collect();

    Json(ExploreResponse {
        count: agents.len(),
        categories: explorer_categories(store.agents()),
        agents,
    })
}
