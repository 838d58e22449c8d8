//! Agent management API handlers
//!
//! Contains HTTP request handlers for agent CRUD operations and publishing.

use super::{AppContext, MessageResponse};
use crate::catalog::{DEFAULT_CATEGORY, DEFAULT_MODEL};
use crate::chat::service;
use crate::error::AppError;
use crate::state::views::my_agents as unpublished;
use crate::state::{Agent, AgentId, NewAgent};
use crate::validation::validate_new_agent;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

/// Agents list response
#[derive(Debug, Serialize)]
pub struct AgentsListResponse {
    /// Agents in creation order
    pub agents: Vec<Agent>,
    /// Total number of agents returned
    pub count: usize,
}

impl AgentsListResponse {
    fn new(agents: Vec<Agent>) -> Self {
        Self {
            count: agents.len(),
            agents,
        }
    }
}

/// Create agent request
#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    /// Name for the new agent
    pub name: String,
    /// What the agent does
    pub description: String,
    /// Target model (defaults to the catalog default)
    pub model: Option<String>,
    /// Category (defaults to the catalog default)
    pub category: Option<String>,
    /// Behavior instructions
    pub instructions: String,
    /// Publish right after creation
    #[serde(default)]
    pub publish: bool,
}

/// Update agent request
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAgentRequest {
    /// New name (optional)
    pub name: Option<String>,
    /// New description (optional)
    pub description: Option<String>,
    /// New model (optional)
    pub model: Option<String>,
    /// New category (optional)
    pub category: Option<String>,
    /// New instructions (optional)
    pub instructions: Option<String>,
}

/// GET /api/agents - List all agents
pub async fn list_agents(State(ctx): State<AppContext>) -> Json<AgentsListResponse> {
    let store = ctx.store.read().await;
    Json(AgentsListResponse::new(store.agents().to_vec()))
}

/// GET /api/agents/mine - List unpublished agents
pub async fn my_agents(State(ctx): State<AppContext>) -> Json<AgentsListResponse> {
    let store = ctx.store.read().await;
    let agents = unpublished(store.agents()).into_iter().cloned().collect();
    Json(AgentsListResponse::new(agents))
}

/// GET /api/agents/:id - Get a specific agent
pub async fn get_agent(
    State(ctx): State<AppContext>,
    Path(id): Path<AgentId>,
) -> Result<Json<Agent>, AppError> {
    let store = ctx.store.read().await;
    let agent = store
        .agent(&id)
        .cloned()
        .ok_or_else(|| AppError::AgentNotFound(id.clone()))?;

    Ok(Json(agent))
}

/// POST /api/agents - Create a new agent
pub async fn create_agent(
    State(ctx): State<AppContext>,
    Json(request): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<Agent>), AppError> {
    let mut store = ctx.store.write().await;
    let new_agent = NewAgent {
        name: request.name,
        description: request.description,
        model: request.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        category: request
            .category
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        instructions: request.instructions,
        created_by: store.user().name.clone(),
    };

    validate_new_agent(&new_agent)?;

    let id = store.create_agent(new_agent)?;
    // The agent exists either way; it stays a draft if publishing fails
    if request.publish {
        if let Err(e) = store.publish_agent(&id) {
            tracing::warn!(agent_id = %id, error = %e, "Created agent but failed to publish it");
        }
    }

    let agent = store
        .agent(&id)
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Agent not found after creation")))?;

    Ok((StatusCode::CREATED, Json(agent)))
}

/// PUT /api/agents/:id - Update an agent
pub async fn update_agent(
    State(ctx): State<AppContext>,
    Path(id): Path<AgentId>,
    Json(request): Json<UpdateAgentRequest>,
) -> Result<Json<Agent>, AppError> {
    let mut store = ctx.store.write().await;
    let mut agent = store
        .agent(&id)
        .cloned()
        .ok_or_else(|| AppError::AgentNotFound(id.clone()))?;

    if let Some(name) = request.name {
        agent.name = name;
    }
    if let Some(description) = request.description {
        agent.description = description;
    }
    if let Some(model) = request.model {
        agent.model = model;
    }
    if let Some(category) = request.category {
        agent.category = category;
    }
    if let Some(instructions) = request.instructions {
        agent.instructions = instructions;
    }

    // Validate updated agent
    validate_new_agent(&NewAgent {
        name: agent.name.clone(),
        description: agent.description.clone(),
        model: agent.model.clone(),
        category: agent.category.clone(),
        instructions: agent.instructions.clone(),
        created_by: agent.created_by.clone(),
    })?;

    store.update_agent(agent)?;

    let agent = store
        .agent(&id)
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Agent not found after update")))?;

    Ok(Json(agent))
}

/// DELETE /api/agents/:id - Delete an agent and its conversation
pub async fn delete_agent(
    State(ctx): State<AppContext>,
    Path(id): Path<AgentId>,
) -> Result<Json<MessageResponse>, AppError> {
    if !service::delete_agent(&ctx.store, &ctx.replies, &id).await? {
        return Err(AppError::AgentNotFound(id));
    }

    Ok(Json(MessageResponse::ok("Agent deleted successfully")))
}

/// POST /api/agents/:id/publish - Publish an agent to the explorer
pub async fn publish_agent(
    State(ctx): State<AppContext>,
    Path(id): Path<AgentId>,
) -> Result<Json<Agent>, AppError> {
    let mut store = ctx.store.write().await;
    store.publish_agent(&id)?;

    let agent = store
        .agent(&id)
        .cloned()
        .ok_or_else(|| AppError::AgentNotFound(id.clone()))?;

    Ok(Json(agent))
}
