//! Profile and API key handlers
//!
//! Stored keys are never sent back; responses only say which providers are
//! connected.

use super::{AppContext, MessageResponse};
use crate::catalog::PROVIDERS;
use crate::error::AppError;
use crate::state::User;
use crate::validation::{validate_api_key, ValidationErrors};
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

/// Connection state of one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    /// Provider id
    pub id: String,
    /// Display name
    pub name: String,
    /// Whether a key is stored
    pub connected: bool,
}

/// The user profile without secrets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedProfile {
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Known providers and whether each has a key
    pub providers: Vec<ProviderStatus>,
    /// Every provider with a stored key, including ones outside the catalog
    pub connected_providers: Vec<String>,
}

impl From<&User> for MaskedProfile {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            providers: PROVIDERS
                .iter()
                .map(|p| ProviderStatus {
                    id: p.id.to_string(),
                    name: p.name.to_string(),
                    connected: user.has_api_key(p.id),
                })
                .collect(),
            connected_providers: user.api_keys.iter().map(|k| k.provider.clone()).collect(),
        }
    }
}

/// Profile update request
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New name (optional)
    pub name: Option<String>,
    /// New email (optional)
    pub email: Option<String>,
}

/// API key request
#[derive(Debug, Deserialize)]
pub struct SaveApiKeyRequest {
    /// The secret key
    pub key: String,
}

/// GET /api/profile - Masked user profile
pub async fn get_profile(State(ctx): State<AppContext>) -> Json<MaskedProfile> {
    let store = ctx.store.read().await;
    Json(MaskedProfile::from(store.user()))
}

/// PUT /api/profile - Update name and email
pub async fn update_profile(
    State(ctx): State<AppContext>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<MaskedProfile>, AppError> {
    let mut store = ctx.store.write().await;
    let name = request.name.unwrap_or_else(|| store.user().name.clone());
    let email = request.email.unwrap_or_else(|| store.user().email.clone());

    let mut errors = ValidationErrors::default();
    if name.trim().is_empty() {
        errors.add("name", "Name is required");
    }
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    store.update_profile(&name, &email)?;
    Ok(Json(MaskedProfile::from(store.user())))
}

/// PUT /api/profile/api-keys/:provider - Store a provider key
pub async fn save_api_key(
    State(ctx): State<AppContext>,
    Path(provider): Path<String>,
    Json(request): Json<SaveApiKeyRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_api_key(&provider, &request.key)?;

    ctx.store
        .write()
        .await
        .update_api_key(&provider, &request.key)?;

    Ok(Json(MessageResponse::ok(format!(
        "{} API key saved successfully",
        provider
    ))))
}

/// DELETE /api/profile/api-keys/:provider - Remove a provider key
pub async fn remove_api_key(
    State(ctx): State<AppContext>,
    Path(provider): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    ctx.store.write().await.remove_api_key(&provider)?;
    Ok(Json(MessageResponse::ok(format!(
        "{} API key removed",
        provider
    ))))
}
