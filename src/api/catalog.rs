//! Catalog API handler

use crate::catalog::{
    ModelOption, Provider, CATEGORY_OPTIONS, DEFAULT_CATEGORY, DEFAULT_MODEL, MODEL_OPTIONS,
    PROVIDERS,
};
use axum::response::Json;
use serde::Serialize;

/// Choices for the agent creator and the profile page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    /// Selectable models
    pub models: &'static [ModelOption],
    /// Selectable categories
    pub categories: &'static [&'static str],
    /// Providers accepting API keys
    pub providers: &'static [Provider],
    /// Preselected model
    pub default_model: &'static str,
    /// Preselected category
    pub default_category: &'static str,
}

/// GET /api/catalog - Static creator and profile choices
pub async fn get_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        models: MODEL_OPTIONS,
        categories: CATEGORY_OPTIONS,
        providers: PROVIDERS,
        default_model: DEFAULT_MODEL,
        default_category: DEFAULT_CATEGORY,
    })
}
