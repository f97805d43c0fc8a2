use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::template::Template;
use crate::models::version::DocumentKind;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub kind: Option<DocumentKind>,
    #[serde(default)]
    pub favorites: bool,
}

/// GET /api/v1/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Json<Vec<Template>> {
    Json(state.templates.list(query.kind, query.favorites).await)
}

/// GET /api/v1/templates/count
pub async fn handle_template_count(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "total": state.templates.total_count() }))
}

/// POST /api/v1/templates/:id/favorite
pub async fn handle_toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Template>, AppError> {
    state
        .templates
        .toggle_favorite(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Template {id} not found")))
}
