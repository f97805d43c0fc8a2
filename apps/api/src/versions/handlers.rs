use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::version::{Version, VersionHistory, VersionPatch, VersionSummary};
use crate::state::{AppState, ServedDocument};
use crate::versions::store::SaveOptions;

#[derive(Debug, Deserialize)]
pub struct ProfileTypeQuery {
    pub profile_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVersionRequest<D> {
    #[serde(default)]
    pub profile_type: String,
    pub data: D,
    pub name: Option<String>,
    pub template_id: Option<String>,
    pub template_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

fn version_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Version {id} not found"))
}

fn json_attachment(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

/// GET /api/v1/{cv|lm}/versions
pub async fn handle_list_versions<D: ServedDocument>(
    State(state): State<AppState>,
    Query(query): Query<ProfileTypeQuery>,
) -> Json<Vec<Version<D>>> {
    let versions = &D::services(&state).versions;
    let listed = match query.profile_type.as_deref() {
        Some(profile_type) => versions.by_profile_type(profile_type).await,
        None => versions.sorted_for_display().await,
    };
    Json(listed)
}

/// POST /api/v1/{cv|lm}/versions
pub async fn handle_save_version<D: ServedDocument>(
    State(state): State<AppState>,
    Json(req): Json<SaveVersionRequest<D>>,
) -> (StatusCode, Json<Version<D>>) {
    let profile_type = if req.profile_type.trim().is_empty() {
        req.data.headline().to_string()
    } else {
        req.profile_type
    };
    let version = D::services(&state)
        .versions
        .save(
            &profile_type,
            req.data,
            SaveOptions {
                name: req.name,
                template_id: req.template_id,
                template_name: req.template_name,
            },
        )
        .await;
    (StatusCode::CREATED, Json(version))
}

/// DELETE /api/v1/{cv|lm}/versions
pub async fn handle_clear_versions<D: ServedDocument>(State(state): State<AppState>) -> StatusCode {
    let versions = &D::services(&state).versions;
    if versions.has_any().await {
        versions.clear_all().await;
    }
    StatusCode::NO_CONTENT
}

/// GET /api/v1/{cv|lm}/versions/grouped
pub async fn handle_grouped_versions<D: ServedDocument>(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, Vec<Version<D>>>> {
    Json(D::services(&state).versions.group_by_profile_type().await)
}

/// GET /api/v1/{cv|lm}/versions/profile-types
pub async fn handle_profile_types<D: ServedDocument>(
    State(state): State<AppState>,
) -> Json<Vec<String>> {
    Json(D::services(&state).versions.profile_types().await)
}

/// GET /api/v1/{cv|lm}/versions/summaries
pub async fn handle_version_summaries<D: ServedDocument>(
    State(state): State<AppState>,
) -> Json<Vec<VersionSummary>> {
    Json(D::services(&state).versions.summaries().await)
}

/// GET /api/v1/{cv|lm}/versions/history
pub async fn handle_version_history<D: ServedDocument>(
    State(state): State<AppState>,
) -> Json<VersionHistory<D>> {
    Json(D::services(&state).versions.history().await)
}

/// GET /api/v1/{cv|lm}/versions/export
pub async fn handle_export_all<D: ServedDocument>(
    State(state): State<AppState>,
) -> impl IntoResponse {
    json_attachment(D::services(&state).versions.export_all().await)
}

/// POST /api/v1/{cv|lm}/versions/import
///
/// Body is the raw JSON text produced by the single-version export.
pub async fn handle_import_version<D: ServedDocument>(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<Version<D>>), AppError> {
    let version = D::services(&state).versions.import(&body).await?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// GET /api/v1/{cv|lm}/versions/:id
pub async fn handle_get_version<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Version<D>>, AppError> {
    D::services(&state)
        .versions
        .get_by_id(&id)
        .await
        .map(Json)
        .ok_or_else(|| version_not_found(&id))
}

/// PATCH /api/v1/{cv|lm}/versions/:id
pub async fn handle_update_version<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<VersionPatch<D>>,
) -> Result<Json<Version<D>>, AppError> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("Version name cannot be empty".to_string()));
    }
    D::services(&state)
        .versions
        .update(&id, patch)
        .await
        .map(Json)
        .ok_or_else(|| version_not_found(&id))
}

/// PUT /api/v1/{cv|lm}/versions/:id/name
pub async fn handle_rename_version<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<Version<D>>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Version name cannot be empty".to_string()));
    }
    D::services(&state)
        .versions
        .rename(&id, name)
        .await
        .map(Json)
        .ok_or_else(|| version_not_found(&id))
}

/// DELETE /api/v1/{cv|lm}/versions/:id
pub async fn handle_delete_version<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if D::services(&state).versions.delete(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(version_not_found(&id))
    }
}

/// GET /api/v1/{cv|lm}/versions/:id/export
pub async fn handle_export_version<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let json = D::services(&state)
        .versions
        .export(&id)
        .await
        .ok_or_else(|| version_not_found(&id))?;
    Ok(json_attachment(json))
}
