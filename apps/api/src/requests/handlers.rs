use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::request::{CvRequest, RequestStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: RequestStatus,
}

/// GET /api/v1/requests
pub async fn handle_list_requests(State(state): State<AppState>) -> Json<Vec<CvRequest>> {
    Json(state.requests.list().await)
}

/// PATCH /api/v1/requests/:id
pub async fn handle_update_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<CvRequest>, AppError> {
    state
        .requests
        .set_status(&id, update.status)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Request {id} not found")))
}
