use axum::{extract::State, http::StatusCode};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

/// DELETE /api/v1/data
/// Wipes versions, profile, requests and favorites through their stores so each
/// clear waits on that store's writers. Open wizards are left alone.
pub async fn handle_reset_data(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.cv.versions.clear_all().await;
    state.lm.versions.clear_all().await;
    state.profile.clear().await?;
    state.requests.clear().await?;
    state.templates.clear_favorites().await?;
    info!("All stored data cleared ({})", state.backend.name());
    Ok(StatusCode::NO_CONTENT)
}
