use axum::{extract::State, Json};

use crate::models::profile::{ProfilePatch, UserProfile};
use crate::state::AppState;

/// GET /api/v1/profile
pub async fn handle_get_profile(State(state): State<AppState>) -> Json<UserProfile> {
    Json(state.profile.get().await)
}

/// PATCH /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Json(patch): Json<ProfilePatch>,
) -> Json<UserProfile> {
    Json(state.profile.update(patch).await)
}
