use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and storage medium.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let open_wizards = state.cv.wizards.len().await + state.lm.wizards.len().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cvlm-api",
        "storage": state.backend.name(),
        "openWizards": open_wizards,
    }))
}
