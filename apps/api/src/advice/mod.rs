//! CV advice via the optional text-generation provider. Never fails: every problem
//! degrades to a static message so the primary flow is never blocked.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{cv_advice_prompt, CV_ADVICE_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::state::AppState;

pub const MISSING_KEY_MESSAGE: &str = "Clé API manquante. Impossible de générer des conseils.";
pub const NO_ADVICE_MESSAGE: &str = "Aucun conseil disponible pour le moment.";
pub const UNREACHABLE_MESSAGE: &str = "Impossible de contacter l'IA pour le moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceSource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    pub job_title: String,
    pub text: String,
    pub source: AdviceSource,
}

fn fallback(job_title: &str, text: &str) -> Advice {
    Advice {
        job_title: job_title.to_string(),
        text: text.to_string(),
        source: AdviceSource::Fallback,
    }
}

/// Maps a provider outcome onto the advice shown to the user.
fn advice_from_outcome(job_title: &str, outcome: Result<String, LlmError>) -> Advice {
    match outcome {
        Ok(text) => Advice {
            job_title: job_title.to_string(),
            text,
            source: AdviceSource::Ai,
        },
        Err(LlmError::EmptyContent) => fallback(job_title, NO_ADVICE_MESSAGE),
        Err(e) => {
            error!("Advice generation failed: {e}");
            fallback(job_title, UNREACHABLE_MESSAGE)
        }
    }
}

pub async fn generate_cv_advice(llm: Option<&LlmClient>, job_title: &str) -> Advice {
    let Some(llm) = llm else {
        warn!("Advice requested but no API key is configured");
        return fallback(job_title, MISSING_KEY_MESSAGE);
    };
    let outcome = llm
        .call_text(&cv_advice_prompt(job_title), CV_ADVICE_SYSTEM)
        .await;
    advice_from_outcome(job_title, outcome)
}

#[derive(Debug, Deserialize)]
pub struct AdviceQuery {
    pub job_title: String,
}

/// GET /api/v1/advice?job_title=…
pub async fn handle_cv_advice(
    State(state): State<AppState>,
    Query(query): Query<AdviceQuery>,
) -> Result<Json<Advice>, AppError> {
    if query.job_title.trim().is_empty() {
        return Err(AppError::Validation("job_title cannot be empty".to_string()));
    }
    Ok(Json(
        generate_cv_advice(state.llm.as_ref(), query.job_title.trim()).await,
    ))
}
