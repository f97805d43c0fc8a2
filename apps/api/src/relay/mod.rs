//! Form relay: posts completed forms to a third-party form-submission service
//! (Formspree) that forwards them to the operator's inbox.
//!
//! `AppState` holds an `Arc<dyn FormRelay>` so tests can swap in a stub.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::version::DocumentKind;

/// Template label sent when the user did not pick one.
pub const NO_TEMPLATE_LABEL: &str = "Sans modèle";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Relay rejected the submission (status {status})")]
    Rejected { status: u16 },

    #[error("Could not encode the form: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RelayError {
    /// Message shown to the user next to the retry affordance.
    pub fn user_message(&self) -> &'static str {
        match self {
            RelayError::Http(_) => "Erreur de connexion. Veuillez réessayer.",
            RelayError::Rejected { .. } | RelayError::Encode(_) => {
                "Erreur lors de l'envoi du formulaire"
            }
        }
    }
}

#[async_trait]
pub trait FormRelay: Send + Sync {
    async fn submit(&self, kind: DocumentKind, body: &Value) -> Result<(), RelayError>;
}

/// JSON body posted to the relay: the form fields flattened, plus the template name
/// and the submission time.
pub fn relay_body<D: Serialize>(
    data: &D,
    template_name: Option<&str>,
    timestamp: DateTime<Utc>,
) -> Result<Value, RelayError> {
    let mut body = serde_json::to_value(data)?;
    if let Some(map) = body.as_object_mut() {
        map.insert(
            "templateName".to_string(),
            Value::String(template_name.unwrap_or(NO_TEMPLATE_LABEL).to_string()),
        );
        map.insert(
            "timestamp".to_string(),
            Value::String(timestamp.to_rfc3339()),
        );
    }
    Ok(body)
}

/// Relay over Formspree, one endpoint per document kind. Success is any 2xx.
#[derive(Clone)]
pub struct FormspreeRelay {
    client: Client,
    cv_url: String,
    lm_url: String,
}

impl FormspreeRelay {
    /// `timeout: None` leaves requests bounded only by the network stack.
    pub fn new(cv_url: String, lm_url: String, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            client: builder.build().expect("Failed to build HTTP client"),
            cv_url,
            lm_url,
        }
    }

    fn url_for(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Cv => &self.cv_url,
            DocumentKind::Lm => &self.lm_url,
        }
    }
}

#[async_trait]
impl FormRelay for FormspreeRelay {
    async fn submit(&self, kind: DocumentKind, body: &Value) -> Result<(), RelayError> {
        let response = self
            .client
            .post(self.url_for(kind))
            .header("accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Relay returned {status} for {} form: {detail}", kind.label());
            return Err(RelayError::Rejected {
                status: status.as_u16(),
            });
        }

        info!("{} form relayed ({status})", kind.label());
        Ok(())
    }
}
