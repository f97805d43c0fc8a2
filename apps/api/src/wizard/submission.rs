//! Submission pipeline: validate → relay → persist version → record request.
//!
//! The wizard lock is released while the relay call is in flight, so concurrent
//! navigation observes `sending` and is refused rather than queued.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::request::CvRequest;
use crate::models::version::Version;
use crate::relay::{relay_body, FormRelay};
use crate::requests::RequestLog;
use crate::versions::store::{SaveOptions, VersionStore};
use crate::wizard::sessions::SharedWizard;
use crate::wizard::steps::WizardForm;

/// Collaborators a submission needs.
pub struct SubmissionContext<'a, D: WizardForm> {
    pub relay: &'a dyn FormRelay,
    pub versions: &'a VersionStore<D>,
    pub requests: &'a RequestLog,
    pub redirect_after_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt<D> {
    pub version: Version<D>,
    pub request: CvRequest,
    /// How long the client shows the success state before navigating away.
    pub redirect_after_ms: u64,
}

pub async fn submit_wizard<D: WizardForm>(
    ctx: SubmissionContext<'_, D>,
    wizard: &SharedWizard<D>,
) -> Result<SubmissionReceipt<D>, AppError> {
    let kind = D::KIND;

    let (payload, template, profile_type) = {
        let mut guard = wizard.lock().await;
        let payload = guard.begin_submit()?;
        (
            payload,
            guard.template().cloned(),
            guard.profile_type().map(str::to_string),
        )
    };

    let template_name = template.as_ref().map(|t| t.name.as_str());
    let relayed = match relay_body(&payload, template_name, Utc::now()) {
        Ok(body) => ctx.relay.submit(kind, &body).await,
        Err(e) => Err(e),
    };

    if let Err(e) = relayed {
        warn!("{} submission failed: {e}", kind.label());
        wizard.lock().await.complete(Err(e.user_message().to_string()))?;
        return Err(AppError::Relay(e));
    }

    let profile_type = profile_type.unwrap_or_else(|| payload.headline().to_string());
    let version = ctx
        .versions
        .save(
            &profile_type,
            payload,
            SaveOptions {
                name: None,
                template_id: template.as_ref().map(|t| t.id.clone()),
                template_name: template.as_ref().map(|t| t.name.clone()),
            },
        )
        .await;

    let request = ctx
        .requests
        .record(
            kind,
            template_name.unwrap_or_else(|| kind.fallback_template_name()),
        )
        .await;

    wizard.lock().await.complete(Ok(()))?;
    info!("{} submission succeeded as version {}", kind.label(), version.id);

    Ok(SubmissionReceipt {
        version,
        request,
        redirect_after_ms: ctx.redirect_after_ms,
    })
}
