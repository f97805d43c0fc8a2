use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::{AppState, ServedDocument};
use crate::wizard::sessions::SharedWizard;
use crate::wizard::steps::WizardOptions;
use crate::wizard::submission::{submit_wizard, SubmissionContext, SubmissionReceipt};
use crate::wizard::{FormWizard, TemplateRef, WizardView};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenWizardRequest {
    /// Gallery template the form is filled for.
    pub template_id: Option<String>,
    /// Start from a saved version instead of the profile.
    pub from_version: Option<String>,
    #[serde(default)]
    pub generate_cover_letter: bool,
    pub profile_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WizardSession<D> {
    pub id: Uuid,
    #[serde(flatten)]
    pub view: WizardView<D>,
}

#[derive(Debug, Deserialize)]
pub struct FieldsUpdate {
    pub fields: Map<String, Value>,
}

async fn find_wizard<D: ServedDocument>(
    state: &AppState,
    id: Uuid,
) -> Result<SharedWizard<D>, AppError> {
    D::services(state)
        .wizards
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Wizard {id} not found")))
}

async fn resolve_template<D: ServedDocument>(
    state: &AppState,
    template_id: &str,
) -> Result<TemplateRef, AppError> {
    let template = state
        .templates
        .get(template_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Template {template_id} not found")))?;
    if template.kind != D::KIND {
        return Err(AppError::Validation(format!(
            "Template {template_id} is not a {} template",
            D::KIND.label()
        )));
    }
    Ok(TemplateRef {
        id: template.id,
        name: template.name,
    })
}

/// POST /api/v1/{cv|lm}/wizards
pub async fn handle_open_wizard<D: ServedDocument>(
    State(state): State<AppState>,
    Json(req): Json<OpenWizardRequest>,
) -> Result<(StatusCode, Json<WizardSession<D>>), AppError> {
    let services = D::services(&state);

    let mut template = match req.template_id.as_deref() {
        Some(id) => Some(resolve_template::<D>(&state, id).await?),
        None => None,
    };
    let mut profile_type = req.profile_type;

    let data = match req.from_version.as_deref() {
        Some(version_id) => {
            let version = services
                .versions
                .get_by_id(version_id)
                .await
                .ok_or_else(|| AppError::NotFound(format!("Version {version_id} not found")))?;
            profile_type.get_or_insert(version.profile_type);
            if template.is_none() {
                template = version
                    .template_id
                    .zip(version.template_name)
                    .map(|(id, name)| TemplateRef { id, name });
            }
            version.data
        }
        None => {
            let mut data = D::default();
            data.prefill_from_profile(&state.profile.get().await);
            data
        }
    };

    let wizard = FormWizard::new(
        data,
        WizardOptions {
            generate_cover_letter: req.generate_cover_letter,
        },
    )
    .with_template(template)
    .with_profile_type(profile_type);
    let view = wizard.view();

    let (id, _) = services.wizards.open(wizard).await;
    info!("Opened {} wizard {id}", D::KIND.label());
    Ok((StatusCode::CREATED, Json(WizardSession { id, view })))
}

/// GET /api/v1/{cv|lm}/wizards/:id
pub async fn handle_get_wizard<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSession<D>>, AppError> {
    let wizard = find_wizard::<D>(&state, id).await?;
    let view = wizard.lock().await.view();
    Ok(Json(WizardSession { id, view }))
}

/// DELETE /api/v1/{cv|lm}/wizards/:id
pub async fn handle_close_wizard<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if D::services(&state).wizards.close(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Wizard {id} not found")))
    }
}

/// PATCH /api/v1/{cv|lm}/wizards/:id/fields
///
/// Fields are applied in order; the first rejected one aborts the rest.
pub async fn handle_set_fields<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FieldsUpdate>,
) -> Result<Json<WizardSession<D>>, AppError> {
    let wizard = find_wizard::<D>(&state, id).await?;
    let mut guard = wizard.lock().await;
    for (key, value) in update.fields {
        guard.set_field(&key, value)?;
    }
    Ok(Json(WizardSession {
        id,
        view: guard.view(),
    }))
}

/// POST /api/v1/{cv|lm}/wizards/:id/next
pub async fn handle_next_step<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSession<D>>, AppError> {
    let wizard = find_wizard::<D>(&state, id).await?;
    let mut guard = wizard.lock().await;
    guard.next()?;
    Ok(Json(WizardSession {
        id,
        view: guard.view(),
    }))
}

/// POST /api/v1/{cv|lm}/wizards/:id/back
pub async fn handle_previous_step<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSession<D>>, AppError> {
    let wizard = find_wizard::<D>(&state, id).await?;
    let mut guard = wizard.lock().await;
    guard.back()?;
    Ok(Json(WizardSession {
        id,
        view: guard.view(),
    }))
}

/// POST /api/v1/{cv|lm}/wizards/:id/submit
pub async fn handle_submit<D: ServedDocument>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionReceipt<D>>, AppError> {
    let wizard = find_wizard::<D>(&state, id).await?;
    let ctx = SubmissionContext {
        relay: state.relay.as_ref(),
        versions: &D::services(&state).versions,
        requests: &state.requests,
        redirect_after_ms: state.config.success_redirect_ms,
    };
    let receipt = submit_wizard(ctx, &wizard).await?;
    Ok(Json(receipt))
}
