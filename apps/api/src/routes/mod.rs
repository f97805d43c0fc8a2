pub mod health;
pub mod settings;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::advice::handle_cv_advice;
use crate::models::cv::CvFormData;
use crate::models::letter::LmFormData;
use crate::profile::handlers as profile;
use crate::requests::handlers as requests;
use crate::state::{AppState, ServedDocument};
use crate::templates::handlers as templates;
use crate::versions::handlers as versions;
use crate::wizard::handlers as wizards;

/// Version and wizard routes for one document kind. Mounted once per kind.
fn document_routes<D: ServedDocument>() -> Router<AppState> {
    Router::new()
        .route(
            "/versions",
            get(versions::handle_list_versions::<D>)
                .post(versions::handle_save_version::<D>)
                .delete(versions::handle_clear_versions::<D>),
        )
        .route(
            "/versions/grouped",
            get(versions::handle_grouped_versions::<D>),
        )
        .route(
            "/versions/profile-types",
            get(versions::handle_profile_types::<D>),
        )
        .route(
            "/versions/summaries",
            get(versions::handle_version_summaries::<D>),
        )
        .route(
            "/versions/history",
            get(versions::handle_version_history::<D>),
        )
        .route("/versions/export", get(versions::handle_export_all::<D>))
        .route(
            "/versions/import",
            post(versions::handle_import_version::<D>),
        )
        .route(
            "/versions/:id",
            get(versions::handle_get_version::<D>)
                .patch(versions::handle_update_version::<D>)
                .delete(versions::handle_delete_version::<D>),
        )
        .route(
            "/versions/:id/name",
            put(versions::handle_rename_version::<D>),
        )
        .route(
            "/versions/:id/export",
            get(versions::handle_export_version::<D>),
        )
        .route("/wizards", post(wizards::handle_open_wizard::<D>))
        .route(
            "/wizards/:id",
            get(wizards::handle_get_wizard::<D>).delete(wizards::handle_close_wizard::<D>),
        )
        .route(
            "/wizards/:id/fields",
            patch(wizards::handle_set_fields::<D>),
        )
        .route("/wizards/:id/next", post(wizards::handle_next_step::<D>))
        .route(
            "/wizards/:id/back",
            post(wizards::handle_previous_step::<D>),
        )
        .route("/wizards/:id/submit", post(wizards::handle_submit::<D>))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1/cv", document_routes::<CvFormData>())
        .nest("/api/v1/lm", document_routes::<LmFormData>())
        .route("/api/v1/advice", get(handle_cv_advice))
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile).patch(profile::handle_update_profile),
        )
        .route("/api/v1/requests", get(requests::handle_list_requests))
        .route(
            "/api/v1/requests/:id",
            patch(requests::handle_update_request),
        )
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route(
            "/api/v1/templates/count",
            get(templates::handle_template_count),
        )
        .route(
            "/api/v1/templates/:id/favorite",
            post(templates::handle_toggle_favorite),
        )
        .route("/api/v1/data", delete(settings::handle_reset_data))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::models::version::DocumentKind;
    use crate::relay::{FormRelay, RelayError};
    use crate::storage::MemoryBackend;

    #[derive(Default)]
    struct CountingRelay {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FormRelay for CountingRelay {
        async fn submit(&self, _kind: DocumentKind, _body: &Value) -> Result<(), RelayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn app() -> (Router, Arc<CountingRelay>) {
        let relay = Arc::new(CountingRelay::default());
        let state = AppState::new(
            Arc::new(MemoryBackend::new()),
            relay.clone(),
            None,
            Config::for_testing(),
        );
        (build_router(state), relay)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
        assert_eq!(body["openWizards"], 0);
    }

    #[tokio::test]
    async fn test_lm_wizard_flow_persists_version_and_request() {
        let (app, relay) = app();

        let (status, opened) = send(
            &app,
            "POST",
            "/api/v1/lm/wizards",
            Some(json!({ "templateId": "42", "generateCoverLetter": true })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(opened["stepCount"], 4);
        let id = opened["id"].as_str().unwrap().to_string();

        let (status, patched) = send(
            &app,
            "PATCH",
            &format!("/api/v1/lm/wizards/{id}/fields"),
            Some(json!({ "fields": {
                "fullName": "Awa Koné",
                "email": "awa@example.com",
                "positionTitle": "Comptable",
                "companyName": "SIB"
            }})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["data"]["companyName"], "SIB");

        let (status, stepped) = send(&app, "POST", &format!("/api/v1/lm/wizards/{id}/next"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stepped["step"], 1);

        let (status, receipt) =
            send(&app, "POST", &format!("/api/v1/lm/wizards/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(receipt["version"]["profileType"], "COMPTABLE");
        assert!(receipt["version"]["data"]["coverLetter"]
            .as_str()
            .unwrap()
            .contains("Comptable"));
        assert_eq!(receipt["request"]["status"], "pending");
        assert_eq!(receipt["redirectAfterMs"], 2000);
        assert_eq!(relay.calls.load(Ordering::SeqCst), 1);

        let (_, versions) = send(&app, "GET", "/api/v1/lm/versions", None).await;
        assert_eq!(versions.as_array().unwrap().len(), 1);
        let (_, cv_versions) = send(&app, "GET", "/api/v1/cv/versions", None).await;
        assert!(cv_versions.as_array().unwrap().is_empty());
        let (_, requests) = send(&app, "GET", "/api/v1/requests", None).await;
        assert_eq!(requests.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "POST", &format!("/api/v1/lm/wizards/{id}/back"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_submit_with_blank_required_field_is_rejected_without_relay_call() {
        let (app, relay) = app();
        let (_, opened) = send(&app, "POST", "/api/v1/cv/wizards", Some(json!({}))).await;
        let id = opened["id"].as_str().unwrap().to_string();

        let (status, body) =
            send(&app, "POST", &format!("/api/v1/cv/wizards/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);

        let (_, view) = send(&app, "GET", &format!("/api/v1/cv/wizards/{id}"), None).await;
        assert_eq!(view["status"], "error");
        assert_eq!(view["errorMessage"], "Veuillez remplir tous les champs obligatoires");

        let (_, versions) = send(&app, "GET", "/api/v1/cv/versions", None).await;
        assert!(versions.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wizard_rejects_template_of_other_kind() {
        let (app, _) = app();
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/cv/wizards",
            Some(json!({ "templateId": "84" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wizard_prefills_from_profile() {
        let (app, _) = app();
        send(
            &app,
            "PATCH",
            "/api/v1/profile",
            Some(json!({ "name": "Awa Koné", "jobTitle": "Comptable" })),
        )
        .await;

        let (_, opened) = send(&app, "POST", "/api/v1/cv/wizards", Some(json!({}))).await;
        assert_eq!(opened["data"]["fullName"], "Awa Koné");
        assert_eq!(opened["data"]["jobTitle"], "Comptable");
    }

    #[tokio::test]
    async fn test_version_crud_over_http() {
        let (app, _) = app();

        let (status, saved) = send(
            &app,
            "POST",
            "/api/v1/cv/versions",
            Some(json!({ "profileType": "dev", "data": { "fullName": "Awa", "jobTitle": "Dev" } })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved["profileType"], "DEV");
        let id = saved["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("CVLM_DEV_"));

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/v1/cv/versions/{id}/name"),
            Some(json!({ "name": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, renamed) = send(
            &app,
            "PUT",
            &format!("/api/v1/cv/versions/{id}/name"),
            Some(json!({ "name": "Candidature MTN" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["name"], "Candidature MTN");

        let (_, grouped) = send(&app, "GET", "/api/v1/cv/versions/grouped", None).await;
        assert_eq!(grouped["DEV"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "DELETE", "/api/v1/cv/versions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &format!("/api/v1/cv/versions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &format!("/api/v1/cv/versions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_templates_and_favorites() {
        let (app, _) = app();
        let (_, count) = send(&app, "GET", "/api/v1/templates/count", None).await;
        assert_eq!(count["total"], 84);

        let (status, fav) = send(&app, "POST", "/api/v1/templates/3/favorite", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fav["isFavorite"], true);

        let (_, favorites) = send(&app, "GET", "/api/v1/templates?favorites=true", None).await;
        assert_eq!(favorites.as_array().unwrap().len(), 1);

        let (_, lm) = send(&app, "GET", "/api/v1/templates?kind=lm", None).await;
        assert_eq!(lm.as_array().unwrap().len(), 43);
    }

    #[tokio::test]
    async fn test_reset_data_clears_everything() {
        let (app, _) = app();
        send(
            &app,
            "POST",
            "/api/v1/lm/versions",
            Some(json!({ "profileType": "finance", "data": { "fullName": "Awa" } })),
        )
        .await;
        send(&app, "POST", "/api/v1/templates/1/favorite", None).await;
        send(
            &app,
            "PATCH",
            "/api/v1/profile",
            Some(json!({ "name": "Awa" })),
        )
        .await;

        let (status, _) = send(&app, "DELETE", "/api/v1/data", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, versions) = send(&app, "GET", "/api/v1/lm/versions", None).await;
        assert!(versions.as_array().unwrap().is_empty());
        let (_, favorites) = send(&app, "GET", "/api/v1/templates?favorites=true", None).await;
        assert!(favorites.as_array().unwrap().is_empty());
        let (_, profile) = send(&app, "GET", "/api/v1/profile", None).await;
        assert_eq!(profile["name"], "");
    }

    #[tokio::test]
    async fn test_advice_without_key_falls_back() {
        let (app, _) = app();
        let (status, _) = send(&app, "GET", "/api/v1/advice?job_title=%20", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, advice) = send(&app, "GET", "/api/v1/advice?job_title=Comptable", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(advice["text"], "Clé API manquante. Impossible de générer des conseils.");
    }
}
