use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::models::cv::CvFormData;
use crate::models::letter::LmFormData;
use crate::profile::ProfileStore;
use crate::relay::FormRelay;
use crate::requests::RequestLog;
use crate::storage::KvBackend;
use crate::templates::TemplateCatalog;
use crate::versions::store::VersionStore;
use crate::wizard::sessions::WizardSessions;
use crate::wizard::steps::WizardForm;

/// Version store and open wizards for one document kind.
pub struct DocumentServices<D: WizardForm> {
    pub versions: VersionStore<D>,
    pub wizards: WizardSessions<D>,
}

impl<D: WizardForm> Clone for DocumentServices<D> {
    fn clone(&self) -> Self {
        Self {
            versions: self.versions.clone(),
            wizards: self.wizards.clone(),
        }
    }
}

impl<D: WizardForm> DocumentServices<D> {
    pub fn on_backend(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            versions: VersionStore::on_backend(backend),
            wizards: WizardSessions::new(),
        }
    }
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub cv: DocumentServices<CvFormData>,
    pub lm: DocumentServices<LmFormData>,
    pub profile: ProfileStore,
    pub requests: RequestLog,
    pub templates: TemplateCatalog,
    /// Outbound form relay. Default: `FormspreeRelay`; tests swap in a stub.
    pub relay: Arc<dyn FormRelay>,
    /// `None` when no provider key is configured; advice then degrades to a static message.
    pub llm: Option<LlmClient>,
    /// Raw medium, kept for the "reset all data" setting.
    pub backend: Arc<dyn KvBackend>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn KvBackend>,
        relay: Arc<dyn FormRelay>,
        llm: Option<LlmClient>,
        config: Config,
    ) -> Self {
        Self {
            cv: DocumentServices::on_backend(backend.clone()),
            lm: DocumentServices::on_backend(backend.clone()),
            profile: ProfileStore::new(backend.clone()),
            requests: RequestLog::on_backend(backend.clone()),
            templates: TemplateCatalog::new(backend.clone()),
            relay,
            llm,
            backend,
            config,
        }
    }
}

/// A document kind the API serves: lets generic handlers find their own services.
pub trait ServedDocument: WizardForm {
    fn services(state: &AppState) -> &DocumentServices<Self>;
}

impl ServedDocument for CvFormData {
    fn services(state: &AppState) -> &DocumentServices<Self> {
        &state.cv
    }
}

impl ServedDocument for LmFormData {
    fn services(state: &AppState) -> &DocumentServices<Self> {
        &state.lm
    }
}
