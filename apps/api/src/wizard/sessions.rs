use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::wizard::FormWizard;

pub type SharedWizard<D> = Arc<Mutex<FormWizard<D>>>;

/// Open wizards for one document kind, keyed by session id. In-memory only; a restart
/// drops unfinished forms, while submitted payloads are already persisted as versions.
pub struct WizardSessions<D> {
    sessions: Arc<RwLock<HashMap<Uuid, SharedWizard<D>>>>,
}

impl<D> Clone for WizardSessions<D> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
        }
    }
}

impl<D> Default for WizardSessions<D> {
    fn default() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<D> WizardSessions<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, wizard: FormWizard<D>) -> (Uuid, SharedWizard<D>) {
        let id = Uuid::new_v4();
        let shared = Arc::new(Mutex::new(wizard));
        self.sessions.write().await.insert(id, shared.clone());
        (id, shared)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedWizard<D>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn close(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::letter::LmFormData;
    use crate::wizard::steps::WizardOptions;

    #[tokio::test]
    async fn test_open_get_close() {
        let sessions: WizardSessions<LmFormData> = WizardSessions::new();
        let (id, _) = sessions
            .open(FormWizard::new(LmFormData::default(), WizardOptions::default()))
            .await;
        assert!(sessions.get(id).await.is_some());
        assert_eq!(sessions.len().await, 1);
        assert!(sessions.close(id).await);
        assert!(!sessions.close(id).await);
        assert!(sessions.get(id).await.is_none());
    }
}
