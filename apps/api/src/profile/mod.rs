//! Cached user profile, stored as a single document.

pub mod handlers;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::models::profile::{ProfilePatch, UserProfile};
use crate::storage::{read_document, write_document, KvBackend, StoreError, PROFILE_KEY};

#[derive(Clone)]
pub struct ProfileStore {
    backend: Arc<dyn KvBackend>,
    /// Serializes read-merge-write of the profile document.
    write_lock: Arc<Mutex<()>>,
}

impl ProfileStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The stored profile, or an empty one when nothing readable is stored.
    pub async fn get(&self) -> UserProfile {
        read_document(self.backend.as_ref(), PROFILE_KEY)
            .await
            .unwrap_or_default()
    }

    pub async fn update(&self, patch: ProfilePatch) -> UserProfile {
        let _guard = self.write_lock.lock().await;
        let mut profile = self.get().await;
        profile.apply(patch);
        match write_document(self.backend.as_ref(), PROFILE_KEY, &profile).await {
            Ok(()) => info!("Profile updated"),
            Err(e) => error!("Failed to persist profile: {e}"),
        }
        profile
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.backend.remove(PROFILE_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::SlowReadBackend;
    use crate::storage::MemoryBackend;

    #[tokio::test]
    async fn test_missing_profile_is_default() {
        let store = ProfileStore::new(Arc::new(MemoryBackend::new()));
        assert_eq!(store.get().await, UserProfile::default());
    }

    #[tokio::test]
    async fn test_update_merges_and_persists() {
        let backend = Arc::new(MemoryBackend::new());
        let store = ProfileStore::new(backend.clone());
        store
            .update(ProfilePatch {
                name: Some("Awa".to_string()),
                email: Some("awa@example.com".to_string()),
                ..Default::default()
            })
            .await;
        let updated = store
            .update(ProfilePatch {
                job_title: Some("Comptable".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(updated.name, "Awa");
        assert_eq!(updated.job_title, "Comptable");

        let reloaded = ProfileStore::new(backend).get().await;
        assert_eq!(reloaded, updated);
    }

    #[tokio::test]
    async fn test_concurrent_patches_keep_every_field() {
        let store = ProfileStore::new(Arc::new(SlowReadBackend::new(20)));
        let naming = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(ProfilePatch {
                        name: Some("Awa".to_string()),
                        ..Default::default()
                    })
                    .await
            })
        };
        let titling = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(ProfilePatch {
                        job_title: Some("Comptable".to_string()),
                        ..Default::default()
                    })
                    .await
            })
        };
        naming.await.unwrap();
        titling.await.unwrap();

        let profile = store.get().await;
        assert_eq!(profile.name, "Awa");
        assert_eq!(profile.job_title, "Comptable");

        store.clear().await.unwrap();
        assert_eq!(store.get().await, UserProfile::default());
    }
}
