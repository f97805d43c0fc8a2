//! Storage: the swappable key-value medium behind every persisted collection.
//!
//! Two layers:
//! - `KvBackend`: raw string blobs under fixed keys (memory, JSON files, Redis).
//! - `RecordStore<T>`: list/get/put/delete over a typed collection of records.
//!
//! Call sites only ever see `RecordStore<T>`; the medium is picked once at startup.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

pub mod file;
pub mod memory;
pub mod redis_store;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use redis_store::RedisBackend;

/// Storage key for CV versions.
pub const CV_VERSIONS_KEY: &str = "cvlm_versions";
/// Storage key for cover-letter versions.
pub const LM_VERSIONS_KEY: &str = "lm_versions";
/// Storage key for the cached user profile.
pub const PROFILE_KEY: &str = "cvlm_profile";
/// Storage key for the submitted-requests tracking list.
pub const REQUESTS_KEY: &str = "cvlm_requests";
/// Storage key for favorited template ids.
pub const FAVORITES_KEY: &str = "cvlm_template_favorites";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Raw medium
// ────────────────────────────────────────────────────────────────────────────

/// A string-keyed blob store. Mirrors what browser local storage offered.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Short backend label for logs and health output.
    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Typed record collections
// ────────────────────────────────────────────────────────────────────────────

/// A record addressable by a string id within its collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// In-place mutation applied by `RecordStore::update`.
pub type Mutation<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Result of `RecordStore::update` on a matching record. `record` is the mutated value even
/// when `write` failed.
#[derive(Debug)]
pub struct Updated<T> {
    pub record: T,
    pub write: Result<(), StoreError>,
}

/// Collection-level persistence interface.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// All records. Missing or unreadable data yields an empty list.
    async fn list(&self) -> Vec<T>;

    async fn get(&self, id: &str) -> Option<T>;

    /// Inserts the record, or replaces the one with the same id.
    async fn put(&self, record: &T) -> Result<(), StoreError>;

    /// Loads, mutates and persists the record with `id` as one step, so concurrent
    /// mutations of the collection cannot interleave with it. `None` when no record matches.
    async fn update(&self, id: &str, apply: Mutation<T>) -> Option<Updated<T>>;

    /// Returns `Ok(false)` when no record had that id.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

/// `RecordStore` that keeps the whole collection as one JSON array under a single key.
/// Every mutation rewrites the full array; mutations are serialized by `write_lock`.
pub struct KvRecordStore<T> {
    backend: Arc<dyn KvBackend>,
    key: &'static str,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> KvRecordStore<T> {
    pub fn new(backend: Arc<dyn KvBackend>, key: &'static str) -> Self {
        Self {
            backend,
            key,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    async fn load(&self) -> Vec<T> {
        let raw = match self.backend.read(self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read '{}' from {}: {e}", self.key, self.backend.name());
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Discarding malformed '{}' collection: {e}", self.key);
                Vec::new()
            }
        }
    }

    async fn persist(&self, records: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string(records)?;
        self.backend.write(self.key, &json).await
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for KvRecordStore<T> {
    async fn list(&self) -> Vec<T> {
        self.load().await
    }

    async fn get(&self, id: &str) -> Option<T> {
        self.load().await.into_iter().find(|r| r.id() == id)
    }

    async fn put(&self, record: &T) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.persist(&records).await
    }

    async fn update(&self, id: &str, apply: Mutation<T>) -> Option<Updated<T>> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await;
        let record = records.iter_mut().find(|r| r.id() == id)?;
        apply(record);
        let record = record.clone();
        let write = self.persist(&records).await;
        Some(Updated { record, write })
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.persist(&records).await?;
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.backend.remove(self.key).await
    }
}

/// Reads a single JSON document (not a list) stored under `key`.
/// Missing or malformed data yields `None`.
pub async fn read_document<T: DeserializeOwned>(backend: &dyn KvBackend, key: &str) -> Option<T> {
    match backend.read(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Discarding malformed '{key}' document: {e}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Failed to read '{key}' from {}: {e}", backend.name());
            None
        }
    }
}

/// Writes a single JSON document under `key`.
pub async fn write_document<T: Serialize>(
    backend: &dyn KvBackend,
    key: &str,
    doc: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(doc)?;
    backend.write(key, &json).await
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Record for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.to_string(),
            body: body.to_string(),
        }
    }

    fn store() -> (Arc<MemoryBackend>, KvRecordStore<Note>) {
        let backend = Arc::new(MemoryBackend::new());
        let store = KvRecordStore::new(backend.clone(), "notes");
        (backend, store)
    }

    #[tokio::test]
    async fn test_list_empty_when_key_missing() {
        let (_, store) = store();
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_empty_when_blob_malformed() {
        let (backend, store) = store();
        backend.write("notes", "{not json").await.unwrap();
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_put_appends_then_replaces_by_id() {
        let (_, store) = store();
        store.put(&note("a", "one")).await.unwrap();
        store.put(&note("b", "two")).await.unwrap();
        store.put(&note("a", "uno")).await.unwrap();

        let all = store.list().await;
        assert_eq!(all.len(), 2);
        assert_eq!(store.get("a").await.unwrap().body, "uno");
    }

    #[tokio::test]
    async fn test_delete_missing_id_leaves_collection_untouched() {
        let (_, store) = store();
        store.put(&note("a", "one")).await.unwrap();
        assert!(!store.delete("zzz").await.unwrap());
        assert_eq!(store.list().await.len(), 1);
        assert!(store.delete("a").await.unwrap());
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_puts_do_not_lose_updates() {
        let (_, store) = store();
        let store = Arc::new(store);
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.put(&note(&format!("n{i}"), "x")).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.list().await.len(), 20);
    }

    #[tokio::test]
    async fn test_update_mutates_in_place_and_misses_unknown_id() {
        let (_, store) = store();
        store.put(&note("a", "one")).await.unwrap();

        let updated = store
            .update("a", Box::new(|n: &mut Note| n.body.push_str("+")))
            .await
            .unwrap();
        assert!(updated.write.is_ok());
        assert_eq!(updated.record.body, "one+");
        assert_eq!(store.get("a").await.unwrap().body, "one+");

        assert!(store
            .update("zzz", Box::new(|n: &mut Note| n.body.clear()))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_concurrent_updates_on_one_record_all_apply() {
        let store = Arc::new(KvRecordStore::<Note>::new(
            Arc::new(testing::SlowReadBackend::new(5)),
            "notes",
        ));
        store.put(&note("a", "")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update("a", Box::new(|n: &mut Note| n.body.push('x')))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.get("a").await.unwrap().body, "xxxxxxxxxx");
    }

    #[tokio::test]
    async fn test_read_document_none_on_garbage() {
        let backend = MemoryBackend::new();
        backend.write("doc", "[[[").await.unwrap();
        let doc: Option<Note> = read_document(&backend, "doc").await;
        assert!(doc.is_none());
    }
}
