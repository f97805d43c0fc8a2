//! Version Store: save/list/update/rename/delete of CV and LM versions.
//!
//! One store per `DocumentKind`, each over its own storage partition. Read failures
//! degrade to an empty collection. Write failures are logged and the in-memory record
//! is still handed back, so callers never see a storage error from these operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::models::version::{FormPayload, Version, VersionHistory, VersionPatch, VersionSummary};
use crate::storage::{KvBackend, KvRecordStore, RecordStore};
use crate::versions::naming::{
    default_version_name, normalize_profile_type, touch, unique_version_id,
};

/// Optional metadata attached to a version at save time.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    pub name: Option<String>,
    pub template_id: Option<String>,
    pub template_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Import is missing required field '{0}'")]
    MissingField(&'static str),
}

pub struct VersionStore<D: FormPayload> {
    records: Arc<dyn RecordStore<Version<D>>>,
    /// Serializes id allocation with the insert that claims it.
    id_lock: Arc<Mutex<()>>,
}

impl<D: FormPayload> Clone for VersionStore<D> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            id_lock: self.id_lock.clone(),
        }
    }
}

/// Newest `createdAt` first.
pub fn sort_newest_first<D>(versions: &mut [Version<D>]) {
    versions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl<D: FormPayload> VersionStore<D> {
    pub fn new(records: Arc<dyn RecordStore<Version<D>>>) -> Self {
        Self {
            records,
            id_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Store over the kind's fixed storage key on `backend`.
    pub fn on_backend(backend: Arc<dyn KvBackend>) -> Self {
        Self::new(Arc::new(KvRecordStore::<Version<D>>::new(
            backend,
            D::KIND.storage_key(),
        )))
    }

    fn canonical_profile_type(&self, raw: &str) -> String {
        normalize_profile_type(raw, D::KIND.label())
    }

    pub async fn get_all(&self) -> Vec<Version<D>> {
        self.records.list().await
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Version<D>> {
        self.records.get(id).await
    }

    /// Every version, newest first.
    pub async fn sorted_for_display(&self) -> Vec<Version<D>> {
        let mut versions = self.get_all().await;
        sort_newest_first(&mut versions);
        versions
    }

    /// Creates and persists a new version with a fresh id and `createdAt == updatedAt`.
    pub async fn save(&self, profile_type: &str, data: D, options: SaveOptions) -> Version<D> {
        let profile_type = self.canonical_profile_type(profile_type);
        let _guard = self.id_lock.lock().await;

        let existing = self.records.list().await;
        let taken: Vec<&str> = existing.iter().map(|v| v.id.as_str()).collect();
        let now = Utc::now();

        let name = options
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_version_name(&profile_type, now));

        let version = Version {
            id: unique_version_id(D::KIND.id_prefix(), &profile_type, now, &taken),
            profile_type,
            name,
            data,
            created_at: now,
            updated_at: now,
            template_id: options.template_id,
            template_name: options.template_name,
        };

        match self.records.put(&version).await {
            Ok(()) => info!("Saved {} version {}", D::KIND.label(), version.id),
            Err(e) => error!("Failed to persist {} version {}: {e}", D::KIND.label(), version.id),
        }

        version
    }

    /// Merges `patch` into the matching version and refreshes `updatedAt`.
    /// Returns `None` when no version has that id.
    pub async fn update(&self, id: &str, patch: VersionPatch<D>) -> Option<Version<D>> {
        let updated = self
            .records
            .update(
                id,
                Box::new(move |version: &mut Version<D>| {
                    let VersionPatch {
                        name,
                        data,
                        template_id,
                        template_name,
                    } = patch;
                    if let Some(name) = name {
                        version.name = name;
                    }
                    if let Some(data) = data {
                        version.data = data;
                    }
                    if template_id.is_some() {
                        version.template_id = template_id;
                    }
                    if template_name.is_some() {
                        version.template_name = template_name;
                    }
                    version.updated_at = touch(version.updated_at);
                }),
            )
            .await?;

        match updated.write {
            Ok(()) => info!("Updated {} version {id}", D::KIND.label()),
            Err(e) => error!("Failed to persist update of {} version {id}: {e}", D::KIND.label()),
        }

        Some(updated.record)
    }

    pub async fn rename(&self, id: &str, new_name: &str) -> Option<Version<D>> {
        let renamed = self.update(id, VersionPatch::rename(new_name)).await;
        if renamed.is_some() {
            info!("Renamed {} version {id} → {new_name}", D::KIND.label());
        }
        renamed
    }

    /// Returns `false` when nothing matched. A matched record whose removal could not be
    /// written still reports `true`.
    pub async fn delete(&self, id: &str) -> bool {
        match self.records.delete(id).await {
            Ok(true) => {
                info!("Deleted {} version {id}", D::KIND.label());
                true
            }
            Ok(false) => {
                warn!("{} version not found: {id}", D::KIND.label());
                false
            }
            Err(e) => {
                error!("Failed to persist deletion of {} version {id}: {e}", D::KIND.label());
                true
            }
        }
    }

    /// Versions whose tag matches `profile_type` after normalization.
    pub async fn by_profile_type(&self, profile_type: &str) -> Vec<Version<D>> {
        let wanted = self.canonical_profile_type(profile_type);
        let mut versions: Vec<_> = self
            .get_all()
            .await
            .into_iter()
            .filter(|v| v.profile_type == wanted)
            .collect();
        sort_newest_first(&mut versions);
        versions
    }

    /// Distinct profile types, sorted.
    pub async fn profile_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .get_all()
            .await
            .into_iter()
            .map(|v| v.profile_type)
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// Partitions every version by profile type; each group newest first.
    pub async fn group_by_profile_type(&self) -> BTreeMap<String, Vec<Version<D>>> {
        let mut grouped: BTreeMap<String, Vec<Version<D>>> = BTreeMap::new();
        for version in self.get_all().await {
            grouped
                .entry(version.profile_type.clone())
                .or_default()
                .push(version);
        }
        for group in grouped.values_mut() {
            sort_newest_first(group);
        }
        grouped
    }

    pub async fn summaries(&self) -> Vec<VersionSummary> {
        self.sorted_for_display()
            .await
            .iter()
            .map(Version::summary)
            .collect()
    }

    pub async fn history(&self) -> VersionHistory<D> {
        let versions = self.sorted_for_display().await;
        VersionHistory {
            has_data: !versions.is_empty(),
            versions,
        }
    }

    pub async fn has_any(&self) -> bool {
        !self.get_all().await.is_empty()
    }

    /// Pretty-printed JSON of one version, for sharing or backup.
    pub async fn export(&self, id: &str) -> Option<String> {
        let version = self.get_by_id(id).await?;
        match serde_json::to_string_pretty(&version) {
            Ok(json) => Some(json),
            Err(e) => {
                error!("Failed to export {} version {id}: {e}", D::KIND.label());
                None
            }
        }
    }

    pub async fn export_all(&self) -> String {
        let versions = self.sorted_for_display().await;
        serde_json::to_string_pretty(&versions).unwrap_or_else(|e| {
            error!("Failed to export {} versions: {e}", D::KIND.label());
            "[]".to_string()
        })
    }

    /// Imports a version produced by `export`. A colliding id is replaced by a fresh one.
    pub async fn import(&self, json: &str) -> Result<Version<D>, ImportError> {
        let raw: Value = serde_json::from_str(json)?;

        let has_profile_type = raw
            .get("profileType")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !has_profile_type {
            return Err(ImportError::MissingField("profileType"));
        }
        if raw.get("data").map_or(true, Value::is_null) {
            return Err(ImportError::MissingField("data"));
        }

        let mut version: Version<D> = serde_json::from_value(raw)?;
        version.profile_type = self.canonical_profile_type(&version.profile_type);

        let _guard = self.id_lock.lock().await;
        let existing = self.records.list().await;
        if existing.iter().any(|v| v.id == version.id) {
            let taken: Vec<&str> = existing.iter().map(|v| v.id.as_str()).collect();
            version.id =
                unique_version_id(D::KIND.id_prefix(), &version.profile_type, Utc::now(), &taken);
        }

        match self.records.put(&version).await {
            Ok(()) => info!("Imported {} version {}", D::KIND.label(), version.id),
            Err(e) => error!("Failed to persist imported version {}: {e}", version.id),
        }
        Ok(version)
    }

    pub async fn clear_all(&self) {
        if let Err(e) = self.records.clear().await {
            error!("Failed to clear {} versions: {e}", D::KIND.label());
        }
    }
}
