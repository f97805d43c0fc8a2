//! Template gallery: a fixed catalog of CV and cover-letter templates plus the
//! user's persisted favorites.

pub mod handlers;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::models::template::Template;
use crate::models::version::DocumentKind;
use crate::storage::{read_document, write_document, KvBackend, StoreError, FAVORITES_KEY};

const CV_SAMPLE_COUNT: usize = 41;
const LM_SAMPLE_COUNT: usize = 43;

/// Sample sheets are drawn for a man (H), a woman (F) or neutral (M), in this order.
const CV_SAMPLE_SUFFIXES: [char; CV_SAMPLE_COUNT] = [
    'H', 'F', 'H', 'H', 'M', 'H', 'F', 'F', 'F', 'F', 'H', 'H', 'F', 'H', 'F', 'M', 'F', 'H', 'M',
    'F', 'F', 'F', 'H', 'H', 'F', 'F', 'F', 'H', 'H', 'F', 'F', 'H', 'H', 'F', 'H', 'H', 'F', 'H',
    'F', 'F', 'F',
];

const CV_NAMES: &[&str] = &[
    "Futurism Alpha",
    "Minimalist Pro",
    "Executive Suite",
    "Creative Burst",
    "Modern Tech",
    "Professional Blue",
    "Elegant Gold",
    "Dynamic Red",
    "Soft Gray",
    "Vibrant Green",
    "Classic Black",
    "Ocean Wave",
];

const LM_NAMES: &[&str] = &[
    "Lettre Neo",
    "Correspondance Pro",
    "Business Letter",
    "Modern Style",
    "Elegant Format",
    "Professional Touch",
    "Classic Letter",
    "Contemporary",
];

/// Builds the full catalog: CV templates first, then LM templates, ids counting from "1".
pub fn build_catalog() -> Vec<Template> {
    let cv = CV_SAMPLE_SUFFIXES.iter().enumerate().map(|(i, suffix)| {
        (
            DocumentKind::Cv,
            format!("{} #{}", CV_NAMES[i % CV_NAMES.len()], i + 1),
            format!("/cv-samples/CV {:03}{suffix}.png", i + 1),
        )
    });
    let lm = (0..LM_SAMPLE_COUNT).map(|i| {
        (
            DocumentKind::Lm,
            format!("{} #{}", LM_NAMES[i % LM_NAMES.len()], i + 1),
            format!("/lm-samples/LM {:03}.png", i + 1),
        )
    });

    cv.chain(lm)
        .enumerate()
        .map(|(i, (kind, name, thumbnail))| Template {
            id: (i + 1).to_string(),
            name,
            thumbnail,
            kind,
            tags: vec![kind.label().to_string()],
            is_premium: false,
            is_favorite: false,
        })
        .collect()
}

#[derive(Clone)]
pub struct TemplateCatalog {
    templates: Arc<Vec<Template>>,
    backend: Arc<dyn KvBackend>,
    /// Serializes read-toggle-write of the favorites document.
    favorites_lock: Arc<Mutex<()>>,
}

impl TemplateCatalog {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            templates: Arc::new(build_catalog()),
            backend,
            favorites_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn total_count(&self) -> usize {
        self.templates.len()
    }

    async fn favorites(&self) -> Vec<String> {
        read_document(self.backend.as_ref(), FAVORITES_KEY)
            .await
            .unwrap_or_default()
    }

    fn with_favorite(template: &Template, favorites: &[String]) -> Template {
        Template {
            is_favorite: favorites.iter().any(|id| *id == template.id),
            ..template.clone()
        }
    }

    /// Templates of `kind` (all kinds when `None`), optionally only favorites.
    pub async fn list(&self, kind: Option<DocumentKind>, favorites_only: bool) -> Vec<Template> {
        let favorites = self.favorites().await;
        self.templates
            .iter()
            .filter(|t| kind.map_or(true, |k| t.kind == k))
            .map(|t| Self::with_favorite(t, &favorites))
            .filter(|t| !favorites_only || t.is_favorite)
            .collect()
    }

    pub async fn get(&self, id: &str) -> Option<Template> {
        let template = self.templates.iter().find(|t| t.id == id)?;
        Some(Self::with_favorite(template, &self.favorites().await))
    }

    /// Flips the favorite flag. Returns `None` for an unknown id.
    pub async fn toggle_favorite(&self, id: &str) -> Option<Template> {
        let template = self.templates.iter().find(|t| t.id == id)?;
        let _guard = self.favorites_lock.lock().await;
        let mut favorites = self.favorites().await;
        if let Some(pos) = favorites.iter().position(|f| f == id) {
            favorites.remove(pos);
        } else {
            favorites.push(id.to_string());
        }

        match write_document(self.backend.as_ref(), FAVORITES_KEY, &favorites).await {
            Ok(()) => info!("Toggled favorite on template {id}"),
            Err(e) => error!("Failed to persist favorites: {e}"),
        }
        Some(Self::with_favorite(template, &favorites))
    }

    pub async fn clear_favorites(&self) -> Result<(), StoreError> {
        let _guard = self.favorites_lock.lock().await;
        self.backend.remove(FAVORITES_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::SlowReadBackend;
    use crate::storage::MemoryBackend;

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::new(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn test_catalog_counts_and_sequential_ids() {
        let all = build_catalog();
        assert_eq!(all.len(), 84);
        assert_eq!(all.first().unwrap().id, "1");
        assert_eq!(all.last().unwrap().id, "84");
        assert_eq!(all.iter().filter(|t| t.kind == DocumentKind::Cv).count(), 41);
    }

    #[test]
    fn test_names_cycle_and_thumbnails_follow_samples() {
        let all = build_catalog();
        assert_eq!(all[0].name, "Futurism Alpha #1");
        assert_eq!(all[0].thumbnail, "/cv-samples/CV 001H.png");
        assert_eq!(all[12].name, "Futurism Alpha #13");
        assert_eq!(all[40].thumbnail, "/cv-samples/CV 041F.png");
        assert_eq!(all[41].name, "Lettre Neo #1");
        assert_eq!(all[41].thumbnail, "/lm-samples/LM 001.png");
        assert_eq!(all[41].tags, vec!["LM"]);
    }

    #[tokio::test]
    async fn test_list_filters_by_kind() {
        let c = catalog();
        assert_eq!(c.list(Some(DocumentKind::Lm), false).await.len(), 43);
        assert_eq!(c.list(None, false).await.len(), c.total_count());
    }

    #[tokio::test]
    async fn test_toggle_favorite_round_trips_and_persists() {
        let c = catalog();
        assert!(c.list(None, true).await.is_empty());

        let fav = c.toggle_favorite("3").await.unwrap();
        assert!(fav.is_favorite);
        let favorites = c.list(None, true).await;
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, "3");
        assert!(c.get("3").await.unwrap().is_favorite);

        let unfav = c.toggle_favorite("3").await.unwrap();
        assert!(!unfav.is_favorite);
        assert!(c.list(None, true).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_template() {
        let c = catalog();
        assert!(c.toggle_favorite("999").await.is_none());
        assert!(c.get("999").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_toggles_each_flip_once() {
        let c = TemplateCatalog::new(Arc::new(SlowReadBackend::new(20)));
        let mut handles = Vec::new();
        for id in ["1", "2", "2"] {
            let c = c.clone();
            handles.push(tokio::spawn(async move { c.toggle_favorite(id).await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let favorites: Vec<_> = c.list(None, true).await.into_iter().map(|t| t.id).collect();
        assert_eq!(favorites, vec!["1"]);

        c.clear_favorites().await.unwrap();
        assert!(c.list(None, true).await.is_empty());
    }
}
