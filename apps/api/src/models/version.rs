use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::storage::{Record, CV_VERSIONS_KEY, LM_VERSIONS_KEY};

/// The two document families the app builds. Each one owns a separate storage partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Cv,
    Lm,
}

impl DocumentKind {
    pub fn storage_key(self) -> &'static str {
        match self {
            DocumentKind::Cv => CV_VERSIONS_KEY,
            DocumentKind::Lm => LM_VERSIONS_KEY,
        }
    }

    /// Leading segment of generated version ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            DocumentKind::Cv => "CVLM",
            DocumentKind::Lm => "LM",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Cv => "CV",
            DocumentKind::Lm => "LM",
        }
    }

    /// Name recorded on a tracking request when no template was picked.
    pub fn fallback_template_name(self) -> &'static str {
        match self {
            DocumentKind::Cv => "CV",
            DocumentKind::Lm => "Lettre de Motivation",
        }
    }
}

/// A completed form payload that can be versioned.
pub trait FormPayload:
    Serialize + DeserializeOwned + Clone + Default + PartialEq + Send + Sync + 'static
{
    const KIND: DocumentKind;

    fn full_name(&self) -> &str;

    /// The target role shown next to the name in summaries: job title or position applied for.
    fn headline(&self) -> &str;
}

/// A saved snapshot of a completed CV or cover-letter form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version<D> {
    pub id: String,
    pub profile_type: String,
    pub name: String,
    pub data: D,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

impl<D: FormPayload> Record for Version<D> {
    fn id(&self) -> &str {
        &self.id
    }
}

impl<D: FormPayload> Version<D> {
    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            profile_type: self.profile_type.clone(),
            created_at: self.created_at,
            full_name: self.data.full_name().to_string(),
            headline: self.data.headline().to_string(),
        }
    }
}

/// Display projection without the form payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub id: String,
    pub name: String,
    pub profile_type: String,
    pub created_at: DateTime<Utc>,
    pub full_name: String,
    pub headline: String,
}

/// Fields a caller may change on an existing version. `id`, `createdAt` and
/// `profileType` are fixed at creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionPatch<D> {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Option<D>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
}

impl<D> Default for VersionPatch<D> {
    fn default() -> Self {
        Self {
            name: None,
            data: None,
            template_id: None,
            template_name: None,
        }
    }
}

impl<D> VersionPatch<D> {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn replace_data(data: D) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }
}

/// Version list as the history screen consumes it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionHistory<D> {
    pub versions: Vec<Version<D>>,
    pub has_data: bool,
}
