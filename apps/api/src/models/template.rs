use serde::Serialize;

use crate::models::version::DocumentKind;

/// A gallery entry a user can start a CV or cover letter from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
    pub kind: DocumentKind,
    pub tags: Vec<String>,
    pub is_premium: bool,
    pub is_favorite: bool,
}
