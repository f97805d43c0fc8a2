use serde::{Deserialize, Serialize};

use crate::models::version::{DocumentKind, FormPayload};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationItem {
    pub degree: String,
    pub school: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceItem {
    pub position: String,
    pub company: String,
    pub period: String,
    pub description: String,
}

/// CV form payload. Unknown or missing fields fall back to empty values so older
/// stored blobs keep loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvFormData {
    // Personal info
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    // Target role
    pub job_title: String,
    pub profile_summary: String,
    // Qualifications
    pub education: Vec<EducationItem>,
    pub experience: Vec<ExperienceItem>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub interests: Vec<String>,
}

impl FormPayload for CvFormData {
    const KIND: DocumentKind = DocumentKind::Cv;

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn headline(&self) -> &str {
        &self.job_title
    }
}
