use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::version::DocumentKind;
use crate::storage::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Processing,
    Completed,
}

/// Lightweight record of a submitted form, shown on the tracking screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRequest {
    pub id: String,
    pub kind: DocumentKind,
    pub template_name: String,
    pub created_at: DateTime<Utc>,
    pub status: RequestStatus,
}

impl Record for CvRequest {
    fn id(&self) -> &str {
        &self.id
    }
}
