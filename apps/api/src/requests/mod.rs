//! Tracking list of submitted forms.

pub mod handlers;

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::request::{CvRequest, RequestStatus};
use crate::models::version::DocumentKind;
use crate::storage::{KvBackend, KvRecordStore, RecordStore, StoreError, REQUESTS_KEY};

#[derive(Clone)]
pub struct RequestLog {
    records: Arc<dyn RecordStore<CvRequest>>,
}

impl RequestLog {
    pub fn new(records: Arc<dyn RecordStore<CvRequest>>) -> Self {
        Self { records }
    }

    pub fn on_backend(backend: Arc<dyn KvBackend>) -> Self {
        Self::new(Arc::new(KvRecordStore::<CvRequest>::new(
            backend,
            REQUESTS_KEY,
        )))
    }

    /// Appends a `pending` request for a freshly submitted form.
    pub async fn record(&self, kind: DocumentKind, template_name: &str) -> CvRequest {
        let request = CvRequest {
            id: Uuid::new_v4().to_string(),
            kind,
            template_name: template_name.to_string(),
            created_at: Utc::now(),
            status: RequestStatus::Pending,
        };
        match self.records.put(&request).await {
            Ok(()) => info!("Recorded {} request {}", kind.label(), request.id),
            Err(e) => error!("Failed to persist request {}: {e}", request.id),
        }
        request
    }

    /// Newest first.
    pub async fn list(&self) -> Vec<CvRequest> {
        let mut requests = self.records.list().await;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    pub async fn set_status(&self, id: &str, status: RequestStatus) -> Option<CvRequest> {
        let updated = self
            .records
            .update(id, Box::new(move |request: &mut CvRequest| request.status = status))
            .await?;
        if let Err(e) = updated.write {
            error!("Failed to persist status of request {id}: {e}");
        }
        Some(updated.record)
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.records.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::SlowReadBackend;
    use crate::storage::MemoryBackend;

    fn log() -> RequestLog {
        RequestLog::on_backend(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn test_record_is_pending_and_listed_newest_first() {
        let log = log();
        let first = log.record(DocumentKind::Cv, "Executive Suite #3").await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = log.record(DocumentKind::Lm, "Lettre Neo #1").await;

        assert_eq!(first.status, RequestStatus::Pending);
        let listed = log.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_set_status_updates_and_missing_is_none() {
        let log = log();
        let req = log.record(DocumentKind::Cv, "T").await;
        let updated = log.set_status(&req.id, RequestStatus::Completed).await.unwrap();
        assert_eq!(updated.status, RequestStatus::Completed);
        assert_eq!(log.list().await[0].status, RequestStatus::Completed);
        assert!(log.set_status("missing", RequestStatus::Processing).await.is_none());
    }

    #[tokio::test]
    async fn test_status_change_racing_new_record_keeps_both() {
        let log = RequestLog::on_backend(Arc::new(SlowReadBackend::new(30)));
        let first = log.record(DocumentKind::Cv, "T").await;

        let updating = {
            let log = log.clone();
            let id = first.id.clone();
            tokio::spawn(async move { log.set_status(&id, RequestStatus::Processing).await })
        };
        let second = log.record(DocumentKind::Lm, "L").await;
        updating.await.unwrap().unwrap();

        let listed = log.list().await;
        assert_eq!(listed.len(), 2);
        let first_now = listed.iter().find(|r| r.id == first.id).unwrap();
        assert_eq!(first_now.status, RequestStatus::Processing);
        assert!(listed.iter().any(|r| r.id == second.id));

        log.clear().await.unwrap();
        assert!(log.list().await.is_empty());
    }
}
