//! Audit trail recorder.
//!
//! Appending to the trail must never break the operation being audited:
//! insert failures are logged and discarded.

use domain::models::{AuditEntry, RecordAuditInput};
use persistence::repositories::AuditLogRepository;
use tracing::error;
use uuid::Uuid;

use crate::error::EngineError;

/// Records and reads the append-only audit trail.
#[derive(Clone)]
pub struct AuditRecorder {
    repository: AuditLogRepository,
}

impl AuditRecorder {
    pub fn new(repository: AuditLogRepository) -> Self {
        Self { repository }
    }

    /// Append one entry. Failures are swallowed after logging.
    pub async fn record(&self, input: RecordAuditInput) {
        if let Err(e) = self.repository.insert(input).await {
            error!("Failed to record audit entry: {}", e);
        }
    }

    /// Append one entry without waiting for the insert.
    pub fn record_async(&self, input: RecordAuditInput) {
        self.repository.insert_async(input);
    }

    /// Paginated trail, newest first, with the total count.
    pub async fn list(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<AuditEntry>, i64), EngineError> {
        Ok(self.repository.list(page, page_size).await?)
    }

    /// Entries for one resource, newest first.
    pub async fn timeline(&self, resource_id: &str) -> Result<Vec<AuditEntry>, EngineError> {
        Ok(self.repository.timeline(resource_id).await?)
    }

    /// Entries recorded for one actor, newest first.
    pub async fn for_actor(&self, actor_id: Uuid) -> Result<Vec<AuditEntry>, EngineError> {
        Ok(self.repository.for_actor(actor_id).await?)
    }
}
