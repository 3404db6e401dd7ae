//! Unread-activity tracking.
//!
//! A view marker per (request, user) pair records when the user last opened
//! the request. Comments by others after that point count as unread; a user
//! who never opened the request sees every foreign comment as unread.

use domain::models::RequestView;
use persistence::repositories::{CommentRepository, ReportRequestRepository, RequestViewRepository};
use uuid::Uuid;

use crate::error::EngineError;

/// Tracks request views and unread comment counts.
#[derive(Clone)]
pub struct ViewTracker {
    requests: ReportRequestRepository,
    views: RequestViewRepository,
    comments: CommentRepository,
}

impl ViewTracker {
    pub fn new(
        requests: ReportRequestRepository,
        views: RequestViewRepository,
        comments: CommentRepository,
    ) -> Self {
        Self {
            requests,
            views,
            comments,
        }
    }

    /// Record that the user opened the request just now. Idempotent; repeat
    /// views simply move the marker forward.
    pub async fn mark_viewed(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> Result<RequestView, EngineError> {
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Request"))?;
        Ok(self.views.upsert(request_id, user_id).await?)
    }

    /// Comments by other users since the user's last view.
    pub async fn unread_count(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> Result<i64, EngineError> {
        let since = self
            .views
            .find(request_id, user_id)
            .await?
            .map(|view| view.viewed_at);
        Ok(self.comments.count_unread(request_id, user_id, since).await?)
    }
}
