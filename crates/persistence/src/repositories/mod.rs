//! Repository layer for database operations.

pub mod attachment;
pub mod audit_log;
pub mod comment;
pub mod notification_log;
pub mod report_request;
pub mod request_view;
pub mod user;

pub use attachment::AttachmentRepository;
pub use audit_log::AuditLogRepository;
pub use comment::CommentRepository;
pub use notification_log::NotificationLogRepository;
pub use report_request::{
    DepartmentCount, ReportRequestRepository, RequestListFilter, RequestStats, StatusCount,
};
pub use request_view::RequestViewRepository;
pub use user::UserRepository;

/// Offset for a 1-based page, widened to i64 before multiplying so oversized
/// page numbers cannot overflow.
pub(crate) fn page_offset(page: u32, per_page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * i64::from(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset_first_page() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(0, 20), 0);
    }

    #[test]
    fn test_page_offset_later_pages() {
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(2, 100), 100);
    }

    #[test]
    fn test_page_offset_huge_page_does_not_overflow() {
        let offset = page_offset(u32::MAX, 100);
        assert_eq!(offset, (i64::from(u32::MAX) - 1) * 100);
    }
}
