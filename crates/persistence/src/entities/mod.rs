//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod attachment;
pub mod audit_log;
pub mod comment;
pub mod notification_log;
pub mod report_request;
pub mod request_view;
pub mod user;

pub use attachment::{AttachmentEntity, AttachmentKindDb, AttachmentWithUploaderEntity};
pub use audit_log::AuditLogEntity;
pub use comment::CommentEntity;
pub use notification_log::{DeliveryOutcomeDb, NotificationKindDb, NotificationLogEntity};
pub use report_request::{
    DateRangeTypeDb, FileFormatDb, OutputTypeDb, PriorityDb, ReportRequestEntity,
    RequestStatusDb, SourceSystemDb,
};
pub use request_view::RequestViewEntity;
pub use user::{UserEntity, UserRoleDb};
