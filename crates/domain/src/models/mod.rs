//! Domain model definitions.

pub mod attachment;
pub mod audit;
pub mod comment;
pub mod notification;
pub mod request;
pub mod user;
pub mod view;

pub use attachment::{Attachment, AttachmentKind, AttachmentListItem, UploadedFile};
pub use audit::{AuditAction, AuditDetails, AuditEntry, AuditResourceType, RecordAuditInput, RequestContext};
pub use comment::Comment;
pub use notification::{DeliveryOutcome, NotificationKind, NotificationLogEntry};
pub use request::{
    DateRangeType, FileFormat, OutputType, Priority, ReportRequest, RequestFields,
    RequestStatus, SourceSystem,
};
pub use user::{Actor, ExternalIdentity, User, UserRole};
pub use view::RequestView;
