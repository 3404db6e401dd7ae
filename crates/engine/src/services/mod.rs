//! Engine services.

pub mod archive;
pub mod attachments;
pub mod audit;
pub mod email;
pub mod identity;
pub mod lifecycle;
pub mod notify;
pub mod telegram;
pub mod views;

pub use archive::SevenZipArchiver;
pub use attachments::AttachmentService;
pub use audit::AuditRecorder;
pub use email::EmailService;
pub use identity::IdentityResolver;
pub use lifecycle::{LifecycleEngine, RequestWithUnread};
pub use notify::NotificationDispatcher;
pub use telegram::TelegramClient;
pub use views::ViewTracker;
