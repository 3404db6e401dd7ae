//! Domain services: pure business rules and collaborator traits.

pub mod archive;
pub mod directory;
pub mod policy;
pub mod transport;

pub use archive::{ArchiveError, ArchiveTool, MockArchiveTool};
pub use directory::{DirectoryClient, DirectoryEntry, StaticDirectory};
pub use policy::Denied;
pub use transport::{
    ChatTransport, EmailTransport, MockChatTransport, MockEmailTransport, SentChatMessage,
    SentEmail,
};
