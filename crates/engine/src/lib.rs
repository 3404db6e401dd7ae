//! Report Desk engine.
//!
//! Orchestrates the request lifecycle on top of the domain and persistence
//! layers: authentication against the employee directory, status transitions,
//! comments, attachments with on-demand encrypted archiving, the audit trail,
//! outbound notifications and unread-activity tracking.

pub mod config;
pub mod error;
pub mod logging;
pub mod services;

pub use config::Config;
pub use error::EngineError;
