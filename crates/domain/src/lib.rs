//! Domain layer for the Report Desk backend.
//!
//! This crate contains:
//! - Domain models (User, ReportRequest, Comment, Attachment, log entries)
//! - Pure business rules (permission policy, field validation)
//! - Service traits for external collaborators (mail, chat bot, archiver, directory)

pub mod models;
pub mod services;
