//! Shared utilities and common types for the Report Desk backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Legacy digest utilities (MD5, for directory compatibility)
//! - Common validation logic

pub mod crypto;
pub mod validation;
