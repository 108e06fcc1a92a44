//! Shared types, errors, and configuration for Keystone.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for tenant-scoped ledger records
//! - Row ranges for paginated store reads
//! - Money formatting for human-readable findings
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, AuditConfig};
pub use error::{AppError, AppResult};
