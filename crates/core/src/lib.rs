//! Core audit logic for Keystone.
//!
//! This crate contains the ledger audit engine with ZERO web or database dependencies.
//! Checks read ledger rows through the `LedgerSource` trait; the database and
//! in-memory stores implement it.
//!
//! # Modules
//!
//! - `audit` - Ledger integrity checks, grading, and orchestration

pub mod audit;
