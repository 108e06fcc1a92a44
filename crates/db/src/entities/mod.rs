//! `SeaORM` entity definitions for the ledger tables.
//!
//! Every table is tenant-scoped by `company_id`. Status and type columns
//! are stored as lowercase text.

pub mod bank_accounts;
pub mod chart_of_accounts;
pub mod invoices;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod payments;
