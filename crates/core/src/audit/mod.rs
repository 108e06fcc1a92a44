//! Ledger integrity audit.
//!
//! Runs a fixed set of independent checks against one company's ledger and
//! grades the outcome:
//! - Trial balance and balance sheet equation
//! - Invoice and payment journal entry coverage
//! - Bank, AR and AP reconciliation against the GL
//! - Stale drafts, missing GL mappings and orphaned lines
//! - Revenue recognition timing
//!
//! Checks read through [`LedgerSource`], paging every collection with
//! [`fetch_all`].

pub mod checks;
pub mod error;
pub mod findings;
pub mod grade;
pub mod ledger;
pub mod memory;
pub mod provenance;
pub mod reference;
pub mod service;
pub mod source;
pub mod types;


pub use error::AuditError;
pub use ledger::{
    Account, AccountType, BankAccount, EntryStatus, Invoice, InvoiceStatus, InvoiceType,
    JournalEntry, JournalLine, LineWithEntry, Payment, PostedLine,
};
pub use memory::{CompanyLedger, InMemoryLedger};
pub use provenance::Provenance;
pub use reference::{EntityKind, EntityRef};
pub use service::AuditService;
pub use source::{AuditContext, InvoiceFilter, LedgerSource, fetch_all};
pub use types::{AuditReport, CheckCounts, CheckId, CheckResult, CheckStatus, Grade};
