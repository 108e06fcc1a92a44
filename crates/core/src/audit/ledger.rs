//! Ledger rows as the audit sees them.
//!
//! These are read-only projections of the store's tables. Joined views
//! (`PostedLine`, `LineWithEntry`) carry exactly the parent columns the
//! checks need, so checks never re-join.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use keystone_shared::types::{
    AccountId, BankAccountId, InvoiceId, JournalEntryId, JournalLineId, PaymentId,
};

use super::provenance::Provenance;
use super::reference::EntityRef;

/// Chart of accounts classification.
///
/// Asset and expense accounts are debit-normal; the rest are credit-normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account.
    Asset,
    /// Liability account.
    Liability,
    /// Equity account.
    Equity,
    /// Revenue account.
    Revenue,
    /// Expense account.
    Expense,
}

impl AccountType {
    /// Returns the stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Signed contribution of a line to an account of this type,
    /// following the account's natural balance.
    #[must_use]
    pub fn natural_balance(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Asset | Self::Expense => debit - credit,
            Self::Liability | Self::Equity | Self::Revenue => credit - debit,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown account type: {s}")),
        }
    }
}

/// Journal entry lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Pending, not yet counted in balances.
    Draft,
    /// Final and counted in balances.
    Posted,
}

impl EntryStatus {
    /// Returns the stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
        }
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "posted" => Ok(Self::Posted),
            _ => Err(format!("Unknown journal entry status: {s}")),
        }
    }
}

/// Direction of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    /// Billed to a client (AR).
    Receivable,
    /// Owed to a vendor (AP).
    Payable,
}

impl InvoiceType {
    /// Returns the stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receivable => "receivable",
            Self::Payable => "payable",
        }
    }
}

impl FromStr for InvoiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "receivable" => Ok(Self::Receivable),
            "payable" => Ok(Self::Payable),
            _ => Err(format!("Unknown invoice type: {s}")),
        }
    }
}

/// Invoice workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Being prepared; no journal entry expected yet.
    Draft,
    /// Submitted.
    Pending,
    /// Approved for payment or collection.
    Approved,
    /// Past due.
    Overdue,
    /// Settled in full.
    Paid,
    /// Cancelled.
    Voided,
}

impl InvoiceStatus {
    /// Statuses that put an invoice outside the books entirely.
    pub const UNBOOKED: [Self; 2] = [Self::Draft, Self::Voided];

    /// Returns the stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Overdue => "overdue",
            Self::Paid => "paid",
            Self::Voided => "voided",
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "overdue" => Ok(Self::Overdue),
            "paid" => Ok(Self::Paid),
            "voided" => Ok(Self::Voided),
            _ => Err(format!("Unknown invoice status: {s}")),
        }
    }
}

/// A chart of accounts row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Account number, e.g. `1000`.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Whether the account accepts postings.
    pub is_active: bool,
}

/// A journal entry header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Entry ID.
    pub id: JournalEntryId,
    /// Human-facing entry number, e.g. `JE-0042`.
    pub entry_number: String,
    /// Lifecycle state.
    pub status: EntryStatus,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Parsed `reference` link to the business record, if any.
    pub reference: Option<EntityRef>,
}

/// A journal entry line as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Line ID.
    pub id: JournalLineId,
    /// Parent entry.
    pub journal_entry_id: JournalEntryId,
    /// Account the line posts to. May not exist in the chart.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// A line of a posted entry, joined with its account's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedLine {
    /// Line ID.
    pub id: JournalLineId,
    /// Parent entry.
    pub journal_entry_id: JournalEntryId,
    /// Account the line posts to.
    pub account_id: AccountId,
    /// Type of the account, `None` when the account no longer exists.
    pub account_type: Option<AccountType>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// A line of any entry, joined with its parent's entry number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWithEntry {
    /// Line ID.
    pub id: JournalLineId,
    /// Parent entry.
    pub journal_entry_id: JournalEntryId,
    /// Parent entry number.
    pub entry_number: String,
    /// Account the line posts to.
    pub account_id: AccountId,
}

/// An invoice, receivable or payable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Invoice number, e.g. `INV-0012`.
    pub invoice_number: String,
    /// Direction.
    pub invoice_type: InvoiceType,
    /// Workflow state.
    pub status: InvoiceStatus,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Outstanding amount.
    pub balance_due: Decimal,
    /// Revenue or expense account the invoice books to.
    pub gl_account_id: Option<AccountId>,
    /// Where the record came from, parsed from `notes`.
    pub provenance: Provenance,
}

/// A payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID.
    pub id: PaymentId,
    /// Check or transfer reference.
    pub reference_number: Option<String>,
    /// Where the record came from, parsed from `notes`.
    pub provenance: Provenance,
}

impl Payment {
    /// Label used in findings: the reference number, falling back to the ID.
    #[must_use]
    pub fn label(&self) -> String {
        match self.reference_number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => number.to_string(),
            _ => self.id.to_string(),
        }
    }
}

/// A bank account and its link to the general ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Bank account ID.
    pub id: BankAccountId,
    /// Display name.
    pub name: String,
    /// Balance reported by the bank.
    pub current_balance: Decimal,
    /// Dedicated cash sub-account, if one is linked.
    pub gl_account_id: Option<AccountId>,
}
