//! In-memory ledger store.
//!
//! Holds ledger rows per company and answers [`LedgerSource`] reads with the
//! same joins, filters and ordering as the database repository. An optional
//! row cap truncates every response the way the hosted store does.

use std::collections::HashMap;

use async_trait::async_trait;

use keystone_shared::types::{AccountId, CompanyId, JournalEntryId, RowRange};

use super::error::AuditError;
use super::ledger::{
    Account, AccountType, BankAccount, EntryStatus, Invoice, JournalEntry, JournalLine,
    LineWithEntry, Payment, PostedLine,
};
use super::reference::EntityKind;
use super::source::{InvoiceFilter, LedgerSource};

/// All rows of one company.
#[derive(Debug, Clone, Default)]
pub struct CompanyLedger {
    /// Chart of accounts.
    pub accounts: Vec<Account>,
    /// Journal entry headers.
    pub entries: Vec<JournalEntry>,
    /// Journal entry lines.
    pub lines: Vec<JournalLine>,
    /// Invoices.
    pub invoices: Vec<Invoice>,
    /// Payments.
    pub payments: Vec<Payment>,
    /// Bank accounts.
    pub bank_accounts: Vec<BankAccount>,
}

impl CompanyLedger {
    fn entry_status(&self) -> HashMap<JournalEntryId, (EntryStatus, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.id, (entry.status, entry.entry_number.as_str())))
            .collect()
    }

    fn account_types(&self) -> HashMap<AccountId, AccountType> {
        self.accounts
            .iter()
            .map(|account| (account.id, account.account_type))
            .collect()
    }

    fn posted_lines(&self) -> Vec<PostedLine> {
        let entries = self.entry_status();
        let types = self.account_types();
        let mut lines: Vec<PostedLine> = self
            .lines
            .iter()
            .filter(|line| {
                entries
                    .get(&line.journal_entry_id)
                    .is_some_and(|(status, _)| *status == EntryStatus::Posted)
            })
            .map(|line| PostedLine {
                id: line.id,
                journal_entry_id: line.journal_entry_id,
                account_id: line.account_id,
                account_type: types.get(&line.account_id).copied(),
                debit: line.debit,
                credit: line.credit,
            })
            .collect();
        lines.sort_by_key(|line| line.id);
        lines
    }
}

/// A [`LedgerSource`] backed by plain vectors.
///
/// Every page request rebuilds the joined, sorted view of the collection
/// before slicing it, so a full read costs O(n * n / page_size). Fine for
/// fixtures and tests; large ledgers belong in the database repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    companies: HashMap<CompanyId, CompanyLedger>,
    row_cap: Option<u64>,
}

impl InMemoryLedger {
    /// Creates an empty store with no row cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncates every response to at most `cap` rows.
    #[must_use]
    pub fn with_row_cap(mut self, cap: u64) -> Self {
        self.row_cap = Some(cap);
        self
    }

    /// Rows of `company`, created empty on first use.
    pub fn company_mut(&mut self, company: CompanyId) -> &mut CompanyLedger {
        self.companies.entry(company).or_default()
    }

    /// Replaces every row of `company`.
    pub fn insert(&mut self, company: CompanyId, ledger: CompanyLedger) {
        self.companies.insert(company, ledger);
    }

    fn scoped<T>(
        &self,
        company: CompanyId,
        range: RowRange,
        rows: impl FnOnce(&CompanyLedger) -> Vec<T>,
    ) -> Vec<T> {
        let Some(ledger) = self.companies.get(&company) else {
            return Vec::new();
        };
        let mut rows = rows(ledger);
        let end = rows.len().min(usize::try_from(range.end).unwrap_or(usize::MAX));
        let start = usize::try_from(range.start).unwrap_or(usize::MAX).min(end);
        rows.truncate(end);
        let mut page = rows.split_off(start);
        if let Some(cap) = self.row_cap {
            page.truncate(usize::try_from(cap).unwrap_or(usize::MAX));
        }
        page
    }
}

fn sorted_by<T: Clone, K: Ord>(rows: &[T], key: impl Fn(&T) -> K) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by_key(key);
    rows
}

#[async_trait]
impl LedgerSource for InMemoryLedger {
    async fn posted_lines(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<PostedLine>, AuditError> {
        Ok(self.scoped(company, range, CompanyLedger::posted_lines))
    }

    async fn posted_lines_for_accounts(
        &self,
        company: CompanyId,
        accounts: &[AccountId],
        range: RowRange,
    ) -> Result<Vec<PostedLine>, AuditError> {
        Ok(self.scoped(company, range, |ledger| {
            ledger
                .posted_lines()
                .into_iter()
                .filter(|line| accounts.contains(&line.account_id))
                .collect()
        }))
    }

    async fn lines_with_entries(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<LineWithEntry>, AuditError> {
        Ok(self.scoped(company, range, |ledger| {
            let entries = ledger.entry_status();
            let mut lines: Vec<LineWithEntry> = ledger
                .lines
                .iter()
                .filter_map(|line| {
                    let (_, number) = entries.get(&line.journal_entry_id)?;
                    Some(LineWithEntry {
                        id: line.id,
                        journal_entry_id: line.journal_entry_id,
                        entry_number: (*number).to_string(),
                        account_id: line.account_id,
                    })
                })
                .collect();
            lines.sort_by_key(|line| line.id);
            lines
        }))
    }

    async fn entries_by_reference(
        &self,
        company: CompanyId,
        kind: EntityKind,
        range: RowRange,
    ) -> Result<Vec<JournalEntry>, AuditError> {
        Ok(self.scoped(company, range, |ledger| {
            let matching: Vec<JournalEntry> = ledger
                .entries
                .iter()
                .filter(|entry| entry.reference.is_some_and(|r| r.kind == kind))
                .cloned()
                .collect();
            sorted_by(&matching, |entry| entry.id)
        }))
    }

    async fn draft_entries(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<JournalEntry>, AuditError> {
        Ok(self.scoped(company, range, |ledger| {
            let drafts: Vec<JournalEntry> = ledger
                .entries
                .iter()
                .filter(|entry| entry.status == EntryStatus::Draft)
                .cloned()
                .collect();
            sorted_by(&drafts, |entry| (entry.created_at, entry.id))
        }))
    }

    async fn accounts(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<Account>, AuditError> {
        Ok(self.scoped(company, range, |ledger| {
            sorted_by(&ledger.accounts, |account| account.id)
        }))
    }

    async fn invoices(
        &self,
        company: CompanyId,
        filter: &InvoiceFilter,
        range: RowRange,
    ) -> Result<Vec<Invoice>, AuditError> {
        Ok(self.scoped(company, range, |ledger| {
            let matching: Vec<Invoice> = ledger
                .invoices
                .iter()
                .filter(|invoice| filter.matches(invoice))
                .cloned()
                .collect();
            sorted_by(&matching, |invoice| invoice.id)
        }))
    }

    async fn payments(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<Payment>, AuditError> {
        Ok(self.scoped(company, range, |ledger| {
            sorted_by(&ledger.payments, |payment| payment.id)
        }))
    }

    async fn bank_accounts(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<BankAccount>, AuditError> {
        Ok(self.scoped(company, range, |ledger| {
            sorted_by(&ledger.bank_accounts, |bank| bank.id)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use keystone_shared::types::JournalLineId;
    use rust_decimal::Decimal;

    fn entry(status: EntryStatus) -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::new(),
            entry_number: "JE-0001".to_string(),
            status,
            entry_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            created_at: Utc::now(),
            reference: None,
        }
    }

    fn line(entry: &JournalEntry) -> JournalLine {
        JournalLine {
            id: JournalLineId::new(),
            journal_entry_id: entry.id,
            account_id: AccountId::new(),
            debit: Decimal::ONE,
            credit: Decimal::ZERO,
        }
    }

    #[tokio::test]
    async fn test_posted_lines_skip_drafts() {
        let company = CompanyId::new();
        let posted = entry(EntryStatus::Posted);
        let draft = entry(EntryStatus::Draft);
        let mut store = InMemoryLedger::new();
        let ledger = store.company_mut(company);
        ledger.lines = vec![line(&posted), line(&draft)];
        ledger.entries = vec![posted.clone(), draft];

        let lines = store
            .posted_lines(company, RowRange::page(0, 10))
            .await
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].journal_entry_id, posted.id);
        assert_eq!(lines[0].account_type, None);
    }

    #[tokio::test]
    async fn test_row_cap_truncates_responses() {
        let company = CompanyId::new();
        let posted = entry(EntryStatus::Posted);
        let mut store = InMemoryLedger::new().with_row_cap(3);
        let ledger = store.company_mut(company);
        ledger.lines = (0..5).map(|_| line(&posted)).collect();
        ledger.entries = vec![posted];

        let first = store
            .posted_lines(company, RowRange::page(0, 100))
            .await
            .unwrap();
        assert_eq!(first.len(), 3);

        let tail = store
            .posted_lines(company, RowRange { start: 3, end: 6 })
            .await
            .unwrap();
        assert_eq!(tail.len(), 2);
    }

    #[tokio::test]
    async fn test_other_company_is_invisible() {
        let mut store = InMemoryLedger::new();
        store.company_mut(CompanyId::new()).entries = vec![entry(EntryStatus::Draft)];

        let drafts = store
            .draft_entries(CompanyId::new(), RowRange::page(0, 10))
            .await
            .unwrap();
        assert!(drafts.is_empty());
    }
}
