//! The ledger store seam and its pagination helper.
//!
//! The store silently truncates any result set at a fixed row cap, so every
//! read goes through [`fetch_all`]: a check that reads only the first page
//! under-counts and reports a spurious pass.

use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use keystone_shared::types::{AccountId, CompanyId, RowRange};

use super::error::AuditError;
use super::ledger::{
    Account, BankAccount, Invoice, InvoiceStatus, InvoiceType, JournalEntry, LineWithEntry,
    Payment, PostedLine,
};
use super::reference::EntityKind;

/// Invoice selection pushed down to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    /// Only invoices of this direction.
    pub invoice_type: Option<InvoiceType>,
    /// Leave out invoices in any of these statuses.
    pub excluded_statuses: Vec<InvoiceStatus>,
    /// Only invoices without a GL account.
    pub without_gl_account: bool,
}

impl InvoiceFilter {
    /// Invoices that are on the books: neither draft nor voided.
    #[must_use]
    pub fn booked() -> Self {
        Self {
            excluded_statuses: InvoiceStatus::UNBOOKED.to_vec(),
            ..Self::default()
        }
    }

    /// Restricts to one direction.
    #[must_use]
    pub fn of_type(mut self, invoice_type: InvoiceType) -> Self {
        self.invoice_type = Some(invoice_type);
        self
    }

    /// Returns true if `invoice` satisfies the filter.
    #[must_use]
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.invoice_type.is_none_or(|t| t == invoice.invoice_type)
            && !self.excluded_statuses.contains(&invoice.status)
            && (!self.without_gl_account || invoice.gl_account_id.is_none())
    }
}

/// Read access to one store of tenant-scoped ledger rows.
///
/// Every method returns the rows of `range` within a stable ordering, scoped
/// to `company`. Implementations may return fewer rows than requested only
/// at the end of the collection or when the store's row cap bites.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Lines whose parent entry is posted, with the account type when the
    /// account still exists.
    async fn posted_lines(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<PostedLine>, AuditError>;

    /// Posted lines restricted to `accounts`.
    async fn posted_lines_for_accounts(
        &self,
        company: CompanyId,
        accounts: &[AccountId],
        range: RowRange,
    ) -> Result<Vec<PostedLine>, AuditError>;

    /// Every line regardless of status, with its parent's entry number.
    async fn lines_with_entries(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<LineWithEntry>, AuditError>;

    /// Entries whose `reference` starts with the prefix of `kind`.
    async fn entries_by_reference(
        &self,
        company: CompanyId,
        kind: EntityKind,
        range: RowRange,
    ) -> Result<Vec<JournalEntry>, AuditError>;

    /// Draft entries, oldest `created_at` first.
    async fn draft_entries(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<JournalEntry>, AuditError>;

    /// The chart of accounts.
    async fn accounts(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<Account>, AuditError>;

    /// Invoices matching `filter`.
    async fn invoices(
        &self,
        company: CompanyId,
        filter: &InvoiceFilter,
        range: RowRange,
    ) -> Result<Vec<Invoice>, AuditError>;

    /// Payments.
    async fn payments(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<Payment>, AuditError>;

    /// Bank accounts.
    async fn bank_accounts(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<BankAccount>, AuditError>;
}

/// Reads every row of a collection, page by page.
///
/// Starts at row 0 and requests `page_size` rows at a time until a page
/// comes back short or empty. A page size of zero is treated as one.
/// Any page error aborts the read.
pub async fn fetch_all<T, F, Fut>(page_size: u64, mut query: F) -> Result<Vec<T>, AuditError>
where
    F: FnMut(RowRange) -> Fut,
    Fut: Future<Output = Result<Vec<T>, AuditError>>,
{
    let page_size = page_size.max(1);
    let mut rows = Vec::new();
    let mut range = RowRange::page(0, page_size);

    loop {
        let page = query(range).await?;
        let fetched = u64::try_from(page.len()).unwrap_or(u64::MAX);
        rows.extend(page);

        if fetched < page_size {
            break;
        }
        debug!(offset = range.end, "Fetching next ledger page");
        range = range.next();
    }

    Ok(rows)
}

/// Everything a check needs to run: where to read, for whom, and when.
#[derive(Clone, Copy)]
pub struct AuditContext<'a> {
    /// Ledger store.
    pub source: &'a dyn LedgerSource,
    /// Tenant being audited.
    pub company: CompanyId,
    /// Rows per store read.
    pub page_size: u64,
    /// Reference time for age-based checks.
    pub now: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn numbers(total: u64) -> Vec<u64> {
        (0..total).collect()
    }

    async fn page_of(rows: &[u64], range: RowRange) -> Result<Vec<u64>, AuditError> {
        Ok(range.slice(rows).to_vec())
    }

    #[tokio::test]
    async fn test_fetch_all_reads_past_first_page() {
        let rows = numbers(2500);
        let fetched = fetch_all(1000, |range| page_of(&rows, range)).await.unwrap();
        assert_eq!(fetched, rows);
    }

    #[tokio::test]
    async fn test_fetch_all_requests_one_extra_page_on_exact_multiple() {
        let rows = numbers(2000);
        let requested = Mutex::new(Vec::new());
        let fetched = fetch_all(1000, |range| {
            requested.lock().unwrap().push(range);
            page_of(&rows, range)
        })
        .await
        .unwrap();

        assert_eq!(fetched.len(), 2000);
        assert_eq!(
            *requested.lock().unwrap(),
            vec![
                RowRange { start: 0, end: 1000 },
                RowRange { start: 1000, end: 2000 },
                RowRange { start: 2000, end: 3000 },
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_all_empty_collection() {
        let fetched = fetch_all(1000, |range| page_of(&[], range)).await.unwrap();
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_fails_on_mid_pagination_error() {
        let rows = numbers(2500);
        let result = fetch_all(1000, |range| {
            let rows = &rows;
            async move {
                if range.start >= 1000 {
                    return Err(AuditError::Query("canceling statement".to_string()));
                }
                page_of(rows, range).await
            }
        })
        .await;

        assert!(matches!(result, Err(AuditError::Query(msg)) if msg == "canceling statement"));
    }

    #[tokio::test]
    async fn test_fetch_all_clamps_zero_page_size() {
        let rows = numbers(3);
        let fetched = fetch_all(0, |range| page_of(&rows, range)).await.unwrap();
        assert_eq!(fetched, rows);
    }

    #[test]
    fn test_invoice_filter_matches() {
        use super::super::provenance::Provenance;
        use chrono::NaiveDate;
        use keystone_shared::types::InvoiceId;
        use rust_decimal::Decimal;

        let mut invoice = Invoice {
            id: InvoiceId::new(),
            invoice_number: "INV-0001".to_string(),
            invoice_type: InvoiceType::Receivable,
            status: InvoiceStatus::Pending,
            invoice_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            balance_due: Decimal::ONE_HUNDRED,
            gl_account_id: Some(AccountId::new()),
            provenance: Provenance::Manual,
        };

        let booked = InvoiceFilter::booked();
        assert!(booked.matches(&invoice));
        assert!(!booked.clone().of_type(InvoiceType::Payable).matches(&invoice));

        let unmapped = InvoiceFilter {
            without_gl_account: true,
            ..InvoiceFilter::booked()
        };
        assert!(!unmapped.matches(&invoice));
        invoice.gl_account_id = None;
        assert!(unmapped.matches(&invoice));

        invoice.status = InvoiceStatus::Voided;
        assert!(!booked.matches(&invoice));
    }
}
