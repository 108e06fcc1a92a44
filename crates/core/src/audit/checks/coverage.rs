//! Invoice and payment journal entry coverage.
//!
//! Every booked invoice and every payment should be referenced by at least
//! one journal entry. Records produced by automation or bulk import are
//! journalized in batches elsewhere and are left out.

use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use keystone_shared::types::format_percent;

use crate::audit::error::AuditError;
use crate::audit::findings::{capped_details, percent_of};
use crate::audit::ledger::JournalEntry;
use crate::audit::reference::EntityKind;
use crate::audit::source::{AuditContext, InvoiceFilter, fetch_all};
use crate::audit::types::{CheckId, CheckResult};

/// Share of uncovered records that still only warns.
pub const COVERAGE_WARN_PCT: Decimal = dec!(10);

/// IDs of the records of `kind` that at least one entry references.
#[must_use]
pub fn referenced_ids(entries: &[JournalEntry], kind: EntityKind) -> HashSet<Uuid> {
    entries
        .iter()
        .filter_map(|entry| entry.reference)
        .filter(|reference| reference.kind == kind)
        .map(|reference| reference.id)
        .collect()
}

/// Records checked and the labels of those without an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    /// Records checked.
    pub total: usize,
    /// Labels of uncovered records, in input order.
    pub missing: Vec<String>,
}

impl Coverage {
    /// Splits `records` by whether their ID is in `referenced`.
    pub fn measure<T>(
        records: &[T],
        referenced: &HashSet<Uuid>,
        id_of: impl Fn(&T) -> Uuid,
        label_of: impl Fn(&T) -> String,
    ) -> Self {
        let missing = records
            .iter()
            .filter(|record| !referenced.contains(&id_of(record)))
            .map(label_of)
            .collect();
        Self {
            total: records.len(),
            missing,
        }
    }

    /// Uncovered share in percent.
    #[must_use]
    pub fn missing_pct(&self) -> Decimal {
        percent_of(self.missing.len(), self.total)
    }

    /// Verdict: none missing passes, up to 10% warns, otherwise fails.
    #[must_use]
    pub fn to_result(&self, id: CheckId, noun: &str) -> CheckResult {
        if self.total == 0 {
            return CheckResult::pass(id, format!("No {noun} to check"));
        }
        if self.missing.is_empty() {
            return CheckResult::pass(
                id,
                format!("All {} {noun} have journal entries", self.total),
            );
        }

        let pct = self.missing_pct();
        let summary = format!(
            "{} of {} {noun} ({}) have no journal entry",
            self.missing.len(),
            self.total,
            format_percent(pct)
        );
        let result = if pct <= COVERAGE_WARN_PCT {
            CheckResult::warn(id, summary)
        } else {
            CheckResult::fail(id, summary)
        };
        result.with_details(capped_details(self.missing.clone()))
    }
}

/// Booked, non-exempt invoices against `invoice:` entries.
pub async fn run_invoices(ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    let AuditContext {
        source, company, ..
    } = ctx;
    let filter = InvoiceFilter::booked();
    let filter = &filter;

    let invoices = fetch_all(ctx.page_size, move |range| {
        source.invoices(company, filter, range)
    })
    .await?;
    let entries = fetch_all(ctx.page_size, move |range| {
        source.entries_by_reference(company, EntityKind::Invoice, range)
    })
    .await?;

    let invoices: Vec<_> = invoices
        .into_iter()
        .filter(|invoice| !invoice.provenance.is_exempt())
        .collect();
    let referenced = referenced_ids(&entries, EntityKind::Invoice);

    Ok(Coverage::measure(
        &invoices,
        &referenced,
        |invoice| invoice.id.into_inner(),
        |invoice| invoice.invoice_number.clone(),
    )
    .to_result(CheckId::InvoiceCoverage, "invoices"))
}

/// Non-exempt payments against `payment:` entries.
pub async fn run_payments(ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    let AuditContext {
        source, company, ..
    } = ctx;

    let payments = fetch_all(ctx.page_size, move |range| source.payments(company, range)).await?;
    let entries = fetch_all(ctx.page_size, move |range| {
        source.entries_by_reference(company, EntityKind::Payment, range)
    })
    .await?;

    let payments: Vec<_> = payments
        .into_iter()
        .filter(|payment| !payment.provenance.is_exempt())
        .collect();
    let referenced = referenced_ids(&entries, EntityKind::Payment);

    Ok(Coverage::measure(
        &payments,
        &referenced,
        |payment| payment.id.into_inner(),
        crate::audit::ledger::Payment::label,
    )
    .to_result(CheckId::PaymentCoverage, "payments"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::ledger::EntryStatus;
    use crate::audit::reference::EntityRef;
    use crate::audit::types::CheckStatus;
    use chrono::{NaiveDate, Utc};
    use keystone_shared::types::JournalEntryId;
    use rstest::rstest;

    fn entry(reference: Option<EntityRef>) -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::new(),
            entry_number: "JE-0001".to_string(),
            status: EntryStatus::Posted,
            entry_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            created_at: Utc::now(),
            reference,
        }
    }

    fn coverage(total: usize, missing: usize) -> Coverage {
        Coverage {
            total,
            missing: (0..missing).map(|i| format!("INV-{i:04}")).collect(),
        }
    }

    #[test]
    fn test_referenced_ids_keeps_matching_kind() {
        let invoice = Uuid::new_v4();
        let payment = Uuid::new_v4();
        let entries = vec![
            entry(Some(EntityRef::new(EntityKind::Invoice, invoice))),
            entry(Some(EntityRef::new(EntityKind::Payment, payment))),
            entry(None),
        ];

        let ids = referenced_ids(&entries, EntityKind::Invoice);
        assert_eq!(ids, HashSet::from([invoice]));
    }

    #[test]
    fn test_measure_lists_uncovered_records() {
        let covered = Uuid::new_v4();
        let uncovered = Uuid::new_v4();
        let records = vec![(covered, "INV-0001"), (uncovered, "INV-0002")];

        let result = Coverage::measure(
            &records,
            &HashSet::from([covered]),
            |r| r.0,
            |r| r.1.to_string(),
        );
        assert_eq!(result.total, 2);
        assert_eq!(result.missing, vec!["INV-0002".to_string()]);
    }

    #[rstest]
    #[case(0, 0, CheckStatus::Pass)]
    #[case(50, 0, CheckStatus::Pass)]
    #[case(100, 1, CheckStatus::Warn)]
    #[case(100, 10, CheckStatus::Warn)]
    #[case(10000, 1001, CheckStatus::Fail)]
    #[case(3, 3, CheckStatus::Fail)]
    fn test_coverage_thresholds(
        #[case] total: usize,
        #[case] missing: usize,
        #[case] expected: CheckStatus,
    ) {
        let result = coverage(total, missing).to_result(CheckId::InvoiceCoverage, "invoices");
        assert_eq!(result.status, expected);
    }

    #[test]
    fn test_missing_details_are_capped() {
        let result = coverage(20, 12).to_result(CheckId::InvoiceCoverage, "invoices");
        assert_eq!(result.summary, "12 of 20 invoices (60.00%) have no journal entry");
        assert_eq!(result.details.len(), 11);
        assert_eq!(result.details[10], "...and 2 more");
    }
}
