//! Revenue journalized far from its invoice date.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::audit::error::AuditError;
use crate::audit::findings::capped_details;
use crate::audit::ledger::{Invoice, InvoiceType, JournalEntry};
use crate::audit::reference::EntityKind;
use crate::audit::source::{AuditContext, InvoiceFilter, fetch_all};
use crate::audit::types::{CheckId, CheckResult};

const ID: CheckId = CheckId::RevenueTiming;

/// Largest tolerated gap between invoice and entry dates.
pub const MAX_DRIFT_DAYS: i64 = 30;

/// Earliest entry date per referenced invoice.
#[must_use]
pub fn recognition_dates(entries: &[JournalEntry]) -> HashMap<Uuid, NaiveDate> {
    let mut dates: HashMap<Uuid, NaiveDate> = HashMap::new();
    for entry in entries {
        let Some(reference) = entry.reference.filter(|r| r.kind == EntityKind::Invoice) else {
            continue;
        };
        dates
            .entry(reference.id)
            .and_modify(|date| *date = (*date).min(entry.entry_date))
            .or_insert(entry.entry_date);
    }
    dates
}

/// Verdict over receivable invoices and their recognition dates.
///
/// Invoices without an entry are left to the coverage check.
#[must_use]
pub fn evaluate(invoices: &[Invoice], recognized: &HashMap<Uuid, NaiveDate>) -> CheckResult {
    let mismatches: Vec<String> = invoices
        .iter()
        .filter_map(|invoice| {
            let entry_date = *recognized.get(&invoice.id.into_inner())?;
            let days = (entry_date - invoice.invoice_date).num_days().abs();
            (days > MAX_DRIFT_DAYS).then(|| {
                format!(
                    "{}: invoiced {}, journalized {} ({days} days apart)",
                    invoice.invoice_number, invoice.invoice_date, entry_date
                )
            })
        })
        .collect();

    if mismatches.is_empty() {
        return CheckResult::pass(
            ID,
            format!("Revenue is journalized within {MAX_DRIFT_DAYS} days of invoicing"),
        );
    }

    CheckResult::warn(
        ID,
        format!(
            "{} invoices journalized more than {MAX_DRIFT_DAYS} days from their invoice date",
            mismatches.len()
        ),
    )
    .with_details(capped_details(mismatches))
}

/// Compares booked receivable invoices with their earliest entry.
pub async fn run(ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    let AuditContext {
        source, company, ..
    } = ctx;
    let filter = InvoiceFilter::booked().of_type(InvoiceType::Receivable);
    let filter = &filter;

    let invoices = fetch_all(ctx.page_size, move |range| {
        source.invoices(company, filter, range)
    })
    .await?;
    let entries = fetch_all(ctx.page_size, move |range| {
        source.entries_by_reference(company, EntityKind::Invoice, range)
    })
    .await?;

    Ok(evaluate(&invoices, &recognition_dates(&entries)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::ledger::{EntryStatus, InvoiceStatus};
    use crate::audit::provenance::Provenance;
    use crate::audit::reference::EntityRef;
    use crate::audit::types::CheckStatus;
    use chrono::Utc;
    use keystone_shared::types::{InvoiceId, JournalEntryId};
    use rust_decimal::Decimal;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn invoice(number: &str, invoice_date: NaiveDate) -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            invoice_number: number.to_string(),
            invoice_type: InvoiceType::Receivable,
            status: InvoiceStatus::Approved,
            invoice_date,
            balance_due: Decimal::ONE_HUNDRED,
            gl_account_id: None,
            provenance: Provenance::Manual,
        }
    }

    fn entry(invoice: &Invoice, entry_date: NaiveDate) -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::new(),
            entry_number: "JE-0001".to_string(),
            status: EntryStatus::Posted,
            entry_date,
            created_at: Utc::now(),
            reference: Some(EntityRef::new(EntityKind::Invoice, invoice.id.into_inner())),
        }
    }

    #[test]
    fn test_earliest_entry_is_recognition_date() {
        let inv = invoice("INV-0001", date(1, 10));
        let entries = vec![entry(&inv, date(3, 1)), entry(&inv, date(1, 12))];
        let dates = recognition_dates(&entries);
        assert_eq!(dates[&inv.id.into_inner()], date(1, 12));
    }

    #[test]
    fn test_thirty_days_is_tolerated() {
        let inv = invoice("INV-0001", date(1, 1));
        let entries = vec![entry(&inv, date(1, 31))];
        let result = evaluate(&[inv], &recognition_dates(&entries));
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn test_drift_only_warns() {
        let late = invoice("INV-0002", date(1, 1));
        let early = invoice("INV-0003", date(5, 1));
        let unjournalized = invoice("INV-0004", date(1, 1));
        let entries = vec![entry(&late, date(2, 15)), entry(&early, date(3, 1))];

        let result = evaluate(&[late, early, unjournalized], &recognition_dates(&entries));
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(
            result.details,
            vec![
                "INV-0002: invoiced 2025-01-01, journalized 2025-02-15 (45 days apart)".to_string(),
                "INV-0003: invoiced 2025-05-01, journalized 2025-03-01 (61 days apart)".to_string(),
            ]
        );
    }
}
