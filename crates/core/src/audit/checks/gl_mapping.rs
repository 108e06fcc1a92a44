//! Booked invoices without a GL account.

use crate::audit::error::AuditError;
use crate::audit::findings::capped_details;
use crate::audit::ledger::Invoice;
use crate::audit::source::{AuditContext, InvoiceFilter, fetch_all};
use crate::audit::types::{CheckId, CheckResult};

const ID: CheckId = CheckId::MissingGlMappings;

/// Unmapped invoices from this count on fail the check.
pub const FAIL_AT: usize = 5;

/// Store filter: booked invoices with no GL account.
#[must_use]
pub fn unmapped_filter() -> InvoiceFilter {
    InvoiceFilter {
        without_gl_account: true,
        ..InvoiceFilter::booked()
    }
}

/// Verdict over unmapped invoices; exempt provenance is ignored.
#[must_use]
pub fn evaluate(unmapped: &[Invoice]) -> CheckResult {
    let numbers: Vec<String> = unmapped
        .iter()
        .filter(|invoice| !invoice.provenance.is_exempt())
        .map(|invoice| invoice.invoice_number.clone())
        .collect();

    if numbers.is_empty() {
        return CheckResult::pass(ID, "Every booked invoice has a GL account");
    }

    let summary = format!("{} booked invoices have no GL account", numbers.len());
    let result = if numbers.len() < FAIL_AT {
        CheckResult::warn(ID, summary)
    } else {
        CheckResult::fail(ID, summary)
    };
    result.with_details(capped_details(numbers))
}

/// Reads unmapped invoices.
pub async fn run(ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    let AuditContext {
        source, company, ..
    } = ctx;
    let filter = unmapped_filter();
    let filter = &filter;
    let unmapped = fetch_all(ctx.page_size, move |range| {
        source.invoices(company, filter, range)
    })
    .await?;
    Ok(evaluate(&unmapped))
}
