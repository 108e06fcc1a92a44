//! The audit checks.
//!
//! Each check reads what it needs through its own queries and returns one
//! [`CheckResult`]. Checks share nothing and can run in any order.

pub mod balance_sheet;
pub mod bank;
pub mod coverage;
pub mod drafts;
pub mod gl_mapping;
pub mod orphans;
pub mod revenue_timing;
pub mod subledger;
pub mod trial_balance;

use super::error::AuditError;
use super::source::AuditContext;
use super::types::{CheckId, CheckResult};

/// Runs the check identified by `id`.
pub async fn run(id: CheckId, ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    match id {
        CheckId::TrialBalance => trial_balance::run(ctx).await,
        CheckId::BalanceSheet => balance_sheet::run(ctx).await,
        CheckId::InvoiceCoverage => coverage::run_invoices(ctx).await,
        CheckId::PaymentCoverage => coverage::run_payments(ctx).await,
        CheckId::BankReconciliation => bank::run(ctx).await,
        CheckId::ArReconciliation => subledger::run(subledger::Subledger::Receivable, ctx).await,
        CheckId::ApReconciliation => subledger::run(subledger::Subledger::Payable, ctx).await,
        CheckId::UnpostedEntries => drafts::run(ctx).await,
        CheckId::MissingGlMappings => gl_mapping::run(ctx).await,
        CheckId::OrphanedLines => orphans::run(ctx).await,
        CheckId::RevenueTiming => revenue_timing::run(ctx).await,
    }
}
