//! Trial balance: total debits equal total credits across posted lines.

use rust_decimal::Decimal;

use keystone_shared::types::format_usd;

use crate::audit::error::AuditError;
use crate::audit::findings::BALANCE_TOLERANCE;
use crate::audit::ledger::PostedLine;
use crate::audit::source::{AuditContext, fetch_all};
use crate::audit::types::{CheckId, CheckResult};

const ID: CheckId = CheckId::TrialBalance;

/// Debit and credit totals over posted lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialBalance {
    /// Number of posted lines summed.
    pub line_count: usize,
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
}

impl TrialBalance {
    /// Sums `lines`.
    #[must_use]
    pub fn from_lines(lines: &[PostedLine]) -> Self {
        Self {
            line_count: lines.len(),
            total_debit: lines.iter().map(|l| l.debit).sum(),
            total_credit: lines.iter().map(|l| l.credit).sum(),
        }
    }

    /// Absolute difference between the totals.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        (self.total_debit - self.total_credit).abs()
    }

    /// Returns true if the totals agree within rounding tolerance.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference() <= BALANCE_TOLERANCE
    }

    /// Verdict for the report.
    #[must_use]
    pub fn to_result(&self) -> CheckResult {
        if self.line_count == 0 {
            return CheckResult::pass(ID, "No posted journal entry lines");
        }

        if self.is_balanced() {
            return CheckResult::pass(
                ID,
                format!(
                    "Debits equal credits across {} posted lines ({})",
                    self.line_count,
                    format_usd(self.total_debit)
                ),
            );
        }

        CheckResult::fail(
            ID,
            format!("Ledger is out of balance by {}", format_usd(self.difference())),
        )
        .with_details(vec![
            format!("Total debits: {}", format_usd(self.total_debit)),
            format!("Total credits: {}", format_usd(self.total_credit)),
            format!("Difference: {}", format_usd(self.difference())),
        ])
    }
}

/// Reads every posted line and checks the totals.
pub async fn run(ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    let AuditContext {
        source, company, ..
    } = ctx;
    let lines = fetch_all(ctx.page_size, move |range| source.posted_lines(company, range)).await?;
    Ok(TrialBalance::from_lines(&lines).to_result())
}
