//! Balance sheet equation with temporary accounts closed into equity.

use rust_decimal::Decimal;

use keystone_shared::types::format_usd;

use crate::audit::error::AuditError;
use crate::audit::findings::BALANCE_TOLERANCE;
use crate::audit::ledger::{AccountType, PostedLine};
use crate::audit::source::{AuditContext, fetch_all};
use crate::audit::types::{CheckId, CheckResult};

const ID: CheckId = CheckId::BalanceSheet;

/// Natural-balance totals per account type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceSheet {
    /// Total assets.
    pub assets: Decimal,
    /// Total liabilities.
    pub liabilities: Decimal,
    /// Total equity before closing.
    pub equity: Decimal,
    /// Total revenue.
    pub revenue: Decimal,
    /// Total expenses.
    pub expenses: Decimal,
}

impl BalanceSheet {
    /// Accumulates posted lines into the five buckets.
    ///
    /// Lines whose account no longer exists carry no type and are skipped.
    #[must_use]
    pub fn from_lines(lines: &[PostedLine]) -> Self {
        lines.iter().fold(Self::default(), |mut sheet, line| {
            let Some(account_type) = line.account_type else {
                return sheet;
            };
            let amount = account_type.natural_balance(line.debit, line.credit);
            match account_type {
                AccountType::Asset => sheet.assets += amount,
                AccountType::Liability => sheet.liabilities += amount,
                AccountType::Equity => sheet.equity += amount,
                AccountType::Revenue => sheet.revenue += amount,
                AccountType::Expense => sheet.expenses += amount,
            }
            sheet
        })
    }

    /// Net income not yet closed to equity.
    #[must_use]
    pub fn retained_earnings(&self) -> Decimal {
        self.revenue - self.expenses
    }

    /// Equity as it would stand after closing.
    #[must_use]
    pub fn effective_equity(&self) -> Decimal {
        self.equity + self.retained_earnings()
    }

    /// `|A - (L + E')|`.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        (self.assets - (self.liabilities + self.effective_equity())).abs()
    }

    /// Verdict for the report.
    #[must_use]
    pub fn to_result(&self) -> CheckResult {
        let liabilities_and_equity = self.liabilities + self.effective_equity();
        if self.difference() <= BALANCE_TOLERANCE {
            return CheckResult::pass(
                ID,
                format!(
                    "Assets ({}) equal liabilities plus equity ({})",
                    format_usd(self.assets),
                    format_usd(liabilities_and_equity)
                ),
            );
        }

        CheckResult::fail(
            ID,
            format!(
                "Assets differ from liabilities plus equity by {}",
                format_usd(self.difference())
            ),
        )
        .with_details(vec![
            format!("Assets: {}", format_usd(self.assets)),
            format!("Liabilities: {}", format_usd(self.liabilities)),
            format!("Equity: {}", format_usd(self.equity)),
            format!("Revenue: {}", format_usd(self.revenue)),
            format!("Expenses: {}", format_usd(self.expenses)),
            format!("Retained earnings: {}", format_usd(self.retained_earnings())),
            format!("Difference: {}", format_usd(self.difference())),
        ])
    }
}

/// Reads every posted line and checks A = L + E after closing.
pub async fn run(ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    let AuditContext {
        source, company, ..
    } = ctx;
    let lines = fetch_all(ctx.page_size, move |range| source.posted_lines(company, range)).await?;
    Ok(BalanceSheet::from_lines(&lines).to_result())
}
