//! Shared thresholds and finding helpers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use keystone_shared::types::{format_percent, format_usd};

use super::types::CheckStatus;

/// Most detail lines a check lists before summarizing the rest.
pub const MAX_DETAILS: usize = 10;

/// Rounding noise tolerated when two totals must match exactly.
pub const BALANCE_TOLERANCE: Decimal = dec!(0.01);

/// Relative difference that still counts as reconciled.
pub const RECONCILED_PCT: Decimal = dec!(1);

/// Absolute difference that still counts as reconciled.
pub const RECONCILED_AMOUNT: Decimal = dec!(100);

/// Relative difference above which a reconciliation fails.
pub const DRIFT_PCT: Decimal = dec!(5);

/// Keeps the first [`MAX_DETAILS`] lines and summarizes the rest.
#[must_use]
pub fn capped_details(mut lines: Vec<String>) -> Vec<String> {
    if lines.len() > MAX_DETAILS {
        let remaining = lines.len() - MAX_DETAILS;
        lines.truncate(MAX_DETAILS);
        lines.push(format!("...and {remaining} more"));
    }
    lines
}

/// Percentage of `part` in `whole`; zero when `whole` is zero.
#[must_use]
pub fn percent_of(part: usize, whole: usize) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole)
}

/// Comparison of a detail-side total against its GL counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// Total from the detail records (bank statements, open invoices).
    pub detail_balance: Decimal,
    /// Total from posted GL lines.
    pub gl_balance: Decimal,
}

impl Reconciliation {
    /// Creates a reconciliation.
    #[must_use]
    pub const fn new(detail_balance: Decimal, gl_balance: Decimal) -> Self {
        Self {
            detail_balance,
            gl_balance,
        }
    }

    /// Absolute difference between the two sides.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        (self.detail_balance - self.gl_balance).abs()
    }

    /// Difference relative to the larger side, floored at 1.
    #[must_use]
    pub fn difference_pct(&self) -> Decimal {
        let base = self.detail_balance.max(self.gl_balance).max(Decimal::ONE);
        self.difference() / base * Decimal::ONE_HUNDRED
    }

    /// Verdict: within 1% or $100 passes, within 5% warns, otherwise fails.
    #[must_use]
    pub fn status(&self) -> CheckStatus {
        let difference = self.difference();
        let pct = self.difference_pct();
        if pct <= RECONCILED_PCT || difference <= RECONCILED_AMOUNT {
            CheckStatus::Pass
        } else if pct <= DRIFT_PCT {
            CheckStatus::Warn
        } else {
            CheckStatus::Fail
        }
    }

    /// Human-readable difference, e.g. `$1,200.00 (2.40%)`.
    #[must_use]
    pub fn describe_difference(&self) -> String {
        format!(
            "{} ({})",
            format_usd(self.difference()),
            format_percent(self.difference_pct())
        )
    }
}
