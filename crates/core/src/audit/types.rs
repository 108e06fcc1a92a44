//! Audit result types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuditError;

/// Verdict of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Invariant holds.
    Pass,
    /// Soft signal worth a look.
    Warn,
    /// Invariant violated, or the check could not run.
    Fail,
}

/// Identifies one of the audit checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckId {
    /// Debits equal credits across posted lines.
    TrialBalance,
    /// Assets = Liabilities + Equity + (Revenue - Expenses).
    BalanceSheet,
    /// Every booked invoice has a journal entry.
    InvoiceCoverage,
    /// Every payment has a journal entry.
    PaymentCoverage,
    /// Bank balances agree with GL cash.
    BankReconciliation,
    /// Open receivables agree with GL AR.
    ArReconciliation,
    /// Open payables agree with GL AP.
    ApReconciliation,
    /// Draft entries are not left unposted.
    UnpostedEntries,
    /// Booked invoices carry a GL account.
    MissingGlMappings,
    /// Lines reference existing accounts.
    OrphanedLines,
    /// Revenue is journalized near the invoice date.
    RevenueTiming,
}

impl CheckId {
    /// Every check, in report order.
    pub const ALL: [Self; 11] = [
        Self::TrialBalance,
        Self::BalanceSheet,
        Self::InvoiceCoverage,
        Self::PaymentCoverage,
        Self::BankReconciliation,
        Self::ArReconciliation,
        Self::ApReconciliation,
        Self::UnpostedEntries,
        Self::MissingGlMappings,
        Self::OrphanedLines,
        Self::RevenueTiming,
    ];

    /// Stable machine identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrialBalance => "trial-balance",
            Self::BalanceSheet => "balance-sheet",
            Self::InvoiceCoverage => "invoice-coverage",
            Self::PaymentCoverage => "payment-coverage",
            Self::BankReconciliation => "bank-reconciliation",
            Self::ArReconciliation => "ar-reconciliation",
            Self::ApReconciliation => "ap-reconciliation",
            Self::UnpostedEntries => "unposted-entries",
            Self::MissingGlMappings => "missing-gl-mappings",
            Self::OrphanedLines => "orphaned-lines",
            Self::RevenueTiming => "revenue-timing",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TrialBalance => "Trial Balance",
            Self::BalanceSheet => "Balance Sheet Equation",
            Self::InvoiceCoverage => "Invoice JE Coverage",
            Self::PaymentCoverage => "Payment JE Coverage",
            Self::BankReconciliation => "Bank Reconciliation",
            Self::ArReconciliation => "AR Subledger Reconciliation",
            Self::ApReconciliation => "AP Subledger Reconciliation",
            Self::UnpostedEntries => "Unposted Entries",
            Self::MissingGlMappings => "Missing GL Mappings",
            Self::OrphanedLines => "Orphaned JE Lines",
            Self::RevenueTiming => "Revenue Recognition Timing",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check identifier.
    pub id: CheckId,
    /// Display name.
    pub name: String,
    /// Verdict.
    pub status: CheckStatus,
    /// One-line human summary.
    pub summary: String,
    /// Supporting lines, capped for display.
    pub details: Vec<String>,
}

impl CheckResult {
    /// Creates a result with no details.
    #[must_use]
    pub fn new(id: CheckId, status: CheckStatus, summary: impl Into<String>) -> Self {
        Self {
            id,
            name: id.name().to_string(),
            status,
            summary: summary.into(),
            details: Vec::new(),
        }
    }

    /// Creates a passing result.
    #[must_use]
    pub fn pass(id: CheckId, summary: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Pass, summary)
    }

    /// Creates a warning result.
    #[must_use]
    pub fn warn(id: CheckId, summary: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Warn, summary)
    }

    /// Creates a failing result.
    #[must_use]
    pub fn fail(id: CheckId, summary: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Fail, summary)
    }

    /// Result for a check that could not complete.
    #[must_use]
    pub fn errored(id: CheckId, err: &AuditError) -> Self {
        Self::fail(id, "Check could not complete").with_details(vec![err.raw_message()])
    }

    /// Attaches detail lines.
    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// Overall letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// No failures, at most one warning.
    A,
    /// No failures.
    B,
    /// One failure.
    C,
    /// Two or three failures.
    D,
    /// Four or more failures.
    F,
}

impl Grade {
    /// Human label shown next to the letter.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "Excellent",
            Self::B => "Good",
            Self::C => "Fair",
            Self::D => "Needs Attention",
            Self::F => "Critical Issues",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

/// Number of checks per verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckCounts {
    /// Checks that passed.
    pub passed: usize,
    /// Checks that warned.
    pub warned: usize,
    /// Checks that failed.
    pub failed: usize,
}

impl CheckCounts {
    /// Tallies verdicts.
    #[must_use]
    pub fn tally(checks: &[CheckResult]) -> Self {
        checks.iter().fold(Self::default(), |mut counts, check| {
            match check.status {
                CheckStatus::Pass => counts.passed += 1,
                CheckStatus::Warn => counts.warned += 1,
                CheckStatus::Fail => counts.failed += 1,
            }
            counts
        })
    }
}

/// A complete audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// Letter grade.
    pub grade: Grade,
    /// Label for the grade.
    pub grade_label: String,
    /// Per-check results in report order.
    pub checks: Vec<CheckResult>,
    /// When the audit ran.
    pub run_at: DateTime<Utc>,
    /// Verdict counts.
    pub counts: CheckCounts,
}
