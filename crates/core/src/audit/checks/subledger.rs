//! AR and AP subledgers against their GL control accounts.

use rust_decimal::Decimal;

use keystone_shared::types::{AccountId, format_usd};

use crate::audit::error::AuditError;
use crate::audit::findings::Reconciliation;
use crate::audit::ledger::{Account, AccountType, Invoice, InvoiceStatus, InvoiceType, PostedLine};
use crate::audit::source::{AuditContext, InvoiceFilter, fetch_all};
use crate::audit::types::{CheckId, CheckResult, CheckStatus};

/// Which side of the books is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subledger {
    /// Open receivables against AR.
    Receivable,
    /// Open payables against AP.
    Payable,
}

impl Subledger {
    /// Check this subledger reports under.
    #[must_use]
    pub const fn check_id(self) -> CheckId {
        match self {
            Self::Receivable => CheckId::ArReconciliation,
            Self::Payable => CheckId::ApReconciliation,
        }
    }

    /// Invoice direction that feeds this subledger.
    #[must_use]
    pub const fn invoice_type(self) -> InvoiceType {
        match self {
            Self::Receivable => InvoiceType::Receivable,
            Self::Payable => InvoiceType::Payable,
        }
    }

    /// Type of its control accounts.
    #[must_use]
    pub const fn account_type(self) -> AccountType {
        match self {
            Self::Receivable => AccountType::Asset,
            Self::Payable => AccountType::Liability,
        }
    }

    /// Lowercase name fragments that identify a control account.
    ///
    /// Matches "Accounts Receivable", "Retainage Receivable", "Trade
    /// Receivables" and the "A/R" shorthand alike.
    #[must_use]
    pub const fn name_patterns(self) -> [&'static str; 2] {
        match self {
            Self::Receivable => ["receivable", "a/r"],
            Self::Payable => ["payable", "a/p"],
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Receivable => "AR",
            Self::Payable => "AP",
        }
    }

    /// Returns true if `account` is an active control account for this side.
    #[must_use]
    pub fn is_control_account(self, account: &Account) -> bool {
        if !account.is_active || account.account_type != self.account_type() {
            return false;
        }
        let name = account.name.to_lowercase();
        self.name_patterns()
            .iter()
            .any(|pattern| name.contains(pattern))
    }

    /// Open invoices: this direction, neither voided nor paid.
    #[must_use]
    pub fn open_invoices(self) -> InvoiceFilter {
        InvoiceFilter {
            invoice_type: Some(self.invoice_type()),
            excluded_statuses: vec![InvoiceStatus::Voided, InvoiceStatus::Paid],
            without_gl_account: false,
        }
    }

    /// Control balance in its natural sign.
    #[must_use]
    pub fn gl_balance(self, lines: &[PostedLine]) -> Decimal {
        lines
            .iter()
            .map(|line| self.account_type().natural_balance(line.debit, line.credit))
            .sum()
    }

    /// Verdict for a subledger-to-GL comparison.
    #[must_use]
    pub fn reconcile(self, invoices: &[Invoice], lines: &[PostedLine]) -> CheckResult {
        let subledger_balance: Decimal = invoices.iter().map(|i| i.balance_due).sum();
        let gl_balance = self.gl_balance(lines);
        let rec = Reconciliation::new(subledger_balance, gl_balance);
        let label = self.label();
        let details = vec![
            format!(
                "Open invoices: {} ({})",
                invoices.len(),
                format_usd(subledger_balance)
            ),
            format!("GL {label} balance: {}", format_usd(gl_balance)),
            format!("Difference: {}", rec.describe_difference()),
        ];

        let result = match rec.status() {
            CheckStatus::Pass => CheckResult::pass(
                self.check_id(),
                format!("{label} subledger reconciles with GL"),
            ),
            status => CheckResult::new(
                self.check_id(),
                status,
                format!(
                    "{label} subledger differs from GL by {}",
                    rec.describe_difference()
                ),
            ),
        };
        result.with_details(details)
    }
}

/// Reconciles one subledger.
pub async fn run(side: Subledger, ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    let AuditContext {
        source, company, ..
    } = ctx;

    let accounts = fetch_all(ctx.page_size, move |range| source.accounts(company, range)).await?;
    let control: Vec<AccountId> = accounts
        .iter()
        .filter(|account| side.is_control_account(account))
        .map(|account| account.id)
        .collect();
    if control.is_empty() {
        return Ok(CheckResult::pass(
            side.check_id(),
            format!("No {} control account, nothing to reconcile", side.label()),
        ));
    }

    let control = control.as_slice();
    let lines = fetch_all(ctx.page_size, move |range| {
        source.posted_lines_for_accounts(company, control, range)
    })
    .await?;

    let filter = side.open_invoices();
    let filter = &filter;
    let invoices = fetch_all(ctx.page_size, move |range| {
        source.invoices(company, filter, range)
    })
    .await?;

    Ok(side.reconcile(&invoices, &lines))
}
