//! Bank balances against GL cash.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use keystone_shared::types::{AccountId, format_usd};

use crate::audit::error::AuditError;
use crate::audit::findings::Reconciliation;
use crate::audit::ledger::{Account, BankAccount, PostedLine};
use crate::audit::source::{AuditContext, fetch_all};
use crate::audit::types::{CheckId, CheckResult, CheckStatus};

const ID: CheckId = CheckId::BankReconciliation;

/// Account number of the parent cash account.
pub const PARENT_CASH_ACCOUNT: &str = "1000";

/// GL accounts whose balance is compared with the banks.
///
/// Linked sub-accounts always count. The parent cash account joins only
/// when some bank has no sub-account of its own.
#[must_use]
pub fn comparison_accounts(
    banks: &[BankAccount],
    parent_cash: Option<AccountId>,
) -> BTreeSet<AccountId> {
    let mut accounts: BTreeSet<AccountId> =
        banks.iter().filter_map(|bank| bank.gl_account_id).collect();
    if banks.iter().any(|bank| bank.gl_account_id.is_none()) {
        accounts.extend(parent_cash);
    }
    accounts
}

/// Debit-normal cash balance over `lines`.
#[must_use]
pub fn cash_balance(lines: &[PostedLine]) -> Decimal {
    lines.iter().map(|line| line.debit - line.credit).sum()
}

/// Verdict for a bank-to-GL comparison.
#[must_use]
pub fn reconcile(bank_balance: Decimal, gl_balance: Decimal, bank_count: usize) -> CheckResult {
    let rec = Reconciliation::new(bank_balance, gl_balance);
    let details = vec![
        format!("Bank balance: {}", format_usd(bank_balance)),
        format!("GL cash balance: {}", format_usd(gl_balance)),
        format!("Difference: {}", rec.describe_difference()),
    ];

    let result = match rec.status() {
        CheckStatus::Pass => CheckResult::pass(
            ID,
            format!("{bank_count} bank accounts reconcile with GL cash"),
        ),
        status => CheckResult::new(
            ID,
            status,
            format!(
                "Bank balances differ from GL cash by {}",
                rec.describe_difference()
            ),
        ),
    };
    result.with_details(details)
}

/// Compares total bank balances with posted cash lines.
pub async fn run(ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    let AuditContext {
        source, company, ..
    } = ctx;

    let banks = fetch_all(ctx.page_size, move |range| source.bank_accounts(company, range)).await?;
    if banks.is_empty() {
        return Ok(CheckResult::pass(ID, "No bank accounts to reconcile"));
    }

    let parent_cash = if banks.iter().any(|bank| bank.gl_account_id.is_none()) {
        let accounts: Vec<Account> =
            fetch_all(ctx.page_size, move |range| source.accounts(company, range)).await?;
        accounts
            .into_iter()
            .find(|account| account.account_number == PARENT_CASH_ACCOUNT)
            .map(|account| account.id)
    } else {
        None
    };

    let accounts: Vec<AccountId> = comparison_accounts(&banks, parent_cash).into_iter().collect();
    if accounts.is_empty() {
        return Ok(CheckResult::warn(
            ID,
            "Cannot reconcile: no bank account is linked to a GL cash account",
        ));
    }

    let accounts = accounts.as_slice();
    let lines = fetch_all(ctx.page_size, move |range| {
        source.posted_lines_for_accounts(company, accounts, range)
    })
    .await?;

    let bank_balance: Decimal = banks.iter().map(|bank| bank.current_balance).sum();
    Ok(reconcile(bank_balance, cash_balance(&lines), banks.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystone_shared::types::BankAccountId;
    use rust_decimal_macros::dec;

    fn bank(balance: Decimal, gl_account_id: Option<AccountId>) -> BankAccount {
        BankAccount {
            id: BankAccountId::new(),
            name: "Operating".to_string(),
            current_balance: balance,
            gl_account_id,
        }
    }

    #[test]
    fn test_linked_banks_exclude_parent_cash() {
        let linked = AccountId::new();
        let parent = AccountId::new();
        let banks = vec![bank(dec!(10), Some(linked))];

        assert_eq!(
            comparison_accounts(&banks, Some(parent)),
            BTreeSet::from([linked])
        );
    }

    #[test]
    fn test_unlinked_bank_adds_parent_cash() {
        let linked = AccountId::new();
        let parent = AccountId::new();
        let banks = vec![bank(dec!(10), Some(linked)), bank(dec!(5), None)];

        assert_eq!(
            comparison_accounts(&banks, Some(parent)),
            BTreeSet::from([linked, parent])
        );
    }

    #[test]
    fn test_no_linkable_accounts() {
        let banks = vec![bank(dec!(10), None)];
        assert!(comparison_accounts(&banks, None).is_empty());
    }

    #[test]
    fn test_difference_of_exactly_100_passes() {
        let result = reconcile(dec!(5100), dec!(5000), 1);
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.details[2], "Difference: $100.00 (1.96%)");
    }

    #[test]
    fn test_difference_just_over_100_follows_percentage() {
        // 100.01 / 5100.01 is about 1.96%, above the 1% band.
        let result = reconcile(dec!(5100.01), dec!(5000), 1);
        assert_eq!(result.status, CheckStatus::Warn);

        let result = reconcile(dec!(1000.01), dec!(900), 1);
        assert_eq!(result.status, CheckStatus::Fail);
    }
}
