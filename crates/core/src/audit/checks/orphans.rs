//! Journal lines pointing at accounts missing from the chart.

use std::collections::{BTreeSet, HashSet};

use keystone_shared::types::AccountId;

use crate::audit::error::AuditError;
use crate::audit::findings::capped_details;
use crate::audit::ledger::LineWithEntry;
use crate::audit::source::{AuditContext, fetch_all};
use crate::audit::types::{CheckId, CheckResult};

const ID: CheckId = CheckId::OrphanedLines;

/// Orphaned lines and the distinct entries they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Orphans {
    /// Lines whose account is not in the chart.
    pub line_count: usize,
    /// Entry numbers of those lines, sorted and deduplicated.
    pub entry_numbers: BTreeSet<String>,
}

impl Orphans {
    /// Collects lines whose account is absent from `valid`.
    #[must_use]
    pub fn find(lines: &[LineWithEntry], valid: &HashSet<AccountId>) -> Self {
        lines
            .iter()
            .filter(|line| !valid.contains(&line.account_id))
            .fold(Self::default(), |mut orphans, line| {
                orphans.line_count += 1;
                orphans.entry_numbers.insert(line.entry_number.clone());
                orphans
            })
    }

    /// Verdict for the report.
    #[must_use]
    pub fn to_result(&self) -> CheckResult {
        if self.line_count == 0 {
            return CheckResult::pass(ID, "Every journal line references a known account");
        }

        CheckResult::fail(
            ID,
            format!(
                "{} journal lines in {} entries reference missing accounts",
                self.line_count,
                self.entry_numbers.len()
            ),
        )
        .with_details(capped_details(
            self.entry_numbers.iter().cloned().collect(),
        ))
    }
}

/// Compares every line's account with the chart of accounts.
pub async fn run(ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    let AuditContext {
        source, company, ..
    } = ctx;

    let accounts = fetch_all(ctx.page_size, move |range| source.accounts(company, range)).await?;
    let valid: HashSet<AccountId> = accounts.iter().map(|account| account.id).collect();

    let lines = fetch_all(ctx.page_size, move |range| {
        source.lines_with_entries(company, range)
    })
    .await?;

    Ok(Orphans::find(&lines, &valid).to_result())
}
