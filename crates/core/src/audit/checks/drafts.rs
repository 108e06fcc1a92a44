//! Draft entries left unposted.

use chrono::{DateTime, Duration, Utc};

use crate::audit::error::AuditError;
use crate::audit::findings::capped_details;
use crate::audit::ledger::JournalEntry;
use crate::audit::source::{AuditContext, fetch_all};
use crate::audit::types::{CheckId, CheckResult};

const ID: CheckId = CheckId::UnpostedEntries;

/// Age after which a draft counts as stale.
pub const STALE_AFTER_DAYS: i64 = 7;

/// Verdict over `drafts`, which arrive oldest first.
#[must_use]
pub fn evaluate(drafts: &[JournalEntry], now: DateTime<Utc>) -> CheckResult {
    if drafts.is_empty() {
        return CheckResult::pass(ID, "No draft journal entries");
    }

    let cutoff = now - Duration::days(STALE_AFTER_DAYS);
    let mut stale: Vec<&JournalEntry> = drafts
        .iter()
        .filter(|entry| entry.created_at < cutoff)
        .collect();

    if stale.is_empty() {
        return CheckResult::warn(
            ID,
            format!(
                "{} draft entries awaiting posting, none older than {STALE_AFTER_DAYS} days",
                drafts.len()
            ),
        );
    }

    stale.sort_by_key(|entry| entry.created_at);
    let details = stale
        .iter()
        .map(|entry| {
            let age = (now - entry.created_at).num_days();
            format!("{} ({age} days old)", entry.entry_number)
        })
        .collect();

    CheckResult::fail(
        ID,
        format!(
            "{} of {} draft entries are older than {STALE_AFTER_DAYS} days",
            stale.len(),
            drafts.len()
        ),
    )
    .with_details(capped_details(details))
}

/// Reads every draft and flags the stale ones.
pub async fn run(ctx: AuditContext<'_>) -> Result<CheckResult, AuditError> {
    let AuditContext {
        source,
        company,
        now,
        ..
    } = ctx;
    let drafts = fetch_all(ctx.page_size, move |range| source.draft_entries(company, range)).await?;
    Ok(evaluate(&drafts, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::ledger::EntryStatus;
    use crate::audit::types::CheckStatus;
    use chrono::TimeZone;
    use keystone_shared::types::JournalEntryId;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    fn draft(number: &str, age: Duration) -> JournalEntry {
        let created_at = now() - age;
        JournalEntry {
            id: JournalEntryId::new(),
            entry_number: number.to_string(),
            status: EntryStatus::Draft,
            entry_date: created_at.date_naive(),
            created_at,
            reference: None,
        }
    }

    #[test]
    fn test_no_drafts_passes() {
        assert_eq!(evaluate(&[], now()).status, CheckStatus::Pass);
    }

    #[test]
    fn test_recent_drafts_warn() {
        let drafts = vec![draft("JE-0101", Duration::days(7)), draft("JE-0102", Duration::hours(3))];
        let result = evaluate(&drafts, now());
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.details.is_empty());
    }

    #[test]
    fn test_stale_drafts_fail_oldest_first() {
        let mut drafts: Vec<JournalEntry> = (0..12)
            .map(|i| draft(&format!("JE-{i:04}"), Duration::days(30 - i)))
            .collect();
        drafts.push(draft("JE-0999", Duration::days(1)));

        let result = evaluate(&drafts, now());
        assert_eq!(result.status, CheckStatus::Fail);
        assert_eq!(result.summary, "12 of 13 draft entries are older than 7 days");
        assert_eq!(result.details[0], "JE-0000 (30 days old)");
        assert_eq!(result.details[9], "JE-0009 (21 days old)");
        assert_eq!(result.details[10], "...and 2 more");
    }
}
