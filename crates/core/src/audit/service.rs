//! Audit orchestration.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::join_all;
use tracing::{error, info, warn};

use keystone_shared::AuditConfig;
use keystone_shared::types::{CompanyId, DEFAULT_PAGE_SIZE};

use super::checks;
use super::error::AuditError;
use super::source::{AuditContext, LedgerSource};
use super::types::{AuditReport, CheckId, CheckResult};

/// Runs every check against one company and grades the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditService {
    page_size: u64,
}

impl Default for AuditService {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl AuditService {
    /// Creates a service reading `page_size` rows per store request.
    ///
    /// The page size is clamped to `1..=DEFAULT_PAGE_SIZE`. A page larger
    /// than the store's row cap comes back truncated and would be taken
    /// for the last one.
    #[must_use]
    pub const fn new(page_size: u64) -> Self {
        let page_size = if page_size == 0 {
            1
        } else if page_size > DEFAULT_PAGE_SIZE {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Self { page_size }
    }

    /// Creates a service from the `audit` configuration section.
    #[must_use]
    pub const fn from_config(config: &AuditConfig) -> Self {
        Self::new(config.page_size)
    }

    /// Rows per store request.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Audits `company` as of now.
    pub async fn run(&self, source: &dyn LedgerSource, company: CompanyId) -> AuditReport {
        self.run_at(source, company, Utc::now()).await
    }

    /// Audits `company` with `now` as the reference time.
    ///
    /// All checks are polled concurrently. Each one settles to a result on
    /// its own: an error or a panic inside a check becomes that check's
    /// `fail` and never drops the others.
    pub async fn run_at(
        &self,
        source: &dyn LedgerSource,
        company: CompanyId,
        now: DateTime<Utc>,
    ) -> AuditReport {
        let ctx = AuditContext {
            source,
            company,
            page_size: self.page_size,
            now,
        };

        info!(company_id = %company, "Starting ledger audit");
        let checks = join_all(CheckId::ALL.map(|id| settle(id, ctx))).await;
        let report = AuditReport::new(checks, now);
        info!(
            company_id = %company,
            grade = %report.grade,
            failed = report.counts.failed,
            warned = report.counts.warned,
            "Ledger audit finished"
        );
        report
    }

    /// Audits `company`, giving up after `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::TimedOut`] if the checks have not all settled in time.
    pub async fn run_within(
        &self,
        source: &dyn LedgerSource,
        company: CompanyId,
        limit: Duration,
    ) -> Result<AuditReport, AuditError> {
        tokio::time::timeout(limit, self.run(source, company))
            .await
            .map_err(|_| {
                warn!(company_id = %company, ?limit, "Ledger audit timed out");
                AuditError::TimedOut(limit)
            })
    }
}

/// Runs one check and turns any error or panic into its result.
async fn settle(id: CheckId, ctx: AuditContext<'_>) -> CheckResult {
    match AssertUnwindSafe(checks::run(id, ctx)).catch_unwind().await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            warn!(check = %id, error = %err, "Audit check could not complete");
            CheckResult::errored(id, &err)
        }
        Err(payload) => {
            let err = AuditError::CheckPanicked(panic_message(payload.as_ref()));
            error!(check = %id, error = %err, "Audit check panicked");
            CheckResult::errored(id, &err)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
