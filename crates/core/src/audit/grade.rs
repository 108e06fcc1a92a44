//! Overall grade.

use chrono::{DateTime, Utc};

use super::types::{AuditReport, CheckCounts, CheckResult, Grade};

impl Grade {
    /// Grade for a tally of verdicts. Ordering of the checks does not matter.
    #[must_use]
    pub const fn from_counts(counts: CheckCounts) -> Self {
        match (counts.failed, counts.warned) {
            (0, 0 | 1) => Self::A,
            (0, _) => Self::B,
            (1, _) => Self::C,
            (2 | 3, _) => Self::D,
            _ => Self::F,
        }
    }
}

impl AuditReport {
    /// Grades `checks` and assembles the report.
    #[must_use]
    pub fn new(checks: Vec<CheckResult>, run_at: DateTime<Utc>) -> Self {
        let counts = CheckCounts::tally(&checks);
        let grade = Grade::from_counts(counts);
        Self {
            grade,
            grade_label: grade.label().to_string(),
            checks,
            run_at,
            counts,
        }
    }
}
