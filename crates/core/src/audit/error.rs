//! Audit error types.

use std::time::Duration;

use keystone_shared::AppError;
use thiserror::Error;

/// Errors that can occur while auditing a ledger.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The ledger store rejected or failed a read.
    #[error("Ledger query failed: {0}")]
    Query(String),

    /// The whole audit ran past its time budget.
    #[error("Audit did not finish within {0:?}")]
    TimedOut(Duration),

    /// A check panicked instead of returning a result.
    #[error("Check panicked: {0}")]
    CheckPanicked(String),
}

impl AuditError {
    /// The message shown in a failed check's details.
    ///
    /// Store errors are passed through verbatim.
    #[must_use]
    pub fn raw_message(&self) -> String {
        match self {
            Self::Query(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<AuditError> for AppError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Query(message) => Self::Database(message),
            AuditError::TimedOut(_) => Self::Timeout(err.to_string()),
            AuditError::CheckPanicked(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_message_passes_store_errors_through() {
        let err = AuditError::Query("connection refused".to_string());
        assert_eq!(err.raw_message(), "connection refused");
        assert_eq!(err.to_string(), "Ledger query failed: connection refused");
    }

    #[test]
    fn test_maps_to_app_error_status() {
        assert_eq!(AppError::from(AuditError::Query(String::new())).status_code(), 500);
        assert_eq!(
            AppError::from(AuditError::TimedOut(Duration::from_secs(1))).status_code(),
            504
        );
        assert_eq!(
            AppError::from(AuditError::CheckPanicked(String::new())).error_code(),
            "INTERNAL_ERROR"
        );
    }
}
