//! Audit routes.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tracing::info;

use keystone_core::audit::{AuditReport, AuditService};
use keystone_shared::AppError;
use keystone_shared::types::CompanyId;

use crate::{AppState, error::ApiError};

/// Creates the audit routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/companies/{company_id}/audit", get(run_audit))
}

/// GET /companies/{company_id}/audit
///
/// Runs every ledger check for the company and returns the graded report.
/// Responds 504 if the audit exceeds the configured time budget.
#[axum::debug_handler]
async fn run_audit(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<AuditReport>, ApiError> {
    let company: CompanyId = company_id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid company id: {company_id}")))?;

    let service = AuditService::from_config(&state.audit);
    let limit = Duration::from_secs(state.audit.timeout_secs);
    let report = service
        .run_within(state.ledger.as_ref(), company, limit)
        .await?;

    info!(company_id = %company, grade = %report.grade, "Audit served");
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use tower::ServiceExt;

    use keystone_core::audit::{
        Account, AuditError, BankAccount, EntityKind, InMemoryLedger, Invoice, InvoiceFilter,
        JournalEntry, LedgerSource, LineWithEntry, Payment, PostedLine,
    };
    use keystone_shared::AuditConfig;
    use keystone_shared::types::{AccountId, BankAccountId, CompanyId, RowRange};

    use crate::{AppState, create_router};

    fn state(ledger: Arc<dyn LedgerSource>, timeout_secs: u64) -> AppState {
        AppState {
            ledger,
            audit: AuditConfig {
                page_size: 1000,
                timeout_secs,
            },
        }
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
        let response = create_router(state)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_empty_ledger_report() {
        let company = CompanyId::new();
        let (status, body) = get_json(
            state(Arc::new(InMemoryLedger::new()), 60),
            &format!("/api/v1/companies/{company}/audit"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["grade"], "A");
        assert_eq!(body["gradeLabel"], "Excellent");
        assert_eq!(body["checks"].as_array().unwrap().len(), 11);
        assert!(body["runAt"].is_string());
    }

    #[tokio::test]
    async fn test_findings_are_reported() {
        let company = CompanyId::new();
        let mut ledger = InMemoryLedger::new();
        ledger.company_mut(company).bank_accounts.push(BankAccount {
            id: BankAccountId::new(),
            name: "Operating".to_string(),
            current_balance: dec!(1500),
            gl_account_id: Some(AccountId::new()),
        });

        let (status, body) = get_json(
            state(Arc::new(ledger), 60),
            &format!("/api/v1/companies/{company}/audit"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let bank = &body["checks"][4];
        assert_eq!(bank["id"], "bank-reconciliation");
        assert_eq!(bank["status"], "fail");
        assert_eq!(body["counts"]["failed"], 1);
        assert_eq!(body["grade"], "C");
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("1234")]
    #[tokio::test]
    async fn test_malformed_company_id(#[case] company_id: &str) {
        let (status, body) = get_json(
            state(Arc::new(InMemoryLedger::new()), 60),
            &format!("/api/v1/companies/{company_id}/audit"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    /// A store that never answers.
    struct StalledLedger;

    #[async_trait]
    impl LedgerSource for StalledLedger {
        async fn posted_lines(&self, _: CompanyId, _: RowRange) -> Result<Vec<PostedLine>, AuditError> {
            std::future::pending().await
        }

        async fn posted_lines_for_accounts(
            &self,
            _: CompanyId,
            _: &[AccountId],
            _: RowRange,
        ) -> Result<Vec<PostedLine>, AuditError> {
            std::future::pending().await
        }

        async fn lines_with_entries(
            &self,
            _: CompanyId,
            _: RowRange,
        ) -> Result<Vec<LineWithEntry>, AuditError> {
            std::future::pending().await
        }

        async fn entries_by_reference(
            &self,
            _: CompanyId,
            _: EntityKind,
            _: RowRange,
        ) -> Result<Vec<JournalEntry>, AuditError> {
            std::future::pending().await
        }

        async fn draft_entries(&self, _: CompanyId, _: RowRange) -> Result<Vec<JournalEntry>, AuditError> {
            std::future::pending().await
        }

        async fn accounts(&self, _: CompanyId, _: RowRange) -> Result<Vec<Account>, AuditError> {
            std::future::pending().await
        }

        async fn invoices(
            &self,
            _: CompanyId,
            _: &InvoiceFilter,
            _: RowRange,
        ) -> Result<Vec<Invoice>, AuditError> {
            std::future::pending().await
        }

        async fn payments(&self, _: CompanyId, _: RowRange) -> Result<Vec<Payment>, AuditError> {
            std::future::pending().await
        }

        async fn bank_accounts(&self, _: CompanyId, _: RowRange) -> Result<Vec<BankAccount>, AuditError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let company = CompanyId::new();
        let (status, body) = get_json(
            state(Arc::new(StalledLedger), 0),
            &format!("/api/v1/companies/{company}/audit"),
        )
        .await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "TIMEOUT");
    }
}
