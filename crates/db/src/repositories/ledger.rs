//! Ledger repository: the database-backed [`LedgerSource`].
//!
//! Every query is scoped by `company_id`, ordered by primary key (drafts by
//! creation time) and windowed with `OFFSET`/`LIMIT` from the requested
//! [`RowRange`].

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select,
};
use tracing::debug;
use uuid::Uuid;

use keystone_core::audit::{
    Account, AccountType, AuditError, BankAccount, EntityKind, EntityRef, EntryStatus,
    Invoice, InvoiceFilter, JournalEntry, LedgerSource, LineWithEntry, Payment, PostedLine,
    Provenance,
};
use keystone_shared::types::{
    AccountId, BankAccountId, CompanyId, InvoiceId, JournalEntryId, JournalLineId, PaymentId,
    RowRange,
};

use crate::entities::{
    bank_accounts, chart_of_accounts, invoices, journal_entries, journal_entry_lines, payments,
};

/// A posted line with its account type, as selected by the join.
#[derive(Debug, Clone, FromQueryResult)]
struct PostedLineRow {
    id: Uuid,
    journal_entry_id: Uuid,
    account_id: Uuid,
    debit: Decimal,
    credit: Decimal,
    account_type: Option<String>,
}

/// A line with its parent entry number, as selected by the join.
#[derive(Debug, Clone, FromQueryResult)]
struct LineWithEntryRow {
    id: Uuid,
    journal_entry_id: Uuid,
    account_id: Uuid,
    entry_number: String,
}

fn query_error(err: DbErr) -> AuditError {
    AuditError::Query(err.to_string())
}

fn parse_column<T>(column: &str, value: &str) -> Result<T, AuditError>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e| AuditError::Query(format!("Invalid {column} value: {e}")))
}

fn to_posted_line(row: PostedLineRow) -> Result<PostedLine, AuditError> {
    let account_type = row
        .account_type
        .as_deref()
        .map(|value| parse_column::<AccountType>("account_type", value))
        .transpose()?;
    Ok(PostedLine {
        id: JournalLineId::from_uuid(row.id),
        journal_entry_id: JournalEntryId::from_uuid(row.journal_entry_id),
        account_id: AccountId::from_uuid(row.account_id),
        account_type,
        debit: row.debit,
        credit: row.credit,
    })
}

fn to_line_with_entry(row: LineWithEntryRow) -> LineWithEntry {
    LineWithEntry {
        id: JournalLineId::from_uuid(row.id),
        journal_entry_id: JournalEntryId::from_uuid(row.journal_entry_id),
        entry_number: row.entry_number,
        account_id: AccountId::from_uuid(row.account_id),
    }
}

fn to_journal_entry(model: journal_entries::Model) -> Result<JournalEntry, AuditError> {
    Ok(JournalEntry {
        id: JournalEntryId::from_uuid(model.id),
        entry_number: model.entry_number,
        status: parse_column("journal_entries.status", &model.status)?,
        entry_date: model.entry_date,
        created_at: model.created_at.to_utc(),
        reference: EntityRef::parse(model.reference.as_deref()),
    })
}

fn to_account(model: chart_of_accounts::Model) -> Result<Account, AuditError> {
    Ok(Account {
        id: AccountId::from_uuid(model.id),
        account_number: model.account_number,
        name: model.name,
        account_type: parse_column("chart_of_accounts.account_type", &model.account_type)?,
        is_active: model.is_active,
    })
}

fn to_invoice(model: invoices::Model) -> Result<Invoice, AuditError> {
    Ok(Invoice {
        id: InvoiceId::from_uuid(model.id),
        invoice_number: model.invoice_number,
        invoice_type: parse_column("invoices.invoice_type", &model.invoice_type)?,
        status: parse_column("invoices.status", &model.status)?,
        invoice_date: model.invoice_date,
        balance_due: model.balance_due,
        gl_account_id: model.gl_account_id.map(AccountId::from_uuid),
        provenance: Provenance::from_notes(model.notes.as_deref()),
    })
}

fn to_payment(model: payments::Model) -> Payment {
    Payment {
        id: PaymentId::from_uuid(model.id),
        reference_number: model.reference_number,
        provenance: Provenance::from_notes(model.notes.as_deref()),
    }
}

fn to_bank_account(model: bank_accounts::Model) -> BankAccount {
    BankAccount {
        id: BankAccountId::from_uuid(model.id),
        name: model.name,
        current_balance: model.current_balance,
        gl_account_id: model.gl_account_id.map(AccountId::from_uuid),
    }
}

/// Applies an [`InvoiceFilter`] to an invoice query.
fn filter_invoices(
    mut query: Select<invoices::Entity>,
    filter: &InvoiceFilter,
) -> Select<invoices::Entity> {
    if let Some(invoice_type) = filter.invoice_type {
        query = query.filter(invoices::Column::InvoiceType.eq(invoice_type.as_str()));
    }
    if !filter.excluded_statuses.is_empty() {
        query = query.filter(
            invoices::Column::Status
                .is_not_in(filter.excluded_statuses.iter().map(|status| status.as_str())),
        );
    }
    if filter.without_gl_account {
        query = query.filter(invoices::Column::GlAccountId.is_null());
    }
    query
}

/// Posted lines joined with their parent entry and, when it still exists,
/// their account.
fn posted_lines_query(company: CompanyId) -> Select<journal_entry_lines::Entity> {
    journal_entry_lines::Entity::find()
        .column_as(chart_of_accounts::Column::AccountType, "account_type")
        .join(
            JoinType::InnerJoin,
            journal_entry_lines::Relation::JournalEntries.def(),
        )
        .join(JoinType::LeftJoin, journal_entry_lines::account_relation())
        .filter(journal_entry_lines::Column::CompanyId.eq(company.into_inner()))
        .filter(journal_entries::Column::Status.eq(EntryStatus::Posted.as_str()))
        .order_by_asc(journal_entry_lines::Column::Id)
}

/// Repository for reading ledger rows for the audit.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerSource for LedgerRepository {
    async fn posted_lines(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<PostedLine>, AuditError> {
        let rows = posted_lines_query(company)
            .offset(range.offset())
            .limit(range.limit())
            .into_model::<PostedLineRow>()
            .all(&self.db)
            .await
            .map_err(query_error)?;

        debug!(company_id = %company, offset = range.offset(), rows = rows.len(), "Fetched posted lines");
        rows.into_iter().map(to_posted_line).collect()
    }

    async fn posted_lines_for_accounts(
        &self,
        company: CompanyId,
        accounts: &[AccountId],
        range: RowRange,
    ) -> Result<Vec<PostedLine>, AuditError> {
        let rows = posted_lines_query(company)
            .filter(
                journal_entry_lines::Column::AccountId
                    .is_in(accounts.iter().map(|id| id.into_inner())),
            )
            .offset(range.offset())
            .limit(range.limit())
            .into_model::<PostedLineRow>()
            .all(&self.db)
            .await
            .map_err(query_error)?;

        debug!(
            company_id = %company,
            accounts = accounts.len(),
            offset = range.offset(),
            rows = rows.len(),
            "Fetched posted lines for accounts"
        );
        rows.into_iter().map(to_posted_line).collect()
    }

    async fn lines_with_entries(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<LineWithEntry>, AuditError> {
        let rows = journal_entry_lines::Entity::find()
            .column_as(journal_entries::Column::EntryNumber, "entry_number")
            .join(
                JoinType::InnerJoin,
                journal_entry_lines::Relation::JournalEntries.def(),
            )
            .filter(journal_entry_lines::Column::CompanyId.eq(company.into_inner()))
            .order_by_asc(journal_entry_lines::Column::Id)
            .offset(range.offset())
            .limit(range.limit())
            .into_model::<LineWithEntryRow>()
            .all(&self.db)
            .await
            .map_err(query_error)?;

        debug!(company_id = %company, offset = range.offset(), rows = rows.len(), "Fetched journal lines");
        Ok(rows.into_iter().map(to_line_with_entry).collect())
    }

    async fn entries_by_reference(
        &self,
        company: CompanyId,
        kind: EntityKind,
        range: RowRange,
    ) -> Result<Vec<JournalEntry>, AuditError> {
        let models = journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company.into_inner()))
            .filter(journal_entries::Column::Reference.starts_with(kind.prefix()))
            .order_by_asc(journal_entries::Column::Id)
            .offset(range.offset())
            .limit(range.limit())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        models.into_iter().map(to_journal_entry).collect()
    }

    async fn draft_entries(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<JournalEntry>, AuditError> {
        let models = journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company.into_inner()))
            .filter(journal_entries::Column::Status.eq(EntryStatus::Draft.as_str()))
            .order_by_asc(journal_entries::Column::CreatedAt)
            .order_by_asc(journal_entries::Column::Id)
            .offset(range.offset())
            .limit(range.limit())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        models.into_iter().map(to_journal_entry).collect()
    }

    async fn accounts(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<Account>, AuditError> {
        let models = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::CompanyId.eq(company.into_inner()))
            .order_by_asc(chart_of_accounts::Column::Id)
            .offset(range.offset())
            .limit(range.limit())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        models.into_iter().map(to_account).collect()
    }

    async fn invoices(
        &self,
        company: CompanyId,
        filter: &InvoiceFilter,
        range: RowRange,
    ) -> Result<Vec<Invoice>, AuditError> {
        let query = invoices::Entity::find()
            .filter(invoices::Column::CompanyId.eq(company.into_inner()));
        let models = filter_invoices(query, filter)
            .order_by_asc(invoices::Column::Id)
            .offset(range.offset())
            .limit(range.limit())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        models.into_iter().map(to_invoice).collect()
    }

    async fn payments(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<Payment>, AuditError> {
        let models = payments::Entity::find()
            .filter(payments::Column::CompanyId.eq(company.into_inner()))
            .order_by_asc(payments::Column::Id)
            .offset(range.offset())
            .limit(range.limit())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(models.into_iter().map(to_payment).collect())
    }

    async fn bank_accounts(
        &self,
        company: CompanyId,
        range: RowRange,
    ) -> Result<Vec<BankAccount>, AuditError> {
        let models = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::CompanyId.eq(company.into_inner()))
            .order_by_asc(bank_accounts::Column::Id)
            .offset(range.offset())
            .limit(range.limit())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(models.into_iter().map(to_bank_account).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
    use keystone_core::audit::{InvoiceStatus, InvoiceType};
    use rust_decimal_macros::dec;
    use sea_orm::{DbBackend, QueryTrait, Schema};

    fn entry_model(status: &str, reference: Option<&str>) -> journal_entries::Model {
        journal_entries::Model {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            entry_number: "JE-0007".to_string(),
            status: status.to_string(),
            entry_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            reference: reference.map(str::to_string),
            created_at: FixedOffset::east_opt(8 * 3600)
                .unwrap()
                .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
                .unwrap(),
        }
    }

    fn invoice_model(status: &str, notes: Option<&str>) -> invoices::Model {
        invoices::Model {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            invoice_number: "INV-0100".to_string(),
            invoice_type: "receivable".to_string(),
            status: status.to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            total_amount: dec!(1500),
            balance_due: dec!(500),
            gl_account_id: None,
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn test_entry_reference_is_parsed() {
        let invoice = Uuid::new_v4();
        let reference = format!("invoice:{invoice}");
        let entry = to_journal_entry(entry_model("posted", Some(&reference))).unwrap();

        assert_eq!(entry.status, EntryStatus::Posted);
        assert_eq!(
            entry.reference,
            Some(EntityRef::new(EntityKind::Invoice, invoice))
        );
        assert_eq!(
            entry.created_at,
            Utc.with_ymd_and_hms(2025, 3, 14, 1, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_opening_balance_reference_links_nothing() {
        let entry = to_journal_entry(entry_model("posted", Some("OB-2025"))).unwrap();
        assert_eq!(entry.reference, None);
    }

    #[test]
    fn test_unknown_status_is_a_query_error() {
        let err = to_journal_entry(entry_model("archived", None)).unwrap_err();
        assert!(matches!(err, AuditError::Query(msg) if msg.contains("journal_entries.status")));
    }

    #[test]
    fn test_invoice_provenance_from_notes() {
        let invoice = to_invoice(invoice_model("overdue", Some("csv-import:batch-3"))).unwrap();
        assert_eq!(invoice.invoice_type, InvoiceType::Receivable);
        assert_eq!(invoice.status, InvoiceStatus::Overdue);
        assert_eq!(invoice.provenance, Provenance::CsvImport);
        assert_eq!(invoice.balance_due, dec!(500));
    }

    #[test]
    fn test_posted_line_without_account_has_no_type() {
        let row = PostedLineRow {
            id: Uuid::new_v4(),
            journal_entry_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            debit: dec!(25),
            credit: Decimal::ZERO,
            account_type: None,
        };
        assert_eq!(to_posted_line(row).unwrap().account_type, None);
    }

    #[test]
    fn test_invoice_filter_sql() {
        let filter = InvoiceFilter {
            without_gl_account: true,
            ..InvoiceFilter::booked().of_type(InvoiceType::Payable)
        };
        let sql = filter_invoices(invoices::Entity::find(), &filter)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""invoices"."invoice_type" = 'payable'"#));
        assert!(sql.contains(r#""invoices"."status" NOT IN ('draft', 'voided')"#));
        assert!(sql.contains(r#""invoices"."gl_account_id" IS NULL"#));
    }

    #[test]
    fn test_line_schema_has_no_account_foreign_key() {
        let backend = DbBackend::Postgres;
        let table = Schema::new(backend).create_table_from_entity(journal_entry_lines::Entity);
        let sql = backend.build(&table).to_string();

        assert!(sql.contains(r#"REFERENCES "journal_entries" ("id")"#));
        assert!(!sql.contains(r#"REFERENCES "chart_of_accounts""#));
    }

    #[test]
    fn test_posted_lines_sql_joins_parent_entry() {
        let sql = posted_lines_query(CompanyId::new())
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"INNER JOIN "journal_entries""#));
        assert!(sql.contains(r#"LEFT JOIN "chart_of_accounts""#));
        assert!(sql.contains(r#""journal_entries"."status" = 'posted'"#));
        assert!(sql.contains(r#"ORDER BY "journal_entry_lines"."id" ASC"#));
    }
}
