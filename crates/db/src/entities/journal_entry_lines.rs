//! `SeaORM` Entity for journal_entry_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entry_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub journal_entry_id: Uuid,
    /// Not a foreign key: accounts can be deleted out from under their lines.
    /// See [`account_relation`].
    pub account_id: Uuid,
    pub debit: Decimal,
    pub credit: Decimal,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::JournalEntryId",
        to = "super::journal_entries::Column::Id"
    )]
    JournalEntries,
}

/// Line to account join.
///
/// Kept out of [`Relation`] so schema generation emits no foreign key on
/// `account_id`.
pub fn account_relation() -> RelationDef {
    Entity::belongs_to(super::chart_of_accounts::Entity)
        .from(Column::AccountId)
        .to(super::chart_of_accounts::Column::Id)
        .into()
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl Related<super::chart_of_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        account_relation()
    }
}

impl ActiveModelBehavior for ActiveModel {}
