use sea_orm::entity::prelude::*;

/// Append-only audit trail for documents. The SLA monitor reads it to
/// resolve anchors (reassignment actions) and writes "SLA Warning" /
/// "SLA Escalation" entries, which double as its per-anchor dedupe ledger.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub document_id: i32,
    pub user_id: i32,
    pub action: String,
    pub remarks: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
