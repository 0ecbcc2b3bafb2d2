use sea_orm::entity::prelude::*;

/// Per entity-kind enable flag for SLA alerting, keyed by preference
/// category ("documents" / "leave_requests" / "ewp_records"). Rows are
/// created lazily with `enabled = true` the first time the monitor reads
/// them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sla_preferences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub category: String,
    pub enabled: bool,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
