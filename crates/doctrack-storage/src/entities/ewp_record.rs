use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ewp_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub employee_name: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub created_by_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
