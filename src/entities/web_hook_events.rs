use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "web_hook_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub web_hook_id: i32,
    pub event_name: String,
    #[sea_orm(column_type = "Text")]
    pub payload: String,
    /// `pending` until the host's delivery worker picks it up
    pub status: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
