use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "web_hooks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub payload_url: String,
    pub active: bool,
    /// Receives every event type when set
    pub wildcard: bool,
    /// Comma-separated event types, e.g. `solved,post`
    pub event_types: String,
}

impl Model {
    #[must_use]
    pub fn subscribes_to(&self, event_type: &str) -> bool {
        self.wildcard || self.event_types.split(',').any(|t| t.trim() == event_type)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
