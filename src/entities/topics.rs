use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "topics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub user_id: i32,
    pub category_id: Option<i32>,
    /// `regular` or `private_message`
    pub archetype: String,
    pub closed: bool,
    /// Set when the topic is soft-deleted; only staff can still resolve it.
    pub deleted_at: Option<String>,
    pub created_at: String,
    pub last_posted_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
