use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub topic_id: i32,
    pub user_id: i32,
    pub post_number: i32,
    /// `regular`, `whisper`, `moderator_action` or `small_action`
    pub post_type: String,
    #[sea_orm(column_type = "Text")]
    pub cooked: String,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
