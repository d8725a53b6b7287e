use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub parent_category_id: Option<i32>,
    pub enable_accepted_answers: bool,
    /// Overrides the site-wide auto-close hours when positive.
    pub solved_topics_auto_close_hours: Option<i32>,
    /// Members of this group moderate the category.
    pub reviewable_by_group_id: Option<i32>,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
