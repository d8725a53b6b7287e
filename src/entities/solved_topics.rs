//! Solved topics entity
//!
//! One row per solved topic. Both `topic_id` and `answer_post_id` are unique, so a topic
//! has at most one accepted answer and a post answers at most one topic. The table has no
//! foreign keys: removing the row when its answer post goes away is the service's job.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "solved_topics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub topic_id: i32,
    #[sea_orm(unique)]
    pub answer_post_id: i32,
    pub accepter_user_id: Option<i32>,
    pub topic_timer_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// Join from a solution to its answer post, without declaring a foreign key.
#[must_use]
pub fn answer_post() -> RelationDef {
    Entity::belongs_to(super::posts::Entity)
        .from(Column::AnswerPostId)
        .to(super::posts::Column::Id)
        .into()
}

/// Join from a solution to its topic, without declaring a foreign key.
#[must_use]
pub fn topic() -> RelationDef {
    Entity::belongs_to(super::topics::Entity)
        .from(Column::TopicId)
        .to(super::topics::Column::Id)
        .into()
}

impl ActiveModelBehavior for ActiveModel {}
