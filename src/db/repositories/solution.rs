use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::db::now_timestamp;
use crate::domain::Archetype;
use crate::entities::{posts, solved_topics, topics};
use crate::models::solution::Solution;

/// Accepted answer joined with its post and topic, for per-user listings.
#[derive(Debug, Clone, FromQueryResult)]
pub struct SolvedPostRow {
    pub post_id: i32,
    pub post_number: i32,
    pub topic_id: i32,
    pub topic_title: String,
    pub category_id: Option<i32>,
    pub cooked: String,
    pub accepted_at: String,
}

/// Durable topic → accepted post records.
///
/// Writes are not safe to run concurrently for the same topic; callers hold the topic lock
/// and pass the transaction they run in.
pub struct SolutionRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> SolutionRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn find_by_topic(&self, topic_id: i32) -> Result<Option<Solution>> {
        let row = solved_topics::Entity::find()
            .filter(solved_topics::Column::TopicId.eq(topic_id))
            .one(self.conn)
            .await
            .context("Failed to query solution by topic")?;

        Ok(row.map(Solution::from))
    }

    pub async fn find_by_post(&self, post_id: i32) -> Result<Option<Solution>> {
        let row = solved_topics::Entity::find()
            .filter(solved_topics::Column::AnswerPostId.eq(post_id))
            .one(self.conn)
            .await
            .context("Failed to query solution by post")?;

        Ok(row.map(Solution::from))
    }

    /// Replaces the topic's solution: the existing row, if any, is deleted before the new
    /// one is inserted. A post already answering another topic fails with a unique
    /// constraint violation (see [`crate::db::is_unique_violation`]).
    pub async fn upsert(
        &self,
        topic_id: i32,
        post_id: i32,
        accepter_user_id: Option<i32>,
        topic_timer_id: Option<i32>,
    ) -> Result<Solution> {
        let previous = self.find_by_topic(topic_id).await?;
        self.remove(topic_id).await?;

        let now = now_timestamp();
        let created_at = previous
            .filter(|s| s.answer_post_id == post_id)
            .map_or_else(|| now.clone(), |s| s.created_at);

        let model = solved_topics::ActiveModel {
            topic_id: Set(topic_id),
            answer_post_id: Set(post_id),
            accepter_user_id: Set(accepter_user_id),
            topic_timer_id: Set(topic_timer_id),
            created_at: Set(created_at),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(Solution::from(model))
    }

    pub async fn set_timer(&self, topic_id: i32, topic_timer_id: Option<i32>) -> Result<()> {
        solved_topics::Entity::update_many()
            .col_expr(solved_topics::Column::TopicTimerId, topic_timer_id.into())
            .col_expr(solved_topics::Column::UpdatedAt, now_timestamp().into())
            .filter(solved_topics::Column::TopicId.eq(topic_id))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    /// Clears a timer reference wherever it is held.
    pub async fn clear_timer(&self, topic_timer_id: i32) -> Result<()> {
        solved_topics::Entity::update_many()
            .col_expr(solved_topics::Column::TopicTimerId, Option::<i32>::None.into())
            .filter(solved_topics::Column::TopicTimerId.eq(topic_timer_id))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    /// Deletes the topic's solution, returning the removed row. No-op when unsolved.
    pub async fn remove(&self, topic_id: i32) -> Result<Option<Solution>> {
        let existing = self.find_by_topic(topic_id).await?;
        if existing.is_some() {
            solved_topics::Entity::delete_many()
                .filter(solved_topics::Column::TopicId.eq(topic_id))
                .exec(self.conn)
                .await?;
        }
        Ok(existing)
    }

    pub async fn remove_by_post(&self, post_id: i32) -> Result<Option<Solution>> {
        let existing = self.find_by_post(post_id).await?;
        if existing.is_some() {
            solved_topics::Entity::delete_many()
                .filter(solved_topics::Column::AnswerPostId.eq(post_id))
                .exec(self.conn)
                .await?;
        }
        Ok(existing)
    }

    /// Number of solutions whose live answer post was written by `user_id`.
    pub async fn count_by_answer_author(&self, user_id: i32) -> Result<u64> {
        let count = solved_topics::Entity::find()
            .join(JoinType::InnerJoin, solved_topics::answer_post())
            .filter(posts::Column::UserId.eq(user_id))
            .filter(posts::Column::DeletedAt.is_null())
            .count(self.conn)
            .await?;

        Ok(count)
    }

    /// The user's accepted answers in live regular topics, newest solution first.
    pub async fn solved_posts_by_user(
        &self,
        user_id: i32,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<SolvedPostRow>> {
        let rows = solved_topics::Entity::find()
            .select_only()
            .column_as(posts::Column::Id, "post_id")
            .column(posts::Column::PostNumber)
            .column(solved_topics::Column::TopicId)
            .column_as(topics::Column::Title, "topic_title")
            .column(topics::Column::CategoryId)
            .column(posts::Column::Cooked)
            .column_as(solved_topics::Column::CreatedAt, "accepted_at")
            .join(JoinType::InnerJoin, solved_topics::answer_post())
            .join(JoinType::InnerJoin, solved_topics::topic())
            .filter(posts::Column::UserId.eq(user_id))
            .filter(posts::Column::DeletedAt.is_null())
            .filter(topics::Column::DeletedAt.is_null())
            .filter(topics::Column::Archetype.eq(Archetype::Regular.as_str()))
            .order_by_desc(solved_topics::Column::CreatedAt)
            .order_by_desc(solved_topics::Column::Id)
            .offset(offset)
            .limit(limit)
            .into_model::<SolvedPostRow>()
            .all(self.conn)
            .await
            .context("Failed to list solved posts")?;

        Ok(rows)
    }
}
