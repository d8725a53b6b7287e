use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::now_timestamp;
use crate::domain::TimerKind;
use crate::entities::topic_timers;

pub struct TimerRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> TimerRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<topic_timers::Model>> {
        Ok(topic_timers::Entity::find_by_id(id).one(self.conn).await?)
    }

    pub async fn for_topic(&self, topic_id: i32) -> Result<Option<topic_timers::Model>> {
        let timer = topic_timers::Entity::find()
            .filter(topic_timers::Column::TopicId.eq(topic_id))
            .one(self.conn)
            .await?;

        Ok(timer)
    }

    /// A topic carries at most one close timer; an existing one is rescheduled in place.
    pub async fn set_or_create(
        &self,
        topic_id: i32,
        kind: TimerKind,
        execute_at: &str,
        duration_minutes: i32,
        based_on_last_post: bool,
    ) -> Result<topic_timers::Model> {
        if let Some(existing) = self.for_topic(topic_id).await? {
            let mut model: topic_timers::ActiveModel = existing.into();
            model.status_type = Set(kind.as_str().to_string());
            model.execute_at = Set(execute_at.to_string());
            model.duration_minutes = Set(duration_minutes);
            model.based_on_last_post = Set(based_on_last_post);

            return model
                .update(self.conn)
                .await
                .context("Failed to reschedule topic timer");
        }

        topic_timers::ActiveModel {
            topic_id: Set(topic_id),
            status_type: Set(kind.as_str().to_string()),
            execute_at: Set(execute_at.to_string()),
            based_on_last_post: Set(based_on_last_post),
            duration_minutes: Set(duration_minutes),
            created_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to create topic timer")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = topic_timers::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Timers whose `execute_at` is at or before `now`, oldest first.
    pub async fn due(&self, now: &str) -> Result<Vec<topic_timers::Model>> {
        let timers = topic_timers::Entity::find()
            .filter(topic_timers::Column::ExecuteAt.lte(now))
            .order_by_asc(topic_timers::Column::ExecuteAt)
            .all(self.conn)
            .await?;

        Ok(timers)
    }
}
