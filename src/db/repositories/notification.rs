use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::now_timestamp;
use crate::domain::NotificationKind;
use crate::entities::notifications;

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub user_id: i32,
    pub topic_id: i32,
    pub post_number: Option<i32>,
    pub data: serde_json::Value,
}

pub struct NotificationRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> NotificationRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Creates the notification unless one with the same (type, user, topic, post number)
    /// already exists. Returns whether a row was inserted.
    pub async fn create_once(&self, input: &NewNotification) -> Result<bool> {
        if self
            .exists(input.kind, input.user_id, input.topic_id, input.post_number)
            .await?
        {
            return Ok(false);
        }

        notifications::ActiveModel {
            notification_type: Set(input.kind.as_str().to_string()),
            user_id: Set(input.user_id),
            topic_id: Set(input.topic_id),
            post_number: Set(input.post_number),
            data: Set(input.data.to_string()),
            created_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to create notification")?;

        Ok(true)
    }

    pub async fn exists(
        &self,
        kind: NotificationKind,
        user_id: i32,
        topic_id: i32,
        post_number: Option<i32>,
    ) -> Result<bool> {
        let count = Self::keyed(kind, user_id, topic_id, post_number)
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn delete(
        &self,
        kind: NotificationKind,
        user_id: i32,
        topic_id: i32,
        post_number: Option<i32>,
    ) -> Result<u64> {
        let mut delete = notifications::Entity::delete_many()
            .filter(notifications::Column::NotificationType.eq(kind.as_str()))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::TopicId.eq(topic_id));

        delete = match post_number {
            Some(number) => delete.filter(notifications::Column::PostNumber.eq(number)),
            None => delete.filter(notifications::Column::PostNumber.is_null()),
        };

        let result = delete.exec(self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn for_user(&self, user_id: i32) -> Result<Vec<notifications::Model>> {
        let rows = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::Id)
            .all(self.conn)
            .await?;

        Ok(rows)
    }

    fn keyed(
        kind: NotificationKind,
        user_id: i32,
        topic_id: i32,
        post_number: Option<i32>,
    ) -> sea_orm::Select<notifications::Entity> {
        let query = notifications::Entity::find()
            .filter(notifications::Column::NotificationType.eq(kind.as_str()))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::TopicId.eq(topic_id));

        match post_number {
            Some(number) => query.filter(notifications::Column::PostNumber.eq(number)),
            None => query.filter(notifications::Column::PostNumber.is_null()),
        }
    }
}
