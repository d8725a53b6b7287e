use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

use crate::db::now_timestamp;
use crate::domain::user_action::SOLVED;
use crate::entities::user_actions;

/// Append-only audit log of user actions. Only SOLVED entries are written here.
pub struct UserActionRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> UserActionRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Records that `user_id`'s post answered the topic. An identical entry is not
    /// duplicated.
    pub async fn log_solved(
        &self,
        user_id: i32,
        acting_user_id: i32,
        post_id: i32,
        topic_id: i32,
    ) -> Result<bool> {
        let existing = user_actions::Entity::find()
            .filter(user_actions::Column::ActionType.eq(SOLVED))
            .filter(user_actions::Column::UserId.eq(user_id))
            .filter(user_actions::Column::ActingUserId.eq(acting_user_id))
            .filter(user_actions::Column::TargetPostId.eq(post_id))
            .filter(user_actions::Column::TargetTopicId.eq(topic_id))
            .count(self.conn)
            .await?;

        if existing > 0 {
            return Ok(false);
        }

        user_actions::ActiveModel {
            action_type: Set(SOLVED),
            user_id: Set(user_id),
            acting_user_id: Set(Some(acting_user_id)),
            target_post_id: Set(Some(post_id)),
            target_topic_id: Set(Some(topic_id)),
            created_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(true)
    }

    pub async fn delete_solved_for_post(&self, post_id: i32) -> Result<u64> {
        let result = user_actions::Entity::delete_many()
            .filter(user_actions::Column::ActionType.eq(SOLVED))
            .filter(user_actions::Column::TargetPostId.eq(post_id))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn count_solved_for_user(&self, user_id: i32) -> Result<u64> {
        let count = user_actions::Entity::find()
            .filter(user_actions::Column::ActionType.eq(SOLVED))
            .filter(user_actions::Column::UserId.eq(user_id))
            .count(self.conn)
            .await?;

        Ok(count)
    }

    pub async fn count_solved_for_post(&self, post_id: i32) -> Result<u64> {
        let count = user_actions::Entity::find()
            .filter(user_actions::Column::ActionType.eq(SOLVED))
            .filter(user_actions::Column::TargetPostId.eq(post_id))
            .count(self.conn)
            .await?;

        Ok(count)
    }
}
