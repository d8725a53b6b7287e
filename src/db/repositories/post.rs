use anyhow::{Context, Result};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;

use crate::db::now_timestamp;
use crate::domain::PostType;
use crate::entities::{posts, topics};
use crate::models::post::Post;

/// Post matching a search term.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct PostSearchHit {
    pub post_id: i32,
    pub topic_id: i32,
    pub post_number: i32,
    pub title: String,
    pub cooked: String,
}

pub struct PostRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> PostRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Loads a post including soft-deleted ones.
    pub async fn get(&self, id: i32) -> Result<Option<Post>> {
        let post = posts::Entity::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query post")?;

        Ok(post.map(Post::from))
    }

    pub async fn get_live(&self, id: i32) -> Result<Option<Post>> {
        Ok(self.get(id).await?.filter(|p| !p.is_deleted()))
    }

    pub async fn for_topic(&self, topic_id: i32) -> Result<Vec<Post>> {
        let rows = posts::Entity::find()
            .filter(posts::Column::TopicId.eq(topic_id))
            .filter(posts::Column::DeletedAt.is_null())
            .order_by_asc(posts::Column::PostNumber)
            .all(self.conn)
            .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    /// Appends a post to a topic and moves the topic's `last_posted_at`.
    pub async fn create(
        &self,
        topic_id: i32,
        user_id: i32,
        post_type: PostType,
        cooked: &str,
    ) -> Result<Post> {
        let last_number: Option<i32> = posts::Entity::find()
            .select_only()
            .column_as(posts::Column::PostNumber.max(), "max_number")
            .filter(posts::Column::TopicId.eq(topic_id))
            .into_tuple::<Option<i32>>()
            .one(self.conn)
            .await?
            .flatten();

        let now = now_timestamp();

        let model = posts::ActiveModel {
            topic_id: Set(topic_id),
            user_id: Set(user_id),
            post_number: Set(last_number.unwrap_or(0) + 1),
            post_type: Set(post_type.as_str().to_string()),
            cooked: Set(cooked.to_string()),
            created_at: Set(now.clone()),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .with_context(|| format!("Failed to create post in topic {topic_id}"))?;

        topics::Entity::update_many()
            .col_expr(topics::Column::LastPostedAt, Expr::value(now))
            .filter(topics::Column::Id.eq(topic_id))
            .exec(self.conn)
            .await?;

        Ok(Post::from(model))
    }

    pub async fn soft_delete(&self, id: i32) -> Result<()> {
        posts::Entity::update_many()
            .col_expr(posts::Column::DeletedAt, Expr::value(Some(now_timestamp())))
            .filter(posts::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    /// Substring search (ASCII case-insensitive in SQLite) over live posts of live topics.
    pub async fn search(
        &self,
        term: &str,
        topic_condition: Condition,
        limit: u64,
    ) -> Result<Vec<PostSearchHit>> {
        let hits = posts::Entity::find()
            .select_only()
            .column_as(posts::Column::Id, "post_id")
            .column(posts::Column::TopicId)
            .column(posts::Column::PostNumber)
            .column(topics::Column::Title)
            .column(posts::Column::Cooked)
            .join(
                JoinType::InnerJoin,
                posts::Entity::belongs_to(topics::Entity)
                    .from(posts::Column::TopicId)
                    .to(topics::Column::Id)
                    .into(),
            )
            .filter(posts::Column::DeletedAt.is_null())
            .filter(topics::Column::DeletedAt.is_null())
            .filter(posts::Column::Cooked.contains(term))
            .filter(topic_condition)
            .order_by_desc(posts::Column::Id)
            .limit(limit)
            .into_model::<PostSearchHit>()
            .all(self.conn)
            .await
            .context("Failed to search posts")?;

        Ok(hits)
    }
}
