use anyhow::{Context, Result};
use sea_orm::sea_query::{Condition, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashSet;

use crate::db::now_timestamp;
use crate::domain::Archetype;
use crate::entities::{solved_topics, tags, topic_tags, topics};
use crate::models::topic::{Topic, TopicListItem};

#[derive(Debug, Clone, Default)]
pub struct NewTopic {
    pub title: String,
    pub user_id: i32,
    pub category_id: Option<i32>,
    pub archetype: Archetype,
    pub tags: Vec<String>,
}

pub struct TopicRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> TopicRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Loads a live topic. Soft-deleted topics are only visible through
    /// [`Self::get_with_deleted`].
    pub async fn get(&self, id: i32) -> Result<Option<Topic>> {
        Ok(self.get_with_deleted(id).await?.filter(|t| !t.is_deleted()))
    }

    pub async fn get_with_deleted(&self, id: i32) -> Result<Option<Topic>> {
        let Some(model) = topics::Entity::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query topic")?
        else {
            return Ok(None);
        };

        let tags = self.tags_for(id).await?;
        Ok(Some(Topic::from_model(model, tags)))
    }

    pub async fn tags_for(&self, topic_id: i32) -> Result<Vec<String>> {
        let names = tags::Entity::find()
            .select_only()
            .column(tags::Column::Name)
            .join(
                JoinType::InnerJoin,
                tags::Entity::belongs_to(topic_tags::Entity)
                    .from(tags::Column::Id)
                    .to(topic_tags::Column::TagId)
                    .into(),
            )
            .filter(topic_tags::Column::TopicId.eq(topic_id))
            .order_by_asc(tags::Column::Name)
            .into_tuple::<String>()
            .all(self.conn)
            .await?;

        Ok(names)
    }

    pub async fn tag_ids_for_names(&self, names: &[String]) -> Result<Vec<i32>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let ids = tags::Entity::find()
            .select_only()
            .column(tags::Column::Id)
            .filter(tags::Column::Name.is_in(names.iter().cloned()))
            .into_tuple::<i32>()
            .all(self.conn)
            .await?;

        Ok(ids)
    }

    pub async fn create(&self, input: &NewTopic) -> Result<Topic> {
        let now = now_timestamp();

        let model = topics::ActiveModel {
            title: Set(input.title.clone()),
            user_id: Set(input.user_id),
            category_id: Set(input.category_id),
            archetype: Set(input.archetype.as_str().to_string()),
            closed: Set(false),
            deleted_at: Set(None),
            created_at: Set(now.clone()),
            last_posted_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .with_context(|| format!("Failed to create topic {}", input.title))?;

        for name in &input.tags {
            let tag_id = self.ensure_tag(name).await?;
            topic_tags::Entity::insert(topic_tags::ActiveModel {
                topic_id: Set(model.id),
                tag_id: Set(tag_id),
            })
            .on_conflict(
                OnConflict::columns([topic_tags::Column::TopicId, topic_tags::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;
        }

        let tags = self.tags_for(model.id).await?;
        Ok(Topic::from_model(model, tags))
    }

    async fn ensure_tag(&self, name: &str) -> Result<i32> {
        if let Some(tag) = tags::Entity::find()
            .filter(tags::Column::Name.eq(name))
            .one(self.conn)
            .await?
        {
            return Ok(tag.id);
        }

        let tag = tags::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(tag.id)
    }

    /// Opens or closes a topic. `bump` also moves `updated_at` so the topic surfaces as
    /// recently active.
    pub async fn set_closed(&self, id: i32, closed: bool, bump: bool) -> Result<()> {
        let mut update = topics::Entity::update_many()
            .col_expr(topics::Column::Closed, closed.into())
            .filter(topics::Column::Id.eq(id));

        if bump {
            update = update.col_expr(topics::Column::UpdatedAt, now_timestamp().into());
        }

        update.exec(self.conn).await?;
        Ok(())
    }

    pub async fn set_category(&self, id: i32, category_id: Option<i32>) -> Result<()> {
        topics::Entity::update_many()
            .col_expr(topics::Column::CategoryId, category_id.into())
            .col_expr(topics::Column::UpdatedAt, now_timestamp().into())
            .filter(topics::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    pub async fn soft_delete(&self, id: i32) -> Result<()> {
        topics::Entity::update_many()
            .col_expr(topics::Column::DeletedAt, Some(now_timestamp()).into())
            .filter(topics::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    /// Lists live topics matching `condition`, most recently active first.
    pub async fn list(
        &self,
        condition: Condition,
        category_id: Option<i32>,
        limit: u64,
    ) -> Result<Vec<TopicListItem>> {
        let mut query = topics::Entity::find()
            .filter(topics::Column::DeletedAt.is_null())
            .filter(condition);

        if let Some(category_id) = category_id {
            query = query.filter(topics::Column::CategoryId.eq(category_id));
        }

        let rows = query
            .order_by_desc(topics::Column::LastPostedAt)
            .order_by_desc(topics::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await
            .context("Failed to list topics")?;

        let solved = self
            .solved_among(&rows.iter().map(|t| t.id).collect::<Vec<_>>())
            .await?;

        Ok(rows
            .into_iter()
            .map(|t| TopicListItem {
                has_accepted_answer: solved.contains(&t.id),
                id: t.id,
                title: t.title,
                category_id: t.category_id,
                closed: t.closed,
                last_posted_at: t.last_posted_at,
            })
            .collect())
    }

    /// Live, open topics matching `condition` created at or before `created_before`.
    pub async fn open_created_before(
        &self,
        condition: Condition,
        created_before: &str,
    ) -> Result<Vec<topics::Model>> {
        let rows = topics::Entity::find()
            .filter(topics::Column::DeletedAt.is_null())
            .filter(topics::Column::Closed.eq(false))
            .filter(topics::Column::CreatedAt.lte(created_before))
            .filter(condition)
            .order_by_asc(topics::Column::Id)
            .all(self.conn)
            .await?;

        Ok(rows)
    }

    async fn solved_among(&self, topic_ids: &[i32]) -> Result<HashSet<i32>> {
        if topic_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids = solved_topics::Entity::find()
            .select_only()
            .column(solved_topics::Column::TopicId)
            .join(JoinType::InnerJoin, solved_topics::answer_post())
            .filter(solved_topics::Column::TopicId.is_in(topic_ids.iter().copied()))
            .filter(crate::entities::posts::Column::DeletedAt.is_null())
            .into_tuple::<i32>()
            .all(self.conn)
            .await?;

        Ok(ids.into_iter().collect())
    }
}

