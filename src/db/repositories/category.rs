use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::db::now_timestamp;
use crate::entities::categories;
use crate::models::category::{Category, CategorySolvedSettings};

#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub parent_category_id: Option<i32>,
    pub enable_accepted_answers: bool,
    pub solved_topics_auto_close_hours: Option<i32>,
    pub reviewable_by_group_id: Option<i32>,
}

pub struct CategoryRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> CategoryRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<Category>> {
        let category = categories::Entity::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query category")?;

        Ok(category.map(Category::from))
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let rows = categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .all(self.conn)
            .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Ids of every category with accepted answers enabled.
    pub async fn enabled_ids(&self) -> Result<Vec<i32>> {
        let ids = categories::Entity::find()
            .select_only()
            .column(categories::Column::Id)
            .filter(categories::Column::EnableAcceptedAnswers.eq(true))
            .into_tuple::<i32>()
            .all(self.conn)
            .await
            .context("Failed to load enabled categories")?;

        Ok(ids)
    }

    pub async fn subcategory_ids(&self, parent_id: i32) -> Result<Vec<i32>> {
        let ids = categories::Entity::find()
            .select_only()
            .column(categories::Column::Id)
            .filter(categories::Column::ParentCategoryId.eq(parent_id))
            .into_tuple::<i32>()
            .all(self.conn)
            .await?;

        Ok(ids)
    }

    pub async fn create(&self, input: &NewCategory) -> Result<Category> {
        let model = categories::ActiveModel {
            name: Set(input.name.clone()),
            parent_category_id: Set(input.parent_category_id),
            enable_accepted_answers: Set(input.enable_accepted_answers),
            solved_topics_auto_close_hours: Set(input.solved_topics_auto_close_hours),
            reviewable_by_group_id: Set(input.reviewable_by_group_id),
            updated_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .with_context(|| format!("Failed to create category {}", input.name))?;

        Ok(Category::from(model))
    }

    /// Applies the given settings; returns `None` for an unknown category.
    pub async fn update_solved_settings(
        &self,
        id: i32,
        settings: &CategorySolvedSettings,
    ) -> Result<Option<Category>> {
        let Some(existing) = categories::Entity::find_by_id(id).one(self.conn).await? else {
            return Ok(None);
        };

        let mut model: categories::ActiveModel = existing.into();
        if let Some(enabled) = settings.enable_accepted_answers {
            model.enable_accepted_answers = Set(enabled);
        }
        if let Some(hours) = settings.solved_topics_auto_close_hours {
            model.solved_topics_auto_close_hours = Set((hours > 0).then_some(hours));
        }
        model.updated_at = Set(now_timestamp());

        let updated = model.update(self.conn).await?;
        Ok(Some(Category::from(updated)))
    }
}
