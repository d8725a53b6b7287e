use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;

use crate::entities::{solved_topics, topics};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct DailyCount {
    /// `YYYY-MM-DD`
    pub day: String,
    pub count: i64,
}

pub struct ReportRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> ReportRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Solutions created in `[start, end)` grouped by UTC day. Bounds are timestamps or
    /// dates; both compare lexically against the stored RFC 3339 values.
    pub async fn accepted_per_day(
        &self,
        start: &str,
        end: &str,
        category_ids: Option<&[i32]>,
    ) -> Result<Vec<DailyCount>> {
        let day = Expr::cust("substr(solved_topics.created_at, 1, 10)");

        let mut query = solved_topics::Entity::find()
            .select_only()
            .column_as(day.clone(), "day")
            .column_as(solved_topics::Column::Id.count(), "count")
            .filter(solved_topics::Column::CreatedAt.gte(start))
            .filter(solved_topics::Column::CreatedAt.lt(end));

        if let Some(ids) = category_ids {
            query = query
                .join(JoinType::InnerJoin, solved_topics::topic())
                .filter(topics::Column::CategoryId.is_in(ids.iter().copied()));
        }

        let rows = query
            .group_by(day.clone())
            .order_by_asc(day)
            .into_model::<DailyCount>()
            .all(self.conn)
            .await
            .context("Failed to build accepted solutions report")?;

        Ok(rows)
    }

    pub async fn accepted_between(
        &self,
        start: &str,
        end: &str,
        category_ids: Option<&[i32]>,
    ) -> Result<u64> {
        let mut query = solved_topics::Entity::find()
            .filter(solved_topics::Column::CreatedAt.gte(start))
            .filter(solved_topics::Column::CreatedAt.lt(end));

        if let Some(ids) = category_ids {
            query = query
                .join(JoinType::InnerJoin, solved_topics::topic())
                .filter(topics::Column::CategoryId.is_in(ids.iter().copied()));
        }

        Ok(query.count(self.conn).await?)
    }
}
