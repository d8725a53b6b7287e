use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::now_timestamp;
use crate::entities::{web_hook_events, web_hooks};

pub struct WebhookRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> WebhookRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        payload_url: &str,
        event_types: &[&str],
        wildcard: bool,
    ) -> Result<web_hooks::Model> {
        web_hooks::ActiveModel {
            payload_url: Set(payload_url.to_string()),
            active: Set(true),
            wildcard: Set(wildcard),
            event_types: Set(event_types.join(",")),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to create web hook")
    }

    /// Active hooks receiving `event_type`, either explicitly or as wildcard.
    pub async fn subscribed(&self, event_type: &str) -> Result<Vec<web_hooks::Model>> {
        let hooks = web_hooks::Entity::find()
            .filter(web_hooks::Column::Active.eq(true))
            .order_by_asc(web_hooks::Column::Id)
            .all(self.conn)
            .await?;

        Ok(hooks
            .into_iter()
            .filter(|h| h.subscribes_to(event_type))
            .collect())
    }

    pub async fn enqueue(&self, web_hook_id: i32, event_name: &str, payload: &str) -> Result<()> {
        web_hook_events::ActiveModel {
            web_hook_id: Set(web_hook_id),
            event_name: Set(event_name.to_string()),
            payload: Set(payload.to_string()),
            status: Set("pending".to_string()),
            created_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to enqueue web hook event")?;

        Ok(())
    }

    pub async fn pending_events(&self) -> Result<Vec<web_hook_events::Model>> {
        let events = web_hook_events::Entity::find()
            .filter(web_hook_events::Column::Status.eq("pending"))
            .order_by_asc(web_hook_events::Column::Id)
            .all(self.conn)
            .await?;

        Ok(events)
    }
}
