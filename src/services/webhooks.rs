//! Outbound web hook payloads for solution events.
//!
//! Delivery belongs to the host; this only queues one `web_hook_events` row per
//! subscribed hook.

use anyhow::Result;
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::debug;

use crate::constants::webhooks::SOLVED_EVENT_TYPE;
use crate::db::WebhookRepository;
use crate::domain::events::SolvedEvent;
use crate::models::post::Post;

pub struct WebhookService {
    conn: DatabaseConnection,
}

impl WebhookService {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Queues `event` for every active hook subscribed to solution events. Returns the
    /// number of hooks notified.
    pub async fn enqueue(&self, event: &SolvedEvent, post: &Post) -> Result<usize> {
        let repo = WebhookRepository::new(&self.conn);
        let hooks = repo.subscribed(SOLVED_EVENT_TYPE).await?;
        if hooks.is_empty() {
            return Ok(0);
        }

        let payload = json!({
            "event": event.name(),
            "post": {
                "id": post.id,
                "topic_id": post.topic_id,
                "post_number": post.post_number,
                "user_id": post.user_id,
            },
            "details": event,
        })
        .to_string();

        for hook in &hooks {
            repo.enqueue(hook.id, event.name(), &payload).await?;
        }

        debug!(event = event.name(), hooks = hooks.len(), "Queued web hook events");
        Ok(hooks.len())
    }
}
