use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::notifications::UNRESOLVED_MESSAGE;
use crate::db::{NewNotification, Store, format_timestamp};
use crate::domain::NotificationKind;
use crate::services::query_filters::QueryFilters;

/// Reminds authors of topics that stayed unsolved longer than the configured delay.
pub struct UnresolvedReminderService {
    store: Store,
    config: Arc<RwLock<Config>>,
    filters: Arc<QueryFilters>,
}

impl UnresolvedReminderService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>, filters: Arc<QueryFilters>) -> Self {
        Self {
            store,
            config,
            filters,
        }
    }

    /// Sends at most one reminder per topic. Returns the number of new notifications.
    pub async fn send_reminders(&self, now: DateTime<Utc>) -> Result<usize> {
        let solved = self.config.read().await.solved.clone();
        if !solved.enabled || solved.unresolved_reminder_delay_days == 0 {
            debug!("Unresolved reminders disabled");
            return Ok(0);
        }

        let cutoff = now - Duration::days(i64::from(solved.unresolved_reminder_delay_days));
        let condition = self.filters.unsolved(&solved).await?;
        let topics = self
            .store
            .topics()
            .open_created_before(condition, &format_timestamp(cutoff))
            .await?;

        let notifications = self.store.notifications();
        let mut sent = 0;
        for topic in topics {
            let created = notifications
                .create_once(&NewNotification {
                    kind: NotificationKind::UnresolvedReminder,
                    user_id: topic.user_id,
                    topic_id: topic.id,
                    post_number: None,
                    data: json!({
                        "message": UNRESOLVED_MESSAGE,
                        "title": topic.title,
                    }),
                })
                .await?;
            if created {
                sent += 1;
            }
        }

        if sent > 0 {
            info!(sent, "Sent unresolved topic reminders");
        }
        Ok(sent)
    }
}
