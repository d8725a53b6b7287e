//! Saving category settings and moving topics between categories.

use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::SolvedConfig;
use crate::db::Store;
use crate::domain::events::SolvedEvent;
use crate::models::category::{Category, CategorySolvedSettings};
use crate::services::permission::PermissionPolicy;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category not found: {0}")]
    NotFound(i32),

    #[error("Topic not found: {0}")]
    TopicNotFound(i32),

    #[error("Invalid settings: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for CategoryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Called synchronously after a category's configuration was saved.
pub trait CategorySaveObserver: Send + Sync {
    fn category_saved(&self, category_id: i32);
}

pub struct CategoryService {
    store: Store,
    policy: Arc<PermissionPolicy>,
    observers: RwLock<Vec<Arc<dyn CategorySaveObserver>>>,
    event_bus: broadcast::Sender<SolvedEvent>,
}

impl CategoryService {
    #[must_use]
    pub fn new(
        store: Store,
        policy: Arc<PermissionPolicy>,
        event_bus: broadcast::Sender<SolvedEvent>,
    ) -> Self {
        Self {
            store,
            policy,
            observers: RwLock::new(Vec::new()),
            event_bus,
        }
    }

    pub fn subscribe(&self, observer: Arc<dyn CategorySaveObserver>) {
        if let Ok(mut observers) = self.observers.write() {
            observers.push(observer);
        }
    }

    pub async fn update_solved_settings(
        &self,
        category_id: i32,
        settings: &CategorySolvedSettings,
    ) -> Result<Category, CategoryError> {
        if let Some(hours) = settings.solved_topics_auto_close_hours
            && hours < 0
        {
            return Err(CategoryError::Validation(
                "solved_topics_auto_close_hours must not be negative".to_string(),
            ));
        }

        let category = self
            .store
            .categories()
            .update_solved_settings(category_id, settings)
            .await?
            .ok_or(CategoryError::NotFound(category_id))?;

        self.notify_saved(category_id);
        let _ = self.event_bus.send(SolvedEvent::CategoryUpdated { category_id });

        info!(
            category_id,
            enabled = category.enable_accepted_answers,
            auto_close_hours = ?category.solved_topics_auto_close_hours,
            "Saved category solved settings"
        );

        Ok(category)
    }

    /// Moves a topic to another category. Clients viewing it are told to reload when
    /// accepted answers become available or unavailable as a result.
    pub async fn change_topic_category(
        &self,
        config: &SolvedConfig,
        topic_id: i32,
        category_id: Option<i32>,
    ) -> Result<bool, CategoryError> {
        let topic = self
            .store
            .get_topic(topic_id)
            .await?
            .ok_or(CategoryError::TopicNotFound(topic_id))?;

        if let Some(id) = category_id
            && self.store.get_category(id).await?.is_none()
        {
            return Err(CategoryError::NotFound(id));
        }

        let was_enabled = self
            .policy
            .allow_accepted_answers(config, topic.category_id, &topic.tags)
            .await?;
        self.store.topics().set_category(topic_id, category_id).await?;
        let now_enabled = self
            .policy
            .allow_accepted_answers(config, category_id, &topic.tags)
            .await?;

        let changed = was_enabled != now_enabled;
        if changed {
            let _ = self.event_bus.send(SolvedEvent::TopicReload { topic_id });
        }

        Ok(changed)
    }

    fn notify_saved(&self, category_id: i32) {
        match self.observers.read() {
            Ok(observers) => {
                for observer in observers.iter() {
                    observer.category_saved(category_id);
                }
            }
            Err(_) => warn!(category_id, "Category observers unavailable"),
        }
    }
}
