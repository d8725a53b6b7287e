//! Who may accept or unaccept an answer.

use anyhow::Result;
use std::sync::Arc;

use crate::config::SolvedConfig;
use crate::db::Store;
use crate::domain::{PostType, TrustLevel};
use crate::models::post::Post;
use crate::models::topic::Topic;
use crate::models::user::User;
use crate::services::allowlist_cache::CategoryAllowlistCache;

pub struct PermissionPolicy {
    store: Store,
    allowlist: Arc<CategoryAllowlistCache>,
}

impl PermissionPolicy {
    #[must_use]
    pub const fn new(store: Store, allowlist: Arc<CategoryAllowlistCache>) -> Self {
        Self { store, allowlist }
    }

    /// Whether accepted answers are available for a topic with this category and tags.
    pub async fn allow_accepted_answers(
        &self,
        config: &SolvedConfig,
        category_id: Option<i32>,
        tags: &[String],
    ) -> Result<bool> {
        if !config.enabled {
            return Ok(false);
        }

        if config.allow_solved_on_all_topics {
            return Ok(true);
        }

        if !config.enable_solved_tags.is_empty()
            && tags.iter().any(|t| config.enable_solved_tags.contains(t))
        {
            return Ok(true);
        }

        match category_id {
            Some(id) => self.allowlist.is_enabled(id).await,
            None => Ok(false),
        }
    }

    /// Decision order, first match wins: anonymous, missing topic or post, whisper,
    /// feature disabled for the topic, staff, trust level, category group moderator,
    /// author of an open topic.
    pub async fn can_accept(
        &self,
        config: &SolvedConfig,
        user: Option<&User>,
        topic: Option<&Topic>,
        post: Option<&Post>,
    ) -> Result<bool> {
        let Some(user) = user else {
            return Ok(false);
        };
        let (Some(topic), Some(post)) = (topic, post) else {
            return Ok(false);
        };
        if post.post_type == PostType::Whisper {
            return Ok(false);
        }

        if !self
            .allow_accepted_answers(config, topic.category_id, &topic.tags)
            .await?
        {
            return Ok(false);
        }

        if user.is_staff() {
            return Ok(true);
        }

        if user.trust_level >= TrustLevel::new(config.accept_all_solutions_trust_level) {
            return Ok(true);
        }

        if config.enable_category_group_moderation && self.is_category_moderator(user, topic).await?
        {
            return Ok(true);
        }

        Ok(config.accept_solutions_topic_author && user.id == topic.user_id && !topic.closed)
    }

    async fn is_category_moderator(&self, user: &User, topic: &Topic) -> Result<bool> {
        let Some(category_id) = topic.category_id else {
            return Ok(false);
        };
        let Some(category) = self.store.get_category(category_id).await? else {
            return Ok(false);
        };
        let Some(group_id) = category.reviewable_by_group_id else {
            return Ok(false);
        };

        self.store.users().is_group_member(user.id, group_id).await
    }
}
