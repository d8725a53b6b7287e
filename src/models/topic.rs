use serde::Serialize;

use crate::domain::Archetype;
use crate::entities::topics;

#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub id: i32,
    pub title: String,
    pub user_id: i32,
    pub category_id: Option<i32>,
    pub archetype: Archetype,
    pub closed: bool,
    pub tags: Vec<String>,
    pub deleted_at: Option<String>,
    pub created_at: String,
    pub last_posted_at: String,
}

impl Topic {
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[must_use]
    pub fn is_private_message(&self) -> bool {
        self.archetype == Archetype::PrivateMessage
    }

    /// Builds a topic from its row; tags are loaded separately.
    #[must_use]
    pub fn from_model(model: topics::Model, tags: Vec<String>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            user_id: model.user_id,
            category_id: model.category_id,
            archetype: Archetype::from_db(&model.archetype),
            closed: model.closed,
            tags,
            deleted_at: model.deleted_at,
            created_at: model.created_at,
            last_posted_at: model.last_posted_at,
        }
    }
}

/// Row of a topic list.
#[derive(Debug, Clone, Serialize)]
pub struct TopicListItem {
    pub id: i32,
    pub title: String,
    pub category_id: Option<i32>,
    pub closed: bool,
    pub has_accepted_answer: bool,
    pub last_posted_at: String,
}
