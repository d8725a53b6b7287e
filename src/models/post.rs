use serde::Serialize;

use crate::domain::PostType;
use crate::entities::posts;

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i32,
    pub topic_id: i32,
    pub user_id: i32,
    pub post_number: i32,
    pub post_type: PostType,
    pub cooked: String,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

impl Post {
    #[must_use]
    pub const fn is_first_post(&self) -> bool {
        self.post_number == 1
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl From<posts::Model> for Post {
    fn from(model: posts::Model) -> Self {
        Self {
            id: model.id,
            topic_id: model.topic_id,
            user_id: model.user_id,
            post_number: model.post_number,
            post_type: PostType::from_db(&model.post_type),
            cooked: model.cooked,
            created_at: model.created_at,
            deleted_at: model.deleted_at,
        }
    }
}
