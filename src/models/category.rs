use serde::{Deserialize, Serialize};

use crate::entities::categories;

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub parent_category_id: Option<i32>,
    pub enable_accepted_answers: bool,
    pub solved_topics_auto_close_hours: Option<i32>,
    pub reviewable_by_group_id: Option<i32>,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            parent_category_id: model.parent_category_id,
            enable_accepted_answers: model.enable_accepted_answers,
            solved_topics_auto_close_hours: model.solved_topics_auto_close_hours,
            reviewable_by_group_id: model.reviewable_by_group_id,
        }
    }
}

/// Partial update of a category's accepted-answer settings. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategorySolvedSettings {
    pub enable_accepted_answers: Option<bool>,
    /// Zero clears the override.
    pub solved_topics_auto_close_hours: Option<i32>,
}
