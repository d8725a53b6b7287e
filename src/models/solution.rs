use serde::Serialize;

use crate::entities::solved_topics;

/// The accepted answer record of a solved topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub id: i32,
    pub topic_id: i32,
    pub answer_post_id: i32,
    pub accepter_user_id: Option<i32>,
    pub topic_timer_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<solved_topics::Model> for Solution {
    fn from(model: solved_topics::Model) -> Self {
        Self {
            id: model.id,
            topic_id: model.topic_id,
            answer_post_id: model.answer_post_id,
            accepter_user_id: model.accepter_user_id,
            topic_timer_id: model.topic_timer_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Summary of the accepted answer shown at the top of a topic.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedAnswerInfo {
    pub post_number: i32,
    pub username: String,
    pub name: Option<String>,
    pub accepter_username: Option<String>,
    pub accepter_name: Option<String>,
    /// Plain-text excerpt of the answer, absent when excerpts are disabled.
    pub excerpt: Option<String>,
}

/// A post the user authored that was accepted as a solution.
#[derive(Debug, Clone, Serialize)]
pub struct SolvedPost {
    pub post_id: i32,
    pub post_number: i32,
    pub topic_id: i32,
    pub topic_title: String,
    pub category_id: Option<i32>,
    pub excerpt: String,
    pub accepted_at: String,
}
