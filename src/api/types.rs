use serde::{Deserialize, Serialize};

use crate::domain::PostType;
use crate::models::solution::AcceptedAnswerInfo;
use crate::models::topic::TopicListItem;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body of the accept/unaccept endpoints: the answer post id.
#[derive(Debug, Deserialize)]
pub struct PostIdRequest {
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct PostDto {
    pub id: i32,
    pub post_number: i32,
    pub user_id: i32,
    pub post_type: PostType,
    pub cooked: String,
    pub created_at: String,
    pub can_accept_answer: bool,
    pub can_unaccept_answer: bool,
    pub accepted_answer: bool,
}

#[derive(Debug, Serialize)]
pub struct TopicViewDto {
    pub id: i32,
    pub title: String,
    pub category_id: Option<i32>,
    pub tags: Vec<String>,
    pub closed: bool,
    pub deleted: bool,
    pub has_accepted_answer: bool,
    pub accepted_answers_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_answer: Option<AcceptedAnswerInfo>,
    pub posts: Vec<PostDto>,
}

#[derive(Debug, Serialize)]
pub struct TopicListDto {
    pub topics: Vec<TopicListItem>,
}

#[derive(Debug, Deserialize)]
pub struct TopicListQuery {
    pub solved: Option<String>,
    pub category_id: Option<i32>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeCategoryRequest {
    pub category_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CategoryChangeDto {
    pub topic_id: i32,
    pub category_id: Option<i32>,
    pub reload_required: bool,
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub offset: u64,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResultDto {
    pub post_id: i32,
    pub topic_id: i32,
    pub post_number: i32,
    pub title: String,
    pub has_accepted_answer: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category_id: Option<i32>,
    #[serde(default)]
    pub include_subcategories: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub uptime_seconds: u64,
}
