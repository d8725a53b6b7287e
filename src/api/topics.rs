use axum::{
    Json,
    extract::{Path, Query, State},
};
use sea_orm::Condition;
use std::sync::Arc;

use super::auth::MaybeUser;
use super::{
    ApiError, ApiResponse, AppState, CategoryChangeDto, ChangeCategoryRequest, PostDto,
    TopicListDto, TopicListQuery, TopicViewDto,
};
use crate::constants::limits::{DEFAULT_SOLVED_POSTS_LIMIT, MAX_SOLVED_POSTS_LIMIT};
use crate::domain::SolvedFilter;

/// GET /api/topics?solved=yes|no&category_id=
///
/// Unknown `solved` values are ignored and list every topic.
pub async fn list_topics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopicListQuery>,
) -> Result<Json<ApiResponse<TopicListDto>>, ApiError> {
    let solved = state.config().read().await.solved.clone();

    let condition = match query.solved.as_deref().and_then(SolvedFilter::from_list_param) {
        Some(filter) if solved.enabled => {
            state.shared.query_filters.condition_for(&solved, filter).await?
        }
        _ => Condition::all(),
    };

    let limit = query
        .limit
        .unwrap_or(DEFAULT_SOLVED_POSTS_LIMIT)
        .clamp(1, MAX_SOLVED_POSTS_LIMIT);

    let topics = state
        .store()
        .topics()
        .list(condition, query.category_id, limit)
        .await?;

    Ok(Json(ApiResponse::success(TopicListDto { topics })))
}

/// GET /api/topics/{id}
pub async fn get_topic(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TopicViewDto>>, ApiError> {
    let is_staff = user.as_ref().is_some_and(crate::models::user::User::is_staff);
    let topic = if is_staff {
        state.store().get_topic_with_deleted(id).await?
    } else {
        state.store().get_topic(id).await?
    }
    .ok_or_else(|| ApiError::not_found("Topic", id))?;

    let solved = state.config().read().await.solved.clone();
    let policy = &state.shared.policy;

    let enabled = policy
        .allow_accepted_answers(&solved, topic.category_id, &topic.tags)
        .await?;
    let status = state.acceptance().status(topic.id).await?;
    let accepted_post_id = status.answer_post_id();

    let accepted_answer = if enabled && accepted_post_id.is_some() {
        state
            .shared
            .reports
            .accepted_answer(topic.id, solved.solved_quote_length)
            .await?
    } else {
        None
    };

    let mut posts = Vec::new();
    for post in state.store().posts().for_topic(topic.id).await? {
        let can_accept = policy
            .can_accept(&solved, user.as_ref(), Some(&topic), Some(&post))
            .await?;
        let accepted = accepted_post_id == Some(post.id);

        posts.push(PostDto {
            can_accept_answer: can_accept && !post.is_first_post() && !accepted,
            can_unaccept_answer: can_accept && accepted,
            accepted_answer: accepted,
            id: post.id,
            post_number: post.post_number,
            user_id: post.user_id,
            post_type: post.post_type,
            cooked: post.cooked,
            created_at: post.created_at,
        });
    }

    Ok(Json(ApiResponse::success(TopicViewDto {
        id: topic.id,
        title: topic.title.clone(),
        category_id: topic.category_id,
        tags: topic.tags.clone(),
        closed: topic.closed,
        deleted: topic.is_deleted(),
        has_accepted_answer: status.is_solved(),
        accepted_answers_enabled: enabled,
        accepted_answer,
        posts,
    })))
}

/// PUT /api/topics/{id}/category
///
/// Staff or the topic author may move a topic.
pub async fn change_category(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i32>,
    Json(payload): Json<ChangeCategoryRequest>,
) -> Result<Json<ApiResponse<CategoryChangeDto>>, ApiError> {
    let user = user.ok_or_else(ApiError::forbidden)?;
    let topic = state
        .store()
        .get_topic(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Topic", id))?;

    if !user.is_staff() && user.id != topic.user_id {
        return Err(ApiError::forbidden());
    }

    let solved = state.config().read().await.solved.clone();
    let reload_required = state
        .shared
        .categories
        .change_topic_category(&solved, id, payload.category_id)
        .await?;

    Ok(Json(ApiResponse::success(CategoryChangeDto {
        topic_id: id,
        category_id: payload.category_id,
        reload_required,
    })))
}
