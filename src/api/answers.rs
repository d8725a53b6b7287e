//! Accept and unaccept endpoints.

use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::info;

use super::auth::MaybeUser;
use super::{ApiError, ApiResponse, AppState, PostIdRequest};
use crate::models::post::Post;
use crate::models::topic::Topic;
use crate::models::user::User;

/// POST /api/solution/accept
pub async fn accept(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<PostIdRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = user.ok_or_else(ApiError::forbidden)?;
    limit_accepts(&state, &user).await?;

    let (post, topic) = resolve_for_toggle(&state, &user, payload.id).await?;
    state.acceptance().accept(&post, &user, &topic).await?;

    info!(
        topic_id = topic.id,
        post_id = post.id,
        user_id = user.id,
        "Answer accepted via API"
    );

    Ok(Json(ApiResponse::success(())))
}

/// POST /api/solution/unaccept
pub async fn unaccept(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<PostIdRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = user.ok_or_else(ApiError::forbidden)?;
    limit_accepts(&state, &user).await?;

    let (post, topic) = resolve_for_toggle(&state, &user, payload.id).await?;
    state.acceptance().unaccept(&post, &topic).await?;

    info!(
        topic_id = topic.id,
        post_id = post.id,
        user_id = user.id,
        "Answer unaccepted via API"
    );

    Ok(Json(ApiResponse::success(())))
}

async fn limit_accepts(state: &AppState, user: &User) -> Result<(), ApiError> {
    let limits = state.config().read().await.rate_limit.clone();
    state
        .shared
        .rate_limiter
        .check(&limits, user)
        .map_err(|retry_after_secs| {
            metrics::counter!("solved_rate_limited_total").increment(1);
            ApiError::RateLimited { retry_after_secs }
        })
}

/// Loads the post and its topic and checks the acting user may toggle it. Staff can
/// still resolve a soft-deleted topic; everyone else sees it as missing and is denied.
async fn resolve_for_toggle(
    state: &AppState,
    user: &User,
    post_id: i32,
) -> Result<(Post, Topic), ApiError> {
    let post = state
        .store()
        .posts()
        .get_live(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", post_id))?;

    let topic = if user.is_staff() {
        state.store().get_topic_with_deleted(post.topic_id).await?
    } else {
        state.store().get_topic(post.topic_id).await?
    };

    let solved = state.config().read().await.solved.clone();
    let allowed = state
        .shared
        .policy
        .can_accept(&solved, Some(user), topic.as_ref(), Some(&post))
        .await?;

    match topic {
        Some(topic) if allowed => Ok((post, topic)),
        _ => Err(ApiError::forbidden()),
    }
}
