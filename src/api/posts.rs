use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tracing::info;

use super::auth::MaybeUser;
use super::{ApiError, ApiResponse, AppState};

/// DELETE /api/posts/{id}
///
/// Soft-deletes a post (staff or its author) and drops the solution it backed.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = user.ok_or_else(ApiError::forbidden)?;
    let post = state
        .store()
        .posts()
        .get_live(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", id))?;

    if !user.is_staff() && user.id != post.user_id {
        return Err(ApiError::forbidden());
    }

    state.store().posts().soft_delete(id).await?;
    state.acceptance().post_destroyed(id).await?;

    info!(post_id = id, topic_id = post.topic_id, user_id = user.id, "Post deleted");

    Ok(Json(ApiResponse::success(())))
}
