use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, PaginationQuery};
use crate::models::solution::SolvedPost;
use crate::services::UserSolvedSummary;

/// GET /api/users/{username}/summary
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<UserSolvedSummary>>, ApiError> {
    let summary = state.shared.reports.user_summary(&username).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// GET /api/solution/by_user/{username}?offset&limit
pub async fn solved_posts(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<SolvedPost>>>, ApiError> {
    let quote_length = state.config().read().await.solved.solved_quote_length;
    let posts = state
        .shared
        .reports
        .solved_posts(&username, page.offset, page.limit, quote_length)
        .await?;

    Ok(Json(ApiResponse::success(posts)))
}
