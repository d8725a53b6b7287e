use axum::{
    Json,
    extract::{Query, State},
};
use sea_orm::Condition;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SearchQuery, SearchResultDto};
use crate::constants::limits::MAX_SEARCH_RESULTS;
use crate::services::query_filters::parse_search_status;

/// GET /api/search?q=
///
/// Plain substring search over posts. A `status:solved` or `status:unsolved` term
/// restricts the topics searched.
pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<SearchResultDto>>>, ApiError> {
    let (filter, term) = parse_search_status(&query.q);
    if term.is_empty() {
        return Err(ApiError::validation("Search term must not be empty"));
    }

    let solved = state.config().read().await.solved.clone();
    let condition = match filter {
        Some(filter) if solved.enabled => {
            state.shared.query_filters.condition_for(&solved, filter).await?
        }
        _ => Condition::all(),
    };

    let hits = state
        .store()
        .posts()
        .search(&term, condition, MAX_SEARCH_RESULTS)
        .await?;

    let mut results = Vec::with_capacity(hits.len());
    for hit in hits {
        let status = state.acceptance().status(hit.topic_id).await?;
        results.push(SearchResultDto {
            post_id: hit.post_id,
            topic_id: hit.topic_id,
            post_number: hit.post_number,
            title: hit.title,
            has_accepted_answer: status.is_solved(),
        });
    }

    Ok(Json(ApiResponse::success(results)))
}
