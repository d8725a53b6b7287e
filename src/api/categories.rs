use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::MaybeUser;
use super::{ApiError, ApiResponse, AppState};
use crate::models::category::{Category, CategorySolvedSettings};

/// PUT /api/categories/{id}/solved_settings
///
/// Staff only. Saving refreshes the set of categories with accepted answers enabled.
pub async fn update_solved_settings(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i32>,
    Json(settings): Json<CategorySolvedSettings>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    if !user.is_some_and(|u| u.is_staff()) {
        return Err(ApiError::forbidden());
    }

    let category = state
        .shared
        .categories
        .update_solved_settings(id, &settings)
        .await?;

    Ok(Json(ApiResponse::success(category)))
}
