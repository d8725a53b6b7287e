use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;

use super::auth::MaybeUser;
use super::{ApiError, ApiResponse, AppState, ReportQuery};
use crate::services::{AcceptedSolutionsReport, ReportParams};

/// Days covered when no `start_date` is given.
const DEFAULT_REPORT_DAYS: i64 = 30;

/// GET /api/reports/accepted_solutions
///
/// Staff only. Dates are `YYYY-MM-DD`; the range defaults to the last 30 days.
pub async fn accepted_solutions(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<AcceptedSolutionsReport>>, ApiError> {
    if !user.is_some_and(|u| u.is_staff()) {
        return Err(ApiError::forbidden());
    }

    let today = Utc::now().date_naive();
    let end_date = parse_date(query.end_date.as_deref(), "end_date")?.unwrap_or(today);
    let start_date = parse_date(query.start_date.as_deref(), "start_date")?
        .unwrap_or(end_date - Duration::days(DEFAULT_REPORT_DAYS));

    let report = state
        .shared
        .reports
        .accepted_solutions(&ReportParams {
            start_date,
            end_date,
            category_id: query.category_id,
            include_subcategories: query.include_subcategories,
        })
        .await?;

    Ok(Json(ApiResponse::success(report)))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ApiError> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map_err(|_| ApiError::validation(format!("Invalid {field}: {v}")))
        })
        .transpose()
}
