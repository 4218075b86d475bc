//! Special dates and festival endpoints.

use axum::extract::{Query, State};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::calendar;
use crate::errors::AppError;
use crate::models::{CategoryInfo, DateCategory, FestivalOption, SpecialDate, UpcomingDate};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SpecialDateQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    /// Reference day `YYYY-MM-DD`; today (UTC) when absent
    #[serde(default)]
    pub from: Option<String>,
}

/// GET /api/special-dates - All special dates, optionally by category or month.
pub async fn list_special_dates(
    State(state): State<AppState>,
    Query(params): Query<SpecialDateQuery>,
) -> ApiResult<Vec<SpecialDate>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let mut dates: Vec<SpecialDate> = calendar::special_dates().to_vec();

    if let Some(raw) = params.category.as_deref().filter(|c| !c.trim().is_empty()) {
        let Some(category) = DateCategory::from_str(raw) else {
            return error(
                AppError::Validation(format!("Unknown category {:?}", raw)),
                revision_id,
            );
        };
        dates = calendar::get_dates_by_category(category);
    }

    if let Some(month) = params.month {
        if !(1..=12).contains(&month) {
            return error(
                AppError::Validation("Month must be between 1 and 12".to_string()),
                revision_id,
            );
        }
        let in_month = calendar::get_dates_by_month(month);
        dates.retain(|d| in_month.iter().any(|m| m.id == d.id));
    }

    success(dates, revision_id)
}

/// GET /api/special-dates/upcoming - The next special dates.
pub async fn list_upcoming_dates(
    State(state): State<AppState>,
    Query(params): Query<UpcomingQuery>,
) -> ApiResult<Vec<UpcomingDate>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let today = match params.from.as_deref() {
        Some(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(day) => day,
            Err(_) => {
                return error(
                    AppError::Validation(format!("Invalid date {:?}, expected YYYY-MM-DD", raw)),
                    revision_id,
                )
            }
        },
        None => Utc::now().date_naive(),
    };
    let limit = params.limit.unwrap_or(calendar::DEFAULT_UPCOMING_LIMIT);

    success(calendar::get_upcoming_dates(today, limit), revision_id)
}

/// GET /api/special-dates/categories - Category labels and colours.
pub async fn list_date_categories(State(state): State<AppState>) -> ApiResult<Vec<CategoryInfo>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(calendar::categories(), revision_id)
}

/// GET /api/festivals - Festival tags for the admin product form.
pub async fn list_festivals(State(state): State<AppState>) -> ApiResult<Vec<FestivalOption>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(calendar::festival_options(), revision_id)
}
