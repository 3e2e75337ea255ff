use axum::extract::State;
use chrono::Local;

use super::{ApiResult, ok};
use crate::api::extract::ApiQuery;
use crate::api::state::AppState;
use crate::auth::RequireStaff;
use crate::db::stats as stats_repo;
use crate::models::OverviewStats;
use crate::models::query::OverviewQuery;

pub async fn overview(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ApiQuery(query): ApiQuery<OverviewQuery>,
) -> ApiResult<OverviewStats> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let stats = stats_repo::overview(&state.db, date).await?;
    Ok(ok(stats, "Stats fetched"))
}
