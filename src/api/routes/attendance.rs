//! Attendance per employee plus the global list and chart.

use axum::extract::State;
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;

use super::employees::load as load_employee;
use super::{ApiResult, Created, EMPLOYEE_NOT_FOUND, NO_FIELDS, created, ok, ok_with_meta};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::AppState;
use crate::auth::{RequireAdmin, RequireStaff};
use crate::db::attendance::{self as attendance_repo, AttendanceFilter};
use crate::db::employee as employee_repo;
use crate::db::stats::{self as stats_repo, MAX_STATS_SPAN_DAYS};
use crate::entities::attendance;
use crate::error::{AppError, Result, conflict_on_unique};
use crate::models::query::{AttendanceListQuery, AttendanceQuery, DateRangeQuery, StatsQuery};
use crate::models::stats::StatsMeta;
use crate::models::{
    AttendanceCreate, AttendanceListItem, AttendanceRead, AttendanceStatsPoint, AttendanceSummary,
    AttendanceTodayUpsert, AttendanceUpdate, PageMeta, StatusPayload,
};

const ATTENDANCE_NOT_FOUND: &str = "Attendance not found.";
const ATTENDANCE_EXISTS: &str = "Attendance for this employee and date already exists.";

async fn load_record(state: &AppState, employee_id: i32, attendance_id: i32) -> Result<attendance::Model> {
    load_employee(state, employee_id).await?;
    attendance_repo::get_for_employee(&state.db, employee_id, attendance_id)
        .await?
        .ok_or_else(|| AppError::not_found(ATTENDANCE_NOT_FOUND))
}

pub async fn list_for_employee(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ApiPath(employee_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<AttendanceQuery>,
) -> ApiResult<Vec<AttendanceRead>> {
    load_employee(&state, employee_id).await?;

    let (items, total) = attendance_repo::list_for_employee(
        &state.db,
        employee_id,
        query.date_from,
        query.date_to,
        query.limit(),
        query.offset(),
    )
    .await?;
    let items: Vec<AttendanceRead> = items.into_iter().map(AttendanceRead::from).collect();
    let meta = PageMeta {
        total,
        limit: query.limit(),
        offset: query.offset(),
        q: None,
    };

    Ok(ok_with_meta(items, "Attendance fetched", meta))
}

pub async fn summary(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ApiPath(employee_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<DateRangeQuery>,
) -> ApiResult<AttendanceSummary> {
    let employee = load_employee(&state, employee_id).await?;
    let counts = attendance_repo::summary(&state.db, employee.id, query.date_from, query.date_to).await?;

    Ok(ok(
        AttendanceSummary {
            employee_id: employee.id,
            employee_code: employee.employee_id,
            total_records: counts.total,
            total_present: counts.present,
            total_absent: counts.absent,
        },
        "Attendance summary fetched",
    ))
}

pub async fn get(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ApiPath((employee_id, attendance_id)): ApiPath<(i32, i32)>,
) -> ApiResult<AttendanceRead> {
    let record = load_record(&state, employee_id, attendance_id).await?;
    Ok(ok(AttendanceRead::from(record), "Attendance fetched"))
}

pub async fn create(
    State(state): State<AppState>,
    RequireStaff(actor): RequireStaff,
    ApiPath(employee_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<AttendanceCreate>,
) -> Created<AttendanceRead> {
    load_employee(&state, employee_id).await?;

    let record = attendance_repo::create(&state.db, employee_id, payload.date, payload.status, Some(actor.id))
        .await
        .map_err(|e| conflict_on_unique(e, ATTENDANCE_EXISTS))?;

    Ok(created(AttendanceRead::from(record), "Attendance created"))
}

/// Mark today's attendance, creating or overwriting the day's record.
pub async fn upsert_today(
    State(state): State<AppState>,
    RequireStaff(actor): RequireStaff,
    ApiPath(employee_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<AttendanceTodayUpsert>,
) -> ApiResult<AttendanceRead> {
    load_employee(&state, employee_id).await?;

    let today = Local::now().date_naive();
    let (record, was_created) =
        attendance_repo::upsert_for_date(&state.db, employee_id, today, payload.status, Some(actor.id)).await?;
    tracing::debug!(employee_id, %today, was_created, "attendance marked");

    Ok(ok(AttendanceRead::from(record), "Attendance marked"))
}

pub async fn update(
    State(state): State<AppState>,
    RequireStaff(actor): RequireStaff,
    ApiPath((employee_id, attendance_id)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<AttendanceUpdate>,
) -> ApiResult<AttendanceRead> {
    let record = load_record(&state, employee_id, attendance_id).await?;
    if payload.is_empty() {
        return Err(AppError::bad_request(NO_FIELDS));
    }

    let record = attendance_repo::update(&state.db, record, payload, Some(actor.id))
        .await
        .map_err(|e| conflict_on_unique(e, ATTENDANCE_EXISTS))?;

    Ok(ok(AttendanceRead::from(record), "Attendance updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ApiPath((employee_id, attendance_id)): ApiPath<(i32, i32)>,
) -> ApiResult<StatusPayload> {
    let record = load_record(&state, employee_id, attendance_id).await?;
    attendance_repo::delete(&state.db, record.id).await?;
    Ok(ok(StatusPayload::new("deleted"), "Attendance deleted"))
}

/// Paging meta for the global list; echoes the filters that were applied.
#[derive(Debug, Serialize)]
struct AttendanceListMeta {
    total: u64,
    limit: u64,
    offset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    employee_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_to: Option<NaiveDate>,
}

pub async fn list_all(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ApiQuery(query): ApiQuery<AttendanceListQuery>,
) -> ApiResult<Vec<AttendanceListItem>> {
    let filter = AttendanceFilter {
        employee_id: query.employee_id,
        date_from: query.date_from,
        date_to: query.date_to,
    };
    let (rows, total) = attendance_repo::list_all(&state.db, filter, query.limit(), query.offset()).await?;
    let items: Vec<AttendanceListItem> = rows
        .into_iter()
        .map(|(record, employee)| AttendanceListItem::new(record, &employee))
        .collect();
    let meta = AttendanceListMeta {
        total,
        limit: query.limit(),
        offset: query.offset(),
        employee_id: query.employee_id,
        date_from: query.date_from,
        date_to: query.date_to,
    };

    Ok(ok_with_meta(items, "Attendance fetched", meta))
}

/// Resolve the chart range: first of the month through today unless given.
pub fn stats_range(
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let from = date_from.unwrap_or_else(|| today.with_day(1).unwrap_or(today));
    let to = date_to.unwrap_or(today);

    if from > to {
        return Err(AppError::bad_request("date_from must be on or before date_to."));
    }
    if to - from >= Duration::days(MAX_STATS_SPAN_DAYS) {
        return Err(AppError::bad_request(format!(
            "Date range must not exceed {MAX_STATS_SPAN_DAYS} days."
        )));
    }
    Ok((from, to))
}

pub async fn stats(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> ApiResult<Vec<AttendanceStatsPoint>> {
    let (from, to) = stats_range(query.date_from, query.date_to, Local::now().date_naive())?;

    if let Some(employee_id) = query.employee_id
        && employee_repo::get_by_id(&state.db, employee_id).await?.is_none()
    {
        return Err(AppError::not_found(EMPLOYEE_NOT_FOUND));
    }

    let (points, total_employees) = stats_repo::attendance_stats(&state.db, from, to, query.employee_id).await?;
    let meta = StatsMeta {
        date_from: from,
        date_to: to,
        total_employees,
        employee_id: query.employee_id,
    };

    Ok(ok_with_meta(points, "Attendance stats fetched", meta))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn test_stats_range_defaults_to_month_to_date() {
        let (from, to) = stats_range(None, None, date(4, 17)).unwrap();
        assert_eq!(from, date(4, 1));
        assert_eq!(to, date(4, 17));
    }

    #[test]
    fn test_stats_range_rejects_inverted() {
        let err = stats_range(Some(date(5, 2)), Some(date(5, 1)), date(6, 1)).unwrap_err();
        assert_eq!(err.to_string(), "date_from must be on or before date_to.");
    }

    #[test]
    fn test_stats_range_span_limit() {
        let from = date(1, 1);
        assert!(stats_range(Some(from), Some(from + Duration::days(365)), from).is_ok());
        assert!(stats_range(Some(from), Some(from + Duration::days(366)), from).is_err());
    }
}
