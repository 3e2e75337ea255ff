//! Dashboard aggregates: daily overview and per-day attendance buckets.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::*;

use super::{attendance as attendance_repo, employee as employee_repo};
use crate::entities::sea_orm_active_enums::AttendanceStatus;
use crate::entities::{attendance, prelude::*};
use crate::models::{AttendanceStatsPoint, OverviewStats};

/// Longest range the chart endpoint accepts, in days.
pub const MAX_STATS_SPAN_DAYS: i64 = 366;

async fn count_on(db: &DatabaseConnection, date: NaiveDate, status: AttendanceStatus) -> Result<u64, DbErr> {
    Attendance::find()
        .filter(attendance::Column::Date.eq(date))
        .filter(attendance::Column::Status.eq(status))
        .count(db)
        .await
}

/// Headcount split for one day.
pub async fn overview(db: &DatabaseConnection, date: NaiveDate) -> Result<OverviewStats, DbErr> {
    let total_employees = employee_repo::count_all(db).await?;
    let present = count_on(db, date, AttendanceStatus::Present).await?;
    let absent = count_on(db, date, AttendanceStatus::Absent).await?;

    Ok(OverviewStats {
        date,
        total_employees,
        present,
        absent,
        unmarked: total_employees.saturating_sub(present + absent),
    })
}

/// Group `(date, status)` rows into one point per calendar day in `[from, to]`.
///
/// Rows outside the range are ignored. `total_employees` is the headcount each
/// day is measured against; `unmarked` never goes below zero.
pub fn bucket_daily(
    from: NaiveDate,
    to: NaiveDate,
    rows: &[(NaiveDate, AttendanceStatus)],
    total_employees: u64,
) -> Vec<AttendanceStatsPoint> {
    let mut counts: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for (date, status) in rows {
        if *date < from || *date > to {
            continue;
        }
        let entry = counts.entry(*date).or_default();
        match status {
            AttendanceStatus::Present => entry.0 += 1,
            AttendanceStatus::Absent => entry.1 += 1,
        }
    }

    let mut points = Vec::new();
    for day in from.iter_days().take_while(|day| *day <= to) {
        let (present, absent) = counts.get(&day).copied().unwrap_or_default();
        points.push(AttendanceStatsPoint {
            date: day,
            present,
            absent,
            unmarked: total_employees.saturating_sub(present + absent),
        });
    }
    points
}

/// Per-day chart for all employees or a single one.
///
/// When `employee_id` is set the headcount is 1. Callers check the range
/// and the employee's existence first.
pub async fn attendance_stats(
    db: &DatabaseConnection,
    from: NaiveDate,
    to: NaiveDate,
    employee_id: Option<i32>,
) -> Result<(Vec<AttendanceStatsPoint>, u64), DbErr> {
    let total_employees = match employee_id {
        Some(_) => 1,
        None => employee_repo::count_all(db).await?,
    };
    let rows = attendance_repo::status_rows(db, from, to, employee_id).await?;
    Ok((bucket_daily(from, to, &rows, total_employees), total_employees))
}
