//! Attendance repository for marking and reporting operations.

use chrono::{NaiveDate, Utc};
use sea_orm::*;

use crate::entities::sea_orm_active_enums::AttendanceStatus;
use crate::entities::{attendance, employees, prelude::*};
use crate::models::attendance::AttendanceUpdate;

/// Optional filters for the global attendance list.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceFilter {
    pub employee_id: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Totals for one employee over a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub total: u64,
    pub present: u64,
    pub absent: u64,
}

fn in_range(
    mut query: Select<Attendance>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> Select<Attendance> {
    if let Some(from) = date_from {
        query = query.filter(attendance::Column::Date.gte(from));
    }
    if let Some(to) = date_to {
        query = query.filter(attendance::Column::Date.lte(to));
    }
    query
}

/// List one employee's attendance, newest date first.
pub async fn list_for_employee(
    db: &DatabaseConnection,
    employee_id: i32,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    limit: u64,
    offset: u64,
) -> Result<(Vec<attendance::Model>, u64), DbErr> {
    let query = in_range(
        Attendance::find().filter(attendance::Column::EmployeeId.eq(employee_id)),
        date_from,
        date_to,
    );

    let total = query.clone().count(db).await?;
    let items = query
        .order_by_desc(attendance::Column::Date)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok((items, total))
}

/// List attendance across all employees, joined with the employee record.
pub async fn list_all(
    db: &DatabaseConnection,
    filter: AttendanceFilter,
    limit: u64,
    offset: u64,
) -> Result<(Vec<(attendance::Model, employees::Model)>, u64), DbErr> {
    let query = filtered(filter);

    let total = query.clone().count(db).await?;
    let rows = query
        .find_also_related(Employees)
        .order_by_desc(attendance::Column::Date)
        .order_by_desc(attendance::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok((with_employee(rows), total))
}

/// Every matching record for export, oldest date first, then by employee code.
pub async fn export_rows(
    db: &DatabaseConnection,
    filter: AttendanceFilter,
) -> Result<Vec<(attendance::Model, employees::Model)>, DbErr> {
    let rows = filtered(filter)
        .find_also_related(Employees)
        .order_by_asc(attendance::Column::Date)
        .order_by_asc(employees::Column::EmployeeId)
        .all(db)
        .await?;

    Ok(with_employee(rows))
}

fn filtered(filter: AttendanceFilter) -> Select<Attendance> {
    let mut query = in_range(Attendance::find(), filter.date_from, filter.date_to);
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(attendance::Column::EmployeeId.eq(employee_id));
    }
    query
}

// The foreign key guarantees the employee exists; the join still yields an Option.
fn with_employee(
    rows: Vec<(attendance::Model, Option<employees::Model>)>,
) -> Vec<(attendance::Model, employees::Model)> {
    rows.into_iter()
        .filter_map(|(record, employee)| employee.map(|e| (record, e)))
        .collect()
}

/// Get an attendance record that belongs to the given employee.
pub async fn get_for_employee(
    db: &DatabaseConnection,
    employee_id: i32,
    attendance_id: i32,
) -> Result<Option<attendance::Model>, DbErr> {
    Attendance::find_by_id(attendance_id)
        .filter(attendance::Column::EmployeeId.eq(employee_id))
        .one(db)
        .await
}

/// Record attendance for an employee on a date.
///
/// Fails with a unique-constraint violation when the date is already marked.
pub async fn create(
    db: &DatabaseConnection,
    employee_id: i32,
    date: NaiveDate,
    status: AttendanceStatus,
    actor_id: Option<i32>,
) -> Result<attendance::Model, DbErr> {
    let now = Utc::now();
    let model = attendance::ActiveModel {
        employee_id: Set(employee_id),
        date: Set(date),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
        created_by_id: Set(actor_id),
        updated_by_id: Set(actor_id),
        ..Default::default()
    };
    model.insert(db).await
}

/// Update date and/or status of an existing record.
pub async fn update(
    db: &DatabaseConnection,
    existing: attendance::Model,
    data: AttendanceUpdate,
    actor_id: Option<i32>,
) -> Result<attendance::Model, DbErr> {
    let mut active: attendance::ActiveModel = existing.into();

    if let Some(date) = data.date {
        active.date = Set(date);
    }
    if let Some(status) = data.status {
        active.status = Set(status);
    }
    active.updated_by_id = Set(actor_id);
    active.updated_at = Set(Utc::now());

    active.update(db).await
}

/// Insert or update the record for (employee, date).
///
/// Returns the stored record and whether it was newly created.
pub async fn upsert_for_date(
    db: &DatabaseConnection,
    employee_id: i32,
    date: NaiveDate,
    status: AttendanceStatus,
    actor_id: Option<i32>,
) -> Result<(attendance::Model, bool), DbErr> {
    if let Some(existing) = find_on_date(db, employee_id, date).await? {
        let updated = set_status(db, existing, status, actor_id).await?;
        return Ok((updated, false));
    }

    match create(db, employee_id, date, status, actor_id).await {
        Ok(created) => Ok((created, true)),
        // Another request marked the same day between our read and insert.
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            let existing = find_on_date(db, employee_id, date)
                .await?
                .ok_or(err)?;
            let updated = set_status(db, existing, status, actor_id).await?;
            Ok((updated, false))
        }
        Err(err) => Err(err),
    }
}

async fn find_on_date(
    db: &DatabaseConnection,
    employee_id: i32,
    date: NaiveDate,
) -> Result<Option<attendance::Model>, DbErr> {
    Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(employee_id))
        .filter(attendance::Column::Date.eq(date))
        .one(db)
        .await
}

async fn set_status(
    db: &DatabaseConnection,
    existing: attendance::Model,
    status: AttendanceStatus,
    actor_id: Option<i32>,
) -> Result<attendance::Model, DbErr> {
    update(
        db,
        existing,
        AttendanceUpdate {
            date: None,
            status: Some(status),
        },
        actor_id,
    )
    .await
}

/// Delete a record by ID.
pub async fn delete(db: &DatabaseConnection, attendance_id: i32) -> Result<bool, DbErr> {
    let result = Attendance::delete_by_id(attendance_id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Present/absent totals for one employee.
pub async fn summary(
    db: &DatabaseConnection,
    employee_id: i32,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> Result<StatusCounts, DbErr> {
    let base = in_range(
        Attendance::find().filter(attendance::Column::EmployeeId.eq(employee_id)),
        date_from,
        date_to,
    );

    let total = base.clone().count(db).await?;
    let present = base
        .clone()
        .filter(attendance::Column::Status.eq(AttendanceStatus::Present))
        .count(db)
        .await?;
    let absent = base
        .filter(attendance::Column::Status.eq(AttendanceStatus::Absent))
        .count(db)
        .await?;

    Ok(StatusCounts { total, present, absent })
}

/// `(date, status)` pairs in a range, optionally for a single employee.
pub async fn status_rows(
    db: &DatabaseConnection,
    date_from: NaiveDate,
    date_to: NaiveDate,
    employee_id: Option<i32>,
) -> Result<Vec<(NaiveDate, AttendanceStatus)>, DbErr> {
    let mut query = in_range(Attendance::find(), Some(date_from), Some(date_to));
    if let Some(employee_id) = employee_id {
        query = query.filter(attendance::Column::EmployeeId.eq(employee_id));
    }

    query
        .select_only()
        .column(attendance::Column::Date)
        .column(attendance::Column::Status)
        .into_tuple()
        .all(db)
        .await
}

/// Get total attendance record count.
pub async fn count_all(db: &DatabaseConnection) -> Result<u64, DbErr> {
    Attendance::find().count(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::employee as employee_repo;
    use crate::db::test_support::memory_db;
    use crate::models::employee::EmployeeCreate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
    }

    async fn employee(db: &DatabaseConnection, email: &str) -> employees::Model {
        employee_repo::create(
            db,
            EmployeeCreate {
                full_name: "Test Person".into(),
                email: email.into(),
                department: "Ops".into(),
            },
            None,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_one_record_per_day() {
        let db = memory_db().await;
        let emp = employee(&db, "a@hrms.com").await;

        create(&db, emp.id, day(3), AttendanceStatus::Present, None).await.unwrap();
        let err = create(&db, emp.id, day(3), AttendanceStatus::Absent, None)
            .await
            .unwrap_err();
        assert!(matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let db = memory_db().await;
        let emp = employee(&db, "a@hrms.com").await;

        let (first, created) = upsert_for_date(&db, emp.id, day(4), AttendanceStatus::Absent, None)
            .await
            .unwrap();
        assert!(created);

        let (second, created) = upsert_for_date(&db, emp.id, day(4), AttendanceStatus::Present, None)
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.status, AttendanceStatus::Present);
        assert_eq!(count_all(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_for_employee_range_and_order() {
        let db = memory_db().await;
        let emp = employee(&db, "a@hrms.com").await;
        for d in 1..=5 {
            create(&db, emp.id, day(d), AttendanceStatus::Present, None).await.unwrap();
        }

        let (items, total) = list_for_employee(&db, emp.id, Some(day(2)), Some(day(4)), 20, 0)
            .await
            .unwrap();
        assert_eq!(total, 3);
        let dates: Vec<NaiveDate> = items.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(4), day(3), day(2)]);
    }

    #[tokio::test]
    async fn test_list_all_joins_employee() {
        let db = memory_db().await;
        let a = employee(&db, "a@hrms.com").await;
        let b = employee(&db, "b@hrms.com").await;
        create(&db, a.id, day(1), AttendanceStatus::Present, None).await.unwrap();
        create(&db, b.id, day(1), AttendanceStatus::Absent, None).await.unwrap();
        create(&db, b.id, day(2), AttendanceStatus::Present, None).await.unwrap();

        let (rows, total) = list_all(&db, AttendanceFilter::default(), 20, 0).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows[0].0.date, day(2));
        assert_eq!(rows[0].1.email, "b@hrms.com");

        let filter = AttendanceFilter {
            employee_id: Some(a.id),
            ..Default::default()
        };
        let (rows, total) = list_all(&db, filter, 20, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].1.id, a.id);
    }

    #[tokio::test]
    async fn test_export_rows_ordered_oldest_first() {
        let db = memory_db().await;
        let a = employee(&db, "a@hrms.com").await;
        let b = employee(&db, "b@hrms.com").await;
        create(&db, b.id, day(2), AttendanceStatus::Present, None).await.unwrap();
        create(&db, a.id, day(2), AttendanceStatus::Absent, None).await.unwrap();
        create(&db, a.id, day(1), AttendanceStatus::Present, None).await.unwrap();

        let rows = export_rows(&db, AttendanceFilter::default()).await.unwrap();
        let order: Vec<(NaiveDate, String)> = rows
            .iter()
            .map(|(r, e)| (r.date, e.employee_id.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                (day(1), "EMP-001".to_string()),
                (day(2), "EMP-001".to_string()),
                (day(2), "EMP-002".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let db = memory_db().await;
        let emp = employee(&db, "a@hrms.com").await;
        create(&db, emp.id, day(1), AttendanceStatus::Present, None).await.unwrap();
        create(&db, emp.id, day(2), AttendanceStatus::Absent, None).await.unwrap();
        create(&db, emp.id, day(3), AttendanceStatus::Present, None).await.unwrap();

        let counts = summary(&db, emp.id, None, None).await.unwrap();
        assert_eq!(counts, StatusCounts { total: 3, present: 2, absent: 1 });

        let counts = summary(&db, emp.id, Some(day(2)), None).await.unwrap();
        assert_eq!(counts, StatusCounts { total: 2, present: 1, absent: 1 });
    }

    #[tokio::test]
    async fn test_get_for_employee_checks_owner() {
        let db = memory_db().await;
        let a = employee(&db, "a@hrms.com").await;
        let b = employee(&db, "b@hrms.com").await;
        let record = create(&db, a.id, day(1), AttendanceStatus::Present, None).await.unwrap();

        assert!(get_for_employee(&db, a.id, record.id).await.unwrap().is_some());
        assert!(get_for_employee(&db, b.id, record.id).await.unwrap().is_none());
    }
}
