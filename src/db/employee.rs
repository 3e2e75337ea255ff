//! Employee repository with CRUD operations.

use chrono::Utc;
use sea_orm::*;

use super::contains_ci;
use crate::entities::{attendance, employees, prelude::*};
use crate::models::employee::{EmployeeCreate, EmployeeUpdate};
use crate::models::validate::normalize_email;

/// Format an employee code from a numeric sequence value: `EMP-001`, `EMP-1234`.
pub fn format_code(seq: i32) -> String {
    format!("EMP-{seq:03}")
}

/// List employees in insertion order, optionally filtered by code, name, email or department.
pub async fn list(
    db: &DatabaseConnection,
    limit: u64,
    offset: u64,
    search: Option<&str>,
) -> Result<(Vec<employees::Model>, u64), DbErr> {
    let mut query = Employees::find();

    if let Some(term) = search {
        query = query.filter(
            Condition::any()
                .add(contains_ci(employees::Column::EmployeeId, term))
                .add(contains_ci(employees::Column::FullName, term))
                .add(contains_ci(employees::Column::Email, term))
                .add(contains_ci(employees::Column::Department, term)),
        );
    }

    let total = query.clone().count(db).await?;
    let items = query
        .order_by_asc(employees::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok((items, total))
}

/// Get employee by ID.
pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<employees::Model>, DbErr> {
    Employees::find_by_id(id).one(db).await
}

/// Get employee by code (`EMP-001`).
pub async fn get_by_code(db: &DatabaseConnection, code: &str) -> Result<Option<employees::Model>, DbErr> {
    Employees::find()
        .filter(employees::Column::EmployeeId.eq(code))
        .one(db)
        .await
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<employees::Model>, DbErr> {
    Employees::find()
        .filter(employees::Column::Email.eq(email))
        .one(db)
        .await
}

/// Next employee code, derived from the highest ID in use.
pub async fn next_code(db: &DatabaseConnection) -> Result<String, DbErr> {
    let max_id: Option<Option<i32>> = Employees::find()
        .select_only()
        .column_as(employees::Column::Id.max(), "max_id")
        .into_tuple()
        .one(db)
        .await?;

    let last = max_id.flatten().unwrap_or(0);
    Ok(format_code(last + 1))
}

/// Create a new employee with a generated code.
pub async fn create(
    db: &DatabaseConnection,
    data: EmployeeCreate,
    actor_id: Option<i32>,
) -> Result<employees::Model, DbErr> {
    let code = next_code(db).await?;
    let now = Utc::now();

    let model = employees::ActiveModel {
        employee_id: Set(code),
        full_name: Set(data.full_name.trim().to_string()),
        email: Set(normalize_email(&data.email)),
        department: Set(data.department.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        created_by_id: Set(actor_id),
        updated_by_id: Set(actor_id),
        ..Default::default()
    };
    model.insert(db).await
}

/// Update an existing employee.
pub async fn update(
    db: &DatabaseConnection,
    existing: employees::Model,
    data: EmployeeUpdate,
    actor_id: Option<i32>,
) -> Result<employees::Model, DbErr> {
    let mut active: employees::ActiveModel = existing.into();

    if let Some(full_name) = data.full_name {
        active.full_name = Set(full_name.trim().to_string());
    }
    if let Some(email) = data.email {
        active.email = Set(normalize_email(&email));
    }
    if let Some(department) = data.department {
        active.department = Set(department.trim().to_string());
    }
    active.updated_by_id = Set(actor_id);
    active.updated_at = Set(Utc::now());

    active.update(db).await
}

/// Delete an employee and their attendance records.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let txn = db.begin().await?;

    Attendance::delete_many()
        .filter(attendance::Column::EmployeeId.eq(id))
        .exec(&txn)
        .await?;
    let result = Employees::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(result.rows_affected > 0)
}

/// Get total employee count.
pub async fn count_all(db: &DatabaseConnection) -> Result<u64, DbErr> {
    Employees::find().count(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::attendance as attendance_repo;
    use crate::db::test_support::memory_db;
    use crate::entities::sea_orm_active_enums::AttendanceStatus;
    use chrono::NaiveDate;

    fn payload(name: &str, email: &str, department: &str) -> EmployeeCreate {
        EmployeeCreate {
            full_name: name.to_string(),
            email: email.to_string(),
            department: department.to_string(),
        }
    }

    #[test]
    fn test_format_code() {
        assert_eq!(format_code(1), "EMP-001");
        assert_eq!(format_code(42), "EMP-042");
        assert_eq!(format_code(1234), "EMP-1234");
    }

    #[tokio::test]
    async fn test_codes_follow_max_id() {
        let db = memory_db().await;
        assert_eq!(next_code(&db).await.unwrap(), "EMP-001");

        let first = create(&db, payload("Ava Patel", "Ava.Patel@hrms.com ", "Engineering"), None)
            .await
            .unwrap();
        assert_eq!(first.employee_id, "EMP-001");
        assert_eq!(first.email, "ava.patel@hrms.com");

        let second = create(&db, payload("Noah Kim", "noah@hrms.com", "HR"), None)
            .await
            .unwrap();
        assert_eq!(second.employee_id, "EMP-002");

        assert!(get_by_code(&db, "EMP-002").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = memory_db().await;
        create(&db, payload("A", "same@hrms.com", "HR"), None).await.unwrap();
        let err = create(&db, payload("B", "same@hrms.com", "HR"), None).await.unwrap_err();
        assert!(matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_search_matches_any_column() {
        let db = memory_db().await;
        create(&db, payload("Ava Patel", "ava@hrms.com", "Engineering"), None).await.unwrap();
        create(&db, payload("Noah Kim", "noah@hrms.com", "HR"), None).await.unwrap();
        create(&db, payload("Liam Chen", "liam@hrms.com", "Finance"), None).await.unwrap();

        let (items, total) = list(&db, 20, 0, Some("engineer")).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].full_name, "Ava Patel");

        let (_, total) = list(&db, 20, 0, Some("emp-00")).await.unwrap();
        assert_eq!(total, 3);

        let (_, total) = list(&db, 20, 0, Some("%")).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_delete_removes_attendance() {
        let db = memory_db().await;
        let employee = create(&db, payload("Ava", "ava@hrms.com", "Eng"), None).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        attendance_repo::create(&db, employee.id, date, AttendanceStatus::Present, None)
            .await
            .unwrap();

        assert!(delete(&db, employee.id).await.unwrap());
        assert_eq!(Attendance::find().count(&db).await.unwrap(), 0);
        assert!(!delete(&db, employee.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_trims_and_tracks_actor() {
        let db = memory_db().await;
        let employee = create(&db, payload("Ava", "ava@hrms.com", "Eng"), None).await.unwrap();
        let patch = EmployeeUpdate {
            department: Some("  Platform ".into()),
            ..Default::default()
        };
        let updated = update(&db, employee, patch, None).await.unwrap();
        assert_eq!(updated.department, "Platform");
        assert_eq!(updated.full_name, "Ava");
    }
}
