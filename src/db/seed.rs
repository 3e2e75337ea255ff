//! Demo data for local development. Safe to run repeatedly.

use chrono::{Duration, Local};
use sea_orm::*;

use super::admin::{self as admin_repo, AdminChanges, NewAdmin};
use super::{attendance as attendance_repo, employee as employee_repo};
use crate::auth::password::hash_password;
use crate::entities::prelude::*;
use crate::entities::sea_orm_active_enums::{AttendanceStatus, Role};
use crate::error::Result;
use crate::models::EmployeeCreate;

pub const SEED_ADMIN_EMAIL: &str = "admin@hrms.com";
pub const SEED_ADMIN_PASSWORD: &str = "admin1234";
const SEED_ADMIN_NAME: &str = "HR Admin";
const SEED_DAYS: i64 = 3;

const SEED_EMPLOYEES: [(&str, &str, &str); 3] = [
    ("Ava Patel", "ava.patel@hrms.com", "Engineering"),
    ("Noah Kim", "noah.kim@hrms.com", "HR"),
    ("Liam Chen", "liam.chen@hrms.com", "Finance"),
];

/// What a seed run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub admin_reset: bool,
    pub employees_created: usize,
    pub attendance_created: usize,
}

/// Create the seed admin, employees and recent attendance where missing.
///
/// `reset_admin` restores the seed admin's password.
pub async fn seed(db: &DatabaseConnection, reset_admin: bool) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let admin = match admin_repo::find_by_email(db, SEED_ADMIN_EMAIL).await? {
        Some(admin) => admin,
        None => {
            report.admin_created = true;
            admin_repo::create(
                db,
                NewAdmin {
                    name: Some(SEED_ADMIN_NAME.to_string()),
                    email: SEED_ADMIN_EMAIL.to_string(),
                    password_hash: hash_password(SEED_ADMIN_PASSWORD)?,
                    role: Role::Admin,
                },
                None,
            )
            .await?
        }
    };

    let mut changes = AdminChanges::default();
    if admin.name.is_none() {
        changes.name = Some(Some(SEED_ADMIN_NAME.to_string()));
    }
    if reset_admin && !report.admin_created {
        changes.password_hash = Some(hash_password(SEED_ADMIN_PASSWORD)?);
        report.admin_reset = true;
    }
    let admin_id = admin.id;
    if changes.name.is_some() || changes.password_hash.is_some() {
        admin_repo::update(db, admin, changes, admin_id).await?;
    }

    if employee_repo::count_all(db).await? == 0 {
        for (full_name, email, department) in SEED_EMPLOYEES {
            let payload = EmployeeCreate {
                full_name: full_name.to_string(),
                email: email.to_string(),
                department: department.to_string(),
            };
            employee_repo::create(db, payload, Some(admin_id)).await?;
            report.employees_created += 1;
        }
    }

    if attendance_repo::count_all(db).await? == 0 {
        let today = Local::now().date_naive();
        for employee in Employees::find().all(db).await? {
            for offset in 0..SEED_DAYS {
                let status = if offset % 2 == 0 {
                    AttendanceStatus::Present
                } else {
                    AttendanceStatus::Absent
                };
                let date = today - Duration::days(offset);
                attendance_repo::create(db, employee.id, date, status, Some(admin_id)).await?;
                report.attendance_created += 1;
            }
        }
    }

    tracing::info!(?report, "Seed complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::db::test_support::memory_db;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = memory_db().await;

        let first = seed(&db, false).await.unwrap();
        assert!(first.admin_created);
        assert_eq!(first.employees_created, 3);
        assert_eq!(first.attendance_created, 9);

        let second = seed(&db, false).await.unwrap();
        assert_eq!(second, SeedReport::default());

        let ava = employee_repo::get_by_code(&db, "EMP-001").await.unwrap().unwrap();
        assert_eq!(ava.full_name, "Ava Patel");
    }

    #[tokio::test]
    async fn test_seed_resets_admin_password() {
        let db = memory_db().await;
        seed(&db, false).await.unwrap();

        let admin = admin_repo::find_by_email(&db, SEED_ADMIN_EMAIL).await.unwrap().unwrap();
        let admin_id = admin.id;
        let changes = AdminChanges {
            password_hash: Some(hash_password("changed-password").unwrap()),
            ..Default::default()
        };
        admin_repo::update(&db, admin, changes, admin_id).await.unwrap();

        let report = seed(&db, true).await.unwrap();
        assert!(report.admin_reset);
        let admin = admin_repo::find_by_email(&db, SEED_ADMIN_EMAIL).await.unwrap().unwrap();
        assert!(verify_password(SEED_ADMIN_PASSWORD, &admin.password_hash));
        assert_eq!(admin.name.as_deref(), Some("HR Admin"));
    }

    #[tokio::test]
    async fn test_seed_reset_keeps_admin_role() {
        let db = memory_db().await;
        seed(&db, false).await.unwrap();

        let admin = admin_repo::find_by_email(&db, SEED_ADMIN_EMAIL).await.unwrap().unwrap();
        let admin_id = admin.id;
        let changes = AdminChanges {
            role: Some(Role::Manager),
            ..Default::default()
        };
        admin_repo::update(&db, admin, changes, admin_id).await.unwrap();

        seed(&db, true).await.unwrap();
        let admin = admin_repo::find_by_email(&db, SEED_ADMIN_EMAIL).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Manager);
        assert!(verify_password(SEED_ADMIN_PASSWORD, &admin.password_hash));
    }
}
