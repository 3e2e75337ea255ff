//! Table creation from entity definitions.

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::entities::{admins, attendance, employees};

/// Name of the unique index enforcing one attendance row per employee per day.
pub const ATTENDANCE_UNIQUE_INDEX: &str = "uq_employee_date";

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Create all tables and indexes if they do not exist yet.
///
/// Order matters: `employees` and `attendance` reference `admins`, and
/// `attendance` references `employees`.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    create_table(db, &schema, admins::Entity).await?;
    create_table(db, &schema, employees::Entity).await?;
    create_table(db, &schema, attendance::Entity).await?;

    let index = Index::create()
        .name(ATTENDANCE_UNIQUE_INDEX)
        .table(attendance::Entity)
        .col(attendance::Column::EmployeeId)
        .col(attendance::Column::Date)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&index)).await?;

    Ok(())
}
