//! Implementations behind the `hrms` subcommands.

pub mod remote;

use std::path::Path;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::api::{self, AppState};
use crate::config::{AppConfig, DEFAULT_JWT_SECRET};
use crate::db::attendance::{self as attendance_repo, AttendanceFilter};
use crate::db;
use crate::db::seed::seed as seed_database;
use crate::export::export_attendance_to_excel;
use crate::models::AttendanceListItem;

/// Connect, make sure the schema exists and log what is there.
pub async fn open_database(config: &AppConfig) -> anyhow::Result<DatabaseConnection> {
    let conn = db::connect(&config.database.connection_string(), config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    db::test_connection(&conn).await.context("Database is not responding")?;
    db::ensure_schema(&conn).await.context("Failed to create schema")?;

    tracing::info!("Database backend: {:?}", conn.get_database_backend());
    if let Ok(counts) = db::get_table_counts(&conn).await {
        tracing::info!(
            "Tables: {} admins, {} employees, {} attendance records",
            counts.admins,
            counts.employees,
            counts.attendance
        );
    }
    Ok(conn)
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        tracing::warn!("JWT secret is the default value; set JWT_SECRET before deploying");
    }

    let conn = open_database(&config).await?;
    let state = AppState::new(conn, config)?;
    api::serve(state).await?;
    Ok(())
}

pub async fn seed(config: &AppConfig, reset_admin: bool) -> anyhow::Result<()> {
    let conn = open_database(config).await?;
    let report = seed_database(&conn, reset_admin).await?;
    println!(
        "Seeded: admin created={}, admin reset={}, employees={}, attendance={}",
        report.admin_created, report.admin_reset, report.employees_created, report.attendance_created
    );
    Ok(())
}

/// Write the default configuration to `path`.
pub fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    AppConfig::default().save(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

pub async fn export(
    config: &AppConfig,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    employee_id: Option<i32>,
    out: &Path,
) -> anyhow::Result<usize> {
    if let (Some(from), Some(to)) = (date_from, date_to)
        && from > to
    {
        bail!("--from must be on or before --to");
    }

    let conn = open_database(config).await?;
    let filter = AttendanceFilter {
        employee_id,
        date_from,
        date_to,
    };
    let rows: Vec<AttendanceListItem> = attendance_repo::export_rows(&conn, filter)
        .await?
        .into_iter()
        .map(|(record, employee)| AttendanceListItem::new(record, &employee))
        .collect();

    export_attendance_to_excel(&rows, out).with_context(|| format!("Failed to write {}", out.display()))?;
    tracing::info!("Exported {} rows to {:?}", rows.len(), out);
    Ok(rows.len())
}
