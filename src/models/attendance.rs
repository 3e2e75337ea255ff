//! Attendance DTOs and view models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::response::ErrorDetail;
use super::validate::Validate;
use crate::entities::sea_orm_active_enums::AttendanceStatus;
use crate::entities::{attendance, employees};

/// DTO for recording attendance on a given date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceCreate {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// DTO for updating an attendance record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
}

impl AttendanceUpdate {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.status.is_none()
    }
}

/// DTO for marking today's attendance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceTodayUpsert {
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRead {
    pub id: i32,
    pub employee_id: i32,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_id: Option<i32>,
    pub updated_by_id: Option<i32>,
}

impl From<attendance::Model> for AttendanceRead {
    fn from(model: attendance::Model) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_id,
            date: model.date,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
            created_by_id: model.created_by_id,
            updated_by_id: model.updated_by_id,
        }
    }
}

/// Attendance row joined with its employee, for the global attendance list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceListItem {
    pub id: i32,
    pub employee_id: i32,
    pub employee_code: String,
    pub employee_name: String,
    pub employee_email: String,
    pub department: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_id: Option<i32>,
    pub updated_by_id: Option<i32>,
}

impl AttendanceListItem {
    pub fn new(record: attendance::Model, employee: &employees::Model) -> Self {
        Self {
            id: record.id,
            employee_id: employee.id,
            employee_code: employee.employee_id.clone(),
            employee_name: employee.full_name.clone(),
            employee_email: employee.email.clone(),
            department: employee.department.clone(),
            date: record.date,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            created_by_id: record.created_by_id,
            updated_by_id: record.updated_by_id,
        }
    }
}

/// One day of the attendance chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStatsPoint {
    pub date: NaiveDate,
    pub present: u64,
    pub absent: u64,
    pub unmarked: u64,
}

/// Per-employee totals over an optional date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub employee_id: i32,
    pub employee_code: String,
    pub total_records: u64,
    pub total_present: u64,
    pub total_absent: u64,
}

impl Validate for AttendanceCreate {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        Ok(())
    }
}

impl Validate for AttendanceUpdate {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        Ok(())
    }
}

impl Validate for AttendanceTodayUpsert {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        Ok(())
    }
}
