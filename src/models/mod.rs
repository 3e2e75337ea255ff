//! Request and response DTOs for admins, employees, attendance and stats.

pub mod admin;
pub mod attendance;
pub mod employee;
pub mod query;
pub mod response;
pub mod stats;
pub mod validate;

pub use admin::{AdminCreate, AdminRead, AdminUpdate, LoginRequest, SessionResponse, Token};
pub use attendance::{
    AttendanceCreate, AttendanceListItem, AttendanceRead, AttendanceStatsPoint, AttendanceSummary,
    AttendanceTodayUpsert, AttendanceUpdate,
};
pub use employee::{EmployeeCreate, EmployeeRead, EmployeeUpdate};
pub use response::{ApiResponse, ErrorDetail, ErrorResponse, PageMeta, StatusPayload};
pub use stats::OverviewStats;
pub use validate::Validate;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
