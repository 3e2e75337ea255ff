//! Dashboard statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Headcount split for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewStats {
    pub date: NaiveDate,
    pub total_employees: u64,
    pub present: u64,
    pub absent: u64,
    pub unmarked: u64,
}

/// Meta block returned with the attendance chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsMeta {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub total_employees: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i32>,
}
