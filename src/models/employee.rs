//! Employee DTOs for create and update operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::ErrorDetail;
use super::validate::{Checker, Validate};
use crate::entities::employees;

/// DTO for creating an employee. The employee code is generated server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub full_name: String,
    pub email: String,
    pub department: String,
}

/// DTO for updating an employee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.department.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRead {
    pub id: i32,
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_id: Option<i32>,
    pub updated_by_id: Option<i32>,
}

impl From<employees::Model> for EmployeeRead {
    fn from(model: employees::Model) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_id,
            full_name: model.full_name,
            email: model.email,
            department: model.department,
            created_at: model.created_at,
            updated_at: model.updated_at,
            created_by_id: model.created_by_id,
            updated_by_id: model.updated_by_id,
        }
    }
}

impl Validate for EmployeeCreate {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        let mut checker = Checker::body();
        checker.length("full_name", &self.full_name, 1, 120);
        checker.email("email", &self.email);
        checker.length("department", &self.department, 1, 120);
        checker.finish()
    }
}

impl Validate for EmployeeUpdate {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        let mut checker = Checker::body();
        if let Some(full_name) = &self.full_name {
            checker.length("full_name", full_name, 1, 120);
        }
        if let Some(email) = &self.email {
            checker.email("email", email);
        }
        if let Some(department) = &self.department {
            checker.length("department", department, 1, 120);
        }
        checker.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_create_collects_all_errors() {
        let payload = EmployeeCreate {
            full_name: " ".into(),
            email: "nope".into(),
            department: String::new(),
        };
        let errors = payload.validate().unwrap_err();
        let paths: Vec<String> = errors.iter().map(ErrorDetail::path).collect();
        assert_eq!(paths, ["full_name", "email", "department"]);
    }

    #[test]
    fn test_employee_update_only_checks_present_fields() {
        let patch = EmployeeUpdate {
            department: Some("Finance".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
        assert!(!patch.is_empty());
        assert!(EmployeeUpdate::default().is_empty());
    }
}
