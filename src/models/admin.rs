//! Admin account DTOs and auth payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::double_option;
use super::response::ErrorDetail;
use super::validate::{Checker, Validate};
use crate::entities::admins;
use crate::entities::sea_orm_active_enums::Role;

fn default_role() -> Role {
    Role::Admin
}

/// DTO for creating an admin or manager account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreate {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

/// DTO for updating an account. `name: null` clears the name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdate {
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl AdminUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.role.is_none()
    }
}

/// Account as returned by the API. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRead {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_id: Option<i32>,
    pub updated_by_id: Option<i32>,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl From<admins::Model> for AdminRead {
    fn from(model: admins::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            created_at: model.created_at,
            updated_at: model.updated_at,
            created_by_id: model.created_by_id,
            updated_by_id: model.updated_by_id,
            last_active_at: model.last_active_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Bearer token issued on login and session refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: AdminRead,
    pub token: Token,
}

fn check_password(checker: &mut Checker, password: &str) {
    let len = password.chars().count();
    if len < 8 {
        checker.fail("password", "String should have at least 8 characters", "string_too_short");
    } else if len > 128 {
        checker.fail("password", "String should have at most 128 characters", "string_too_long");
    }
}

fn check_name(checker: &mut Checker, name: Option<&str>) {
    if let Some(name) = name
        && name.chars().count() > 120
    {
        checker.fail("name", "String should have at most 120 characters", "string_too_long");
    }
}

impl Validate for AdminCreate {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        let mut checker = Checker::body();
        check_name(&mut checker, self.name.as_deref());
        checker.email("email", &self.email);
        check_password(&mut checker, &self.password);
        checker.finish()
    }
}

impl Validate for AdminUpdate {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        let mut checker = Checker::body();
        check_name(&mut checker, self.name.as_ref().and_then(|n| n.as_deref()));
        if let Some(email) = &self.email {
            checker.email("email", email);
        }
        if let Some(password) = &self.password {
            check_password(&mut checker, password);
        }
        checker.finish()
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        let mut checker = Checker::body();
        if self.email.trim().is_empty() {
            checker.fail("email", "Field required", "missing");
        }
        if self.password.is_empty() {
            checker.fail("password", "Field required", "missing");
        }
        checker.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_create_defaults_to_admin_role() {
        let payload: AdminCreate =
            serde_json::from_str(r#"{"email":"a@b.co","password":"secret123"}"#).unwrap();
        assert_eq!(payload.role, Role::Admin);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_admin_create_rejects_short_password() {
        let payload: AdminCreate =
            serde_json::from_str(r#"{"email":"a@b.co","password":"short","role":"manager"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors[0].path(), "password");
    }

    #[test]
    fn test_admin_update_null_name_clears() {
        let patch: AdminUpdate = serde_json::from_str(r#"{"name":null}"#).unwrap();
        assert_eq!(patch.name, Some(None));
        assert!(!patch.is_empty());

        let empty: AdminUpdate = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_unknown_role_fails_to_parse() {
        let result = serde_json::from_str::<AdminCreate>(r#"{"email":"a@b.co","password":"secret123","role":"root"}"#);
        assert!(result.is_err());
    }
}
