//! HS256 access tokens.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::entities::sea_orm_active_enums::Role;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account email.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a token for `email` valid for `ttl_minutes`.
pub fn issue(email: &str, role: Role, secret: &str, ttl_minutes: i64) -> Result<String> {
    let now = Utc::now();
    let expires = TimeDelta::try_minutes(ttl_minutes)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AppError::internal(format!("Token TTL of {ttl_minutes} minutes is out of range")))?;
    let claims = Claims {
        sub: email.to_string(),
        role,
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// Decode and validate a token, including its expiry.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let token = issue("admin@hrms.com", Role::Manager, "secret", 60).unwrap();
        let claims = verify(&token, "secret").unwrap();
        assert_eq!(claims.sub, "admin@hrms.com");
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue("admin@hrms.com", Role::Admin, "secret", 60).unwrap();
        assert!(matches!(verify(&token, "other"), Err(AppError::Token(_))));
    }

    #[test]
    fn test_expired_rejected() {
        // Past the default 60s leeway.
        let token = issue("admin@hrms.com", Role::Admin, "secret", -5).unwrap();
        assert!(verify(&token, "secret").is_err());
    }

    #[test]
    fn test_unrepresentable_ttl_is_an_error() {
        let err = issue("admin@hrms.com", Role::Admin, "secret", 200_000_000_000).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(issue("admin@hrms.com", Role::Admin, "secret", i64::MAX).is_err());
    }
}
