//! Axum extractors resolving the bearer token to an account.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::token;
use crate::api::state::AppState;
use crate::db::admin as admin_repo;
use crate::entities::admins;
use crate::entities::sea_orm_active_enums::Role;
use crate::error::AppError;

const NOT_AUTHENTICATED: &str = "Not authenticated.";
const INVALID_CREDENTIALS: &str = "Could not validate credentials.";
const INSUFFICIENT_PERMISSIONS: &str = "Insufficient permissions.";

/// Any authenticated account.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub admins::Model);

/// An account with the `admin` role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub admins::Model);

/// An account with the `admin` or `manager` role.
#[derive(Debug, Clone)]
pub struct RequireStaff(pub admins::Model);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| AppError::unauthorized(NOT_AUTHENTICATED))?;

        let claims = token::verify(token, &state.config.auth.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            AppError::unauthorized(INVALID_CREDENTIALS)
        })?;

        let admin = admin_repo::find_by_email(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        Ok(Self(admin))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentAdmin(admin) = CurrentAdmin::from_request_parts(parts, state).await?;
        match admin.role {
            Role::Admin => Ok(Self(admin)),
            Role::Manager => Err(AppError::forbidden(INSUFFICIENT_PERMISSIONS)),
        }
    }
}

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentAdmin(admin) = CurrentAdmin::from_request_parts(parts, state).await?;
        match admin.role {
            Role::Admin | Role::Manager => Ok(Self(admin)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
