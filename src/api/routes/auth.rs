//! Login, session refresh and account bootstrap.

use axum::extract::State;
use axum::http::HeaderMap;

use super::{ApiResult, Created, created, ok};
use crate::api::extract::ApiJson;
use crate::api::state::AppState;
use crate::auth::{CurrentAdmin, RequireAdmin, password, token};
use crate::db::admin::{self as admin_repo, NewAdmin};
use crate::entities::admins;
use crate::entities::sea_orm_active_enums::Role;
use crate::error::{AppError, Result, conflict_on_unique};
use crate::models::validate::normalize_email;
use crate::models::{AdminCreate, AdminRead, LoginRequest, SessionResponse, StatusPayload, Token};

pub const BOOTSTRAP_HEADER: &str = "x-admin-bootstrap-token";
pub(crate) const ADMIN_EXISTS: &str = "Admin with this email already exists.";

fn issue_token(state: &AppState, admin: &admins::Model) -> Result<Token> {
    let access_token = token::issue(
        &admin.email,
        admin.role,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_minutes,
    )?;
    Ok(Token::bearer(access_token))
}

/// Hash the password and insert the account, mapping duplicate emails to 409.
pub(crate) async fn insert_account(
    state: &AppState,
    payload: AdminCreate,
    actor_id: Option<i32>,
) -> Result<admins::Model> {
    let new_admin = NewAdmin {
        name: payload.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        email: normalize_email(&payload.email),
        password_hash: password::hash_password(&payload.password)?,
        role: payload.role,
    };
    admin_repo::create(&state.db, new_admin, actor_id)
        .await
        .map_err(|e| conflict_on_unique(e, ADMIN_EXISTS))
}

pub async fn login(State(state): State<AppState>, ApiJson(payload): ApiJson<LoginRequest>) -> ApiResult<Token> {
    let email = normalize_email(&payload.email);
    let admin = admin_repo::find_by_email(&state.db, &email)
        .await?
        .filter(|admin| password::verify_password(&payload.password, &admin.password_hash))
        .ok_or_else(|| AppError::unauthorized("Invalid credentials."))?;

    let admin = admin_repo::touch_last_active(&state.db, admin).await?;
    tracing::info!(admin_id = admin.id, "login");

    Ok(ok(issue_token(&state, &admin)?, "Login successful"))
}

pub async fn session(State(state): State<AppState>, CurrentAdmin(admin): CurrentAdmin) -> ApiResult<SessionResponse> {
    let admin = admin_repo::touch_last_active(&state.db, admin).await?;
    let token = issue_token(&state, &admin)?;

    Ok(ok(
        SessionResponse {
            user: AdminRead::from(admin),
            token,
        },
        "Session fetched",
    ))
}

pub async fn bootstrap(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<AdminCreate>,
) -> Created<StatusPayload> {
    let supplied = headers.get(BOOTSTRAP_HEADER).and_then(|v| v.to_str().ok());
    if supplied != Some(state.config.auth.bootstrap_token.as_str()) {
        return Err(AppError::unauthorized("Invalid bootstrap token."));
    }
    if admin_repo::has_any(&state.db).await? {
        return Err(AppError::conflict("Admin already exists. Bootstrap is disabled."));
    }
    if payload.role != Role::Admin {
        return Err(AppError::bad_request("Bootstrap admin must have admin role."));
    }

    let admin = insert_account(&state, payload, None).await?;
    tracing::info!(admin_id = admin.id, "bootstrap admin created");

    Ok(created(StatusPayload::new("created"), "Admin created"))
}

pub async fn create_account(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    ApiJson(payload): ApiJson<AdminCreate>,
) -> Created<StatusPayload> {
    if admin_repo::find_by_email(&state.db, &normalize_email(&payload.email))
        .await?
        .is_some()
    {
        return Err(AppError::conflict(ADMIN_EXISTS));
    }

    insert_account(&state, payload, Some(actor.id)).await?;
    Ok(created(StatusPayload::new("created"), "Admin created"))
}
