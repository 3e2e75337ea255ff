//! Account management, admin role only.

use axum::extract::State;

use super::auth::{ADMIN_EXISTS, insert_account};
use super::{ApiResult, Created, NO_FIELDS, created, ok, ok_with_meta};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::AppState;
use crate::auth::{RequireAdmin, password};
use crate::db::admin::{self as admin_repo, AdminChanges};
use crate::entities::admins;
use crate::error::{AppError, Result, conflict_on_unique};
use crate::models::query::PageQuery;
use crate::models::validate::normalize_email;
use crate::models::{AdminCreate, AdminRead, AdminUpdate, PageMeta, StatusPayload};

const ADMIN_NOT_FOUND: &str = "Admin not found.";

async fn load(state: &AppState, id: i32) -> Result<admins::Model> {
    admin_repo::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found(ADMIN_NOT_FOUND))
}

pub async fn list(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Vec<AdminRead>> {
    let (items, total) = admin_repo::list(&state.db, query.limit(), query.offset(), query.search()).await?;
    let items: Vec<AdminRead> = items.into_iter().map(AdminRead::from).collect();
    let meta = PageMeta {
        total,
        limit: query.limit(),
        offset: query.offset(),
        q: query.search().map(str::to_string),
    };

    Ok(ok_with_meta(items, "Admins fetched", meta))
}

pub async fn get(State(state): State<AppState>, _admin: RequireAdmin, ApiPath(id): ApiPath<i32>) -> ApiResult<AdminRead> {
    let admin = load(&state, id).await?;
    Ok(ok(AdminRead::from(admin), "Admin fetched"))
}

pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    ApiJson(payload): ApiJson<AdminCreate>,
) -> Created<AdminRead> {
    let admin = insert_account(&state, payload, Some(actor.id)).await?;
    Ok(created(AdminRead::from(admin), "Admin created"))
}

pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<AdminUpdate>,
) -> ApiResult<AdminRead> {
    let existing = load(&state, id).await?;
    if payload.is_empty() {
        return Err(AppError::bad_request(NO_FIELDS));
    }

    let email = payload.email.as_deref().map(normalize_email);
    if let Some(email) = &email
        && let Some(other) = admin_repo::find_by_email(&state.db, email).await?
        && other.id != existing.id
    {
        return Err(AppError::conflict(ADMIN_EXISTS));
    }

    let changes = AdminChanges {
        name: payload
            .name
            .map(|name| name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())),
        email,
        password_hash: payload.password.as_deref().map(password::hash_password).transpose()?,
        role: payload.role,
    };
    let admin = admin_repo::update(&state.db, existing, changes, actor.id)
        .await
        .map_err(|e| conflict_on_unique(e, ADMIN_EXISTS))?;

    Ok(ok(AdminRead::from(admin), "Admin updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusPayload> {
    let existing = load(&state, id).await?;
    if existing.id == actor.id {
        return Err(AppError::bad_request("You cannot delete your own account."));
    }

    admin_repo::delete(&state.db, existing.id).await?;
    tracing::info!(admin_id = existing.id, actor_id = actor.id, "admin deleted");
    Ok(ok(StatusPayload::new("deleted"), "Admin deleted"))
}
