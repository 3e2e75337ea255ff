//! Employee directory.

use axum::extract::State;

use super::{ApiResult, Created, EMPLOYEE_NOT_FOUND, NO_FIELDS, created, ok, ok_with_meta};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::AppState;
use crate::auth::{RequireAdmin, RequireStaff};
use crate::db::employee as employee_repo;
use crate::entities::employees;
use crate::error::{AppError, Result, conflict_on_unique};
use crate::models::query::PageQuery;
use crate::models::validate::normalize_email;
use crate::models::{EmployeeCreate, EmployeeRead, EmployeeUpdate, PageMeta, StatusPayload};

/// Fetch an employee or fail with 404.
pub(crate) async fn load(state: &AppState, id: i32) -> Result<employees::Model> {
    employee_repo::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found(EMPLOYEE_NOT_FOUND))
}

pub async fn list(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Vec<EmployeeRead>> {
    let (items, total) = employee_repo::list(&state.db, query.limit(), query.offset(), query.search()).await?;
    let items: Vec<EmployeeRead> = items.into_iter().map(EmployeeRead::from).collect();
    let meta = PageMeta {
        total,
        limit: query.limit(),
        offset: query.offset(),
        q: query.search().map(str::to_string),
    };

    Ok(ok_with_meta(items, "Employees fetched", meta))
}

pub async fn get(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<EmployeeRead> {
    let employee = load(&state, id).await?;
    Ok(ok(EmployeeRead::from(employee), "Employee fetched"))
}

pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    ApiJson(payload): ApiJson<EmployeeCreate>,
) -> Created<EmployeeRead> {
    let employee = employee_repo::create(&state.db, payload, Some(actor.id))
        .await
        .map_err(|e| conflict_on_unique(e, "Employee with this employee_id or email already exists."))?;

    tracing::info!(employee_id = %employee.employee_id, "employee created");
    Ok(created(EmployeeRead::from(employee), "Employee created"))
}

pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<EmployeeUpdate>,
) -> ApiResult<EmployeeRead> {
    let existing = load(&state, id).await?;
    if payload.is_empty() {
        return Err(AppError::bad_request(NO_FIELDS));
    }

    const EMAIL_TAKEN: &str = "Employee with this email already exists.";
    if let Some(email) = payload.email.as_deref().map(normalize_email)
        && email != existing.email
        && employee_repo::find_by_email(&state.db, &email).await?.is_some()
    {
        return Err(AppError::conflict(EMAIL_TAKEN));
    }

    let employee = employee_repo::update(&state.db, existing, payload, Some(actor.id))
        .await
        .map_err(|e| conflict_on_unique(e, EMAIL_TAKEN))?;

    Ok(ok(EmployeeRead::from(employee), "Employee updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusPayload> {
    let employee = load(&state, id).await?;
    employee_repo::delete(&state.db, employee.id).await?;

    tracing::info!(employee_id = %employee.employee_id, actor_id = actor.id, "employee deleted");
    Ok(ok(StatusPayload::new("deleted"), "Employee deleted"))
}
