//! Handlers grouped by resource.

pub mod admins;
pub mod attendance;
pub mod auth;
pub mod employees;
pub mod health;
pub mod stats;

use axum::Json;
use axum::http::StatusCode;

use crate::error::AppError;
use crate::models::ApiResponse;

/// Handler result carrying the success envelope.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Handler result for endpoints answering `201 Created`.
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub(crate) fn ok<T>(data: T, message: &str) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data, message))
}

pub(crate) fn ok_with_meta<T>(data: T, message: &str, meta: impl serde::Serialize) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data, message).with_meta(meta))
}

pub(crate) fn created<T>(data: T, message: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::ok(data, message)))
}

pub(crate) const EMPLOYEE_NOT_FOUND: &str = "Employee not found.";
pub(crate) const NO_FIELDS: &str = "No fields provided for update.";
