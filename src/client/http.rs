//! HTTP client for the HRMS REST API.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::cache::QueryCache;
use super::error::ApiError;
use super::pagination::Pagination;
use crate::entities::sea_orm_active_enums::AttendanceStatus;
use crate::models::query::{AttendanceListQuery, AttendanceQuery, DateRangeQuery, StatsQuery, build_query_string};
use crate::models::stats::StatsMeta;
use crate::models::{
    AdminCreate, AdminRead, AdminUpdate, ApiResponse, AttendanceCreate, AttendanceListItem, AttendanceRead,
    AttendanceStatsPoint, AttendanceSummary, AttendanceTodayUpsert, AttendanceUpdate, EmployeeCreate, EmployeeRead,
    EmployeeUpdate, LoginRequest, OverviewStats, PageMeta, SessionResponse, StatusPayload, Token,
};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// A list page together with its paging meta.
pub type Page<T> = (Vec<T>, PageMeta);

/// API client.
///
/// Holds the bearer token for the current session and a read cache that
/// mutations invalidate.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    cache: QueryCache,
}

fn opt<T: ToString>(value: Option<T>) -> Option<String> {
    value.map(|v| v.to_string())
}

fn page_pairs(page: &Pagination) -> [(&'static str, Option<String>); 2] {
    [
        ("limit", Some(page.limit().to_string())),
        ("offset", Some(page.offset().to_string())),
    ]
}

fn into_data<T>(response: ApiResponse<T>) -> Result<T, ApiError> {
    response
        .data
        .ok_or_else(|| ApiError::new(format!("Response has no data: {}", response.message), None))
}

fn into_meta<M: DeserializeOwned>(meta: Option<Value>) -> Result<M, ApiError> {
    let meta = meta.ok_or_else(|| ApiError::new("Response has no meta", None))?;
    Ok(serde_json::from_value(meta)?)
}

impl ApiClient {
    /// Create a new client for `base_url` (e.g. "http://localhost:8000/api/v1").
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            cache: QueryCache::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Send a request and return the raw success envelope.
    async fn request_value<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        let url = format!("{base}{path}", base = self.base_url);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(%method, path, status = status.as_u16(), "api call");

        if !status.is_success() {
            return Err(ApiError::from_response(status, &text));
        }

        let value: Value = serde_json::from_str(&text)?;
        if value.get("success") == Some(&Value::Bool(false)) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Request failed")
                .to_string();
            return Err(ApiError::new(message, Some(status.as_u16())));
        }
        Ok(value)
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value = self.request_value(method, path, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// GET through the cache.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        if let Some(value) = self.cache.get(path) {
            tracing::trace!(path, "cache hit");
            return Ok(serde_json::from_value(value)?);
        }

        let value = self.request_value::<()>(Method::GET, path, None).await?;
        self.cache.insert(path, value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str) -> Result<Page<T>, ApiError> {
        let response = self.get::<Vec<T>>(path).await?;
        let meta = into_meta(response.meta.clone())?;
        Ok((into_data(response)?, meta))
    }

    // Auth

    /// Log in and keep the issued token.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Token, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let token: Token = into_data(self.send(Method::POST, "/auth/login", Some(&body)).await?)?;
        self.cache.clear();
        self.token = Some(token.access_token.clone());
        Ok(token)
    }

    /// Revalidate the current token; keeps the refreshed one.
    pub async fn refresh_session(&mut self) -> Result<SessionResponse, ApiError> {
        let session: SessionResponse = into_data(self.send::<_, ()>(Method::GET, "/auth/session", None).await?)?;
        self.token = Some(session.token.access_token.clone());
        Ok(session)
    }

    /// Forget the token and every cached response.
    pub fn logout(&mut self) {
        self.token = None;
        self.cache.clear();
    }

    // Employees

    fn invalidate_employees(&self) {
        self.cache.invalidate(&["/employees", "/attendance", "/stats"]);
    }

    pub async fn list_employees(&self, page: &Pagination, q: Option<&str>) -> Result<Page<EmployeeRead>, ApiError> {
        let [limit, offset] = page_pairs(page);
        let query = build_query_string(&[limit, offset, ("q", opt(q))]);
        self.get_page(&format!("/employees{query}")).await
    }

    pub async fn get_employee(&self, id: i32) -> Result<EmployeeRead, ApiError> {
        into_data(self.get(&format!("/employees/{id}")).await?)
    }

    pub async fn create_employee(&self, payload: &EmployeeCreate) -> Result<EmployeeRead, ApiError> {
        let employee = into_data(self.send(Method::POST, "/employees", Some(payload)).await?)?;
        self.invalidate_employees();
        Ok(employee)
    }

    pub async fn update_employee(&self, id: i32, payload: &EmployeeUpdate) -> Result<EmployeeRead, ApiError> {
        let employee = into_data(
            self.send(Method::PATCH, &format!("/employees/{id}"), Some(payload))
                .await?,
        )?;
        self.invalidate_employees();
        Ok(employee)
    }

    pub async fn delete_employee(&self, id: i32) -> Result<StatusPayload, ApiError> {
        let status = into_data(
            self.send::<_, ()>(Method::DELETE, &format!("/employees/{id}"), None)
                .await?,
        )?;
        self.invalidate_employees();
        Ok(status)
    }

    // Attendance

    fn invalidate_attendance(&self, employee_id: i32) {
        let subtree = format!("/employees/{employee_id}/attendance");
        self.cache.invalidate(&[&subtree, "/attendance", "/stats"]);
    }

    pub async fn list_attendance(
        &self,
        employee_id: i32,
        query: &AttendanceQuery,
    ) -> Result<Page<AttendanceRead>, ApiError> {
        let qs = build_query_string(&[
            ("date_from", opt(query.date_from)),
            ("date_to", opt(query.date_to)),
            ("limit", opt(query.limit)),
            ("offset", opt(query.offset)),
        ]);
        self.get_page(&format!("/employees/{employee_id}/attendance{qs}")).await
    }

    pub async fn attendance_summary(
        &self,
        employee_id: i32,
        range: &DateRangeQuery,
    ) -> Result<AttendanceSummary, ApiError> {
        let qs = build_query_string(&[("date_from", opt(range.date_from)), ("date_to", opt(range.date_to))]);
        into_data(
            self.get(&format!("/employees/{employee_id}/attendance/summary{qs}"))
                .await?,
        )
    }

    pub async fn create_attendance(
        &self,
        employee_id: i32,
        payload: &AttendanceCreate,
    ) -> Result<AttendanceRead, ApiError> {
        let path = format!("/employees/{employee_id}/attendance");
        let record = into_data(self.send(Method::POST, &path, Some(payload)).await?)?;
        self.invalidate_attendance(employee_id);
        Ok(record)
    }

    pub async fn update_attendance(
        &self,
        employee_id: i32,
        attendance_id: i32,
        payload: &AttendanceUpdate,
    ) -> Result<AttendanceRead, ApiError> {
        let path = format!("/employees/{employee_id}/attendance/{attendance_id}");
        let record = into_data(self.send(Method::PATCH, &path, Some(payload)).await?)?;
        self.invalidate_attendance(employee_id);
        Ok(record)
    }

    pub async fn delete_attendance(&self, employee_id: i32, attendance_id: i32) -> Result<StatusPayload, ApiError> {
        let path = format!("/employees/{employee_id}/attendance/{attendance_id}");
        let status = into_data(self.send::<_, ()>(Method::DELETE, &path, None).await?)?;
        self.invalidate_attendance(employee_id);
        Ok(status)
    }

    /// Mark today's attendance for an employee.
    pub async fn upsert_today(&self, employee_id: i32, status: AttendanceStatus) -> Result<AttendanceRead, ApiError> {
        let path = format!("/employees/{employee_id}/attendance/today");
        let body = AttendanceTodayUpsert { status };
        let record = into_data(self.send(Method::PUT, &path, Some(&body)).await?)?;
        self.invalidate_attendance(employee_id);
        Ok(record)
    }

    pub async fn list_all_attendance(&self, query: &AttendanceListQuery) -> Result<Page<AttendanceListItem>, ApiError> {
        let qs = build_query_string(&[
            ("employee_id", opt(query.employee_id)),
            ("date_from", opt(query.date_from)),
            ("date_to", opt(query.date_to)),
            ("limit", opt(query.limit)),
            ("offset", opt(query.offset)),
        ]);
        self.get_page(&format!("/attendance{qs}")).await
    }

    pub async fn attendance_stats(&self, query: &StatsQuery) -> Result<(Vec<AttendanceStatsPoint>, StatsMeta), ApiError> {
        let qs = build_query_string(&[
            ("employee_id", opt(query.employee_id)),
            ("date_from", opt(query.date_from)),
            ("date_to", opt(query.date_to)),
        ]);
        let response = self
            .get::<Vec<AttendanceStatsPoint>>(&format!("/attendance/stats{qs}"))
            .await?;
        let meta = into_meta(response.meta.clone())?;
        Ok((into_data(response)?, meta))
    }

    pub async fn overview(&self, date: Option<NaiveDate>) -> Result<OverviewStats, ApiError> {
        let qs = build_query_string(&[("date", opt(date))]);
        into_data(self.get(&format!("/stats/overview{qs}")).await?)
    }

    // Admins

    fn invalidate_admins(&self) {
        self.cache.invalidate(&["/admins"]);
    }

    pub async fn list_admins(&self, page: &Pagination, q: Option<&str>) -> Result<Page<AdminRead>, ApiError> {
        let [limit, offset] = page_pairs(page);
        let query = build_query_string(&[limit, offset, ("q", opt(q))]);
        self.get_page(&format!("/admins{query}")).await
    }

    pub async fn create_admin(&self, payload: &AdminCreate) -> Result<AdminRead, ApiError> {
        let admin = into_data(self.send(Method::POST, "/admins", Some(payload)).await?)?;
        self.invalidate_admins();
        Ok(admin)
    }

    pub async fn update_admin(&self, id: i32, payload: &AdminUpdate) -> Result<AdminRead, ApiError> {
        let admin = into_data(self.send(Method::PATCH, &format!("/admins/{id}"), Some(payload)).await?)?;
        self.invalidate_admins();
        Ok(admin)
    }

    pub async fn delete_admin(&self, id: i32) -> Result<StatusPayload, ApiError> {
        let status = into_data(self.send::<_, ()>(Method::DELETE, &format!("/admins/{id}"), None).await?)?;
        self.invalidate_admins();
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let client = ApiClient::new("http://localhost:8000/api/v1/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/v1");
        assert!(client.token().is_none());
    }

    #[test]
    fn test_logout_clears_cache_and_token() {
        let mut client = ApiClient::new(DEFAULT_API_URL, DEFAULT_TIMEOUT).unwrap();
        client.set_token(Some("abc".into()));
        client.cache().insert("/employees", Value::Null);

        client.logout();
        assert!(client.token().is_none());
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_has_no_status() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = ApiClient::new("http://127.0.0.1:9/api/v1", Duration::from_secs(2)).unwrap();
        let err = client.overview(None).await.unwrap_err();
        assert_eq!(err.status, None);
        assert!(!err.is_auth_failure());
    }
}
