//! Query-string parameters for list, filter and stats endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::response::ErrorDetail;
use super::validate::{Checker, Validate};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

fn check_paging(checker: &mut Checker, limit: Option<i64>, offset: Option<i64>) {
    if let Some(limit) = limit {
        checker.range("limit", limit, 1, MAX_LIMIT as i64);
    }
    if let Some(offset) = offset {
        checker.range("offset", offset, 0, i64::MAX);
    }
}

fn check_search(checker: &mut Checker, q: Option<&str>) {
    if let Some(q) = q
        && q.trim().is_empty()
    {
        checker.fail("q", "String should have at least 1 character", "string_too_short");
    }
}

/// `?limit=&offset=&q=` for directory listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub q: Option<String>,
}

impl PageQuery {
    pub fn limit(&self) -> u64 {
        self.limit.map_or(DEFAULT_LIMIT, |l| l as u64)
    }

    pub fn offset(&self) -> u64 {
        self.offset.map_or(0, |o| o as u64)
    }

    /// Trimmed search term, if any.
    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

impl Validate for PageQuery {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        let mut checker = Checker::query();
        check_paging(&mut checker, self.limit, self.offset);
        check_search(&mut checker, self.q.as_deref());
        checker.finish()
    }
}

/// `?date_from=&date_to=&limit=&offset=` for one employee's attendance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AttendanceQuery {
    pub fn limit(&self) -> u64 {
        self.limit.map_or(DEFAULT_LIMIT, |l| l as u64)
    }

    pub fn offset(&self) -> u64 {
        self.offset.map_or(0, |o| o as u64)
    }
}

impl Validate for AttendanceQuery {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        let mut checker = Checker::query();
        check_paging(&mut checker, self.limit, self.offset);
        checker.finish()
    }
}

/// `?employee_id=&date_from=&date_to=&limit=&offset=` for the global attendance list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceListQuery {
    pub employee_id: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AttendanceListQuery {
    pub fn limit(&self) -> u64 {
        self.limit.map_or(DEFAULT_LIMIT, |l| l as u64)
    }

    pub fn offset(&self) -> u64 {
        self.offset.map_or(0, |o| o as u64)
    }
}

impl Validate for AttendanceListQuery {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        let mut checker = Checker::query();
        check_paging(&mut checker, self.limit, self.offset);
        checker.finish()
    }
}

/// `?date_from=&date_to=` for summaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRangeQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl Validate for DateRangeQuery {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        Ok(())
    }
}

/// `?employee_id=&date_from=&date_to=` for the attendance chart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    pub employee_id: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl Validate for StatsQuery {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        Ok(())
    }
}

/// `?date=` for the overview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverviewQuery {
    pub date: Option<NaiveDate>,
}

impl Validate for OverviewQuery {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>> {
        Ok(())
    }
}

/// Build `?k=v&...` from the set pairs, skipping empty values.
pub fn build_query_string(pairs: &[(&str, Option<String>)]) -> String {
    let parts: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{key}={}", urlencoding::encode(v)))
        })
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery::default();
        assert_eq!(query.limit(), 20);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.search(), None);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_page_query_rejects_out_of_range() {
        let query = PageQuery {
            limit: Some(101),
            offset: Some(-1),
            q: Some("  ".into()),
        };
        let errors = query.validate().unwrap_err();
        let paths: Vec<String> = errors.iter().map(ErrorDetail::path).collect();
        assert_eq!(paths, ["query.limit", "query.offset", "query.q"]);
    }

    #[test]
    fn test_build_query_string() {
        let qs = build_query_string(&[
            ("limit", Some("20".into())),
            ("offset", None),
            ("q", Some("ava patel&co".into())),
            ("date_from", Some(String::new())),
        ]);
        assert_eq!(qs, "?limit=20&q=ava%20patel%26co");
        assert_eq!(build_query_string(&[("q", None)]), "");
    }
}
