//! Normalizes every failure shape the client can see into one error type.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::models::response::ErrorDetail;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    /// HTTP status, `None` for transport failures.
    pub status: Option<u16>,
    pub errors: Option<Vec<ErrorDetail>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
            errors: None,
        }
    }

    /// Build an error from a non-success response body.
    ///
    /// Tries the server envelope, then `{"detail": "..."}`, then
    /// `{"detail": [...]}`, then falls back to the status text.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let code = Some(status.as_u16());
        let value: Option<Value> = serde_json::from_str(body).ok();

        if let Some(Value::Object(map)) = &value {
            if map.contains_key("success")
                && let Some(Value::String(message)) = map.get("message")
            {
                return Self {
                    message: message.clone(),
                    status: code,
                    errors: map.get("errors").and_then(parse_details),
                };
            }

            match map.get("detail") {
                Some(Value::String(detail)) => return Self::new(detail.clone(), code),
                Some(detail @ Value::Array(_)) => {
                    return Self {
                        message: "Validation error.".to_string(),
                        status: code,
                        errors: parse_details(detail),
                    };
                }
                _ => {}
            }
        }

        let message = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
        Self::new(message, code)
    }

    /// Session revalidation treats these as "credentials are no longer valid".
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, Some(401 | 403 | 404))
    }

    /// Map of dotted field path to message, e.g. `"email" -> "value is not a valid email address"`.
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .flatten()
            .filter_map(|detail| {
                let path = detail.path();
                (!path.is_empty()).then(|| (path, detail.msg.clone()))
            })
            .collect()
    }
}

fn parse_details(value: &Value) -> Option<Vec<ErrorDetail>> {
    match value {
        Value::Null => None,
        other => serde_json::from_value(other.clone()).ok(),
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string(), err.status().map(|s| s.as_u16()))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Invalid response: {err}"), None)
    }
}
