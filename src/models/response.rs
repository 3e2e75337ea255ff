//! Response envelopes shared by the server and the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }

    /// Attach a meta object. Values that fail to serialize are dropped.
    pub fn with_meta(mut self, meta: impl Serialize) -> Self {
        self.meta = serde_json::to_value(meta).ok();
        self
    }
}

/// One element of an error location path (`["body", "email"]`, `["query", "limit"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Loc {
    Index(i64),
    Key(String),
}

impl From<&str> for Loc {
    fn from(value: &str) -> Self {
        Self::Key(value.to_string())
    }
}

/// A single field-level error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Vec<Loc>>,
    pub msg: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ErrorDetail {
    pub fn field(location: &str, field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: Some(vec![location.into(), field.into()]),
            msg: msg.into(),
            kind: Some(kind.to_string()),
        }
    }

    /// Dotted path without the leading `body` segment, e.g. `email` or `items.0.name`.
    pub fn path(&self) -> String {
        self.loc
            .iter()
            .flatten()
            .filter(|loc| **loc != Loc::Key("body".to_string()))
            .map(|loc| match loc {
                Loc::Key(key) => key.clone(),
                Loc::Index(idx) => idx.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Failure response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub errors: Option<Vec<ErrorDetail>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(message: impl Into<String>, errors: Vec<ErrorDetail>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: Some(errors),
        }
    }
}

/// `{"status": "..."}` payload used by delete and create-only endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: String,
}

impl StatusPayload {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

/// Paging meta returned with every list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_path_skips_body() {
        let detail = ErrorDetail {
            loc: Some(vec!["body".into(), "items".into(), Loc::Index(2), "name".into()]),
            msg: "required".into(),
            kind: None,
        };
        assert_eq!(detail.path(), "items.2.name");
    }

    #[test]
    fn test_loc_deserializes_mixed_types() {
        let detail: ErrorDetail =
            serde_json::from_str(r#"{"loc":["body",0,"email"],"msg":"bad","type":"value_error"}"#).unwrap();
        assert_eq!(detail.loc.unwrap()[1], Loc::Index(0));
        assert_eq!(detail.kind.as_deref(), Some("value_error"));
    }

    #[test]
    fn test_meta_omitted_when_absent() {
        let body = serde_json::to_value(ApiResponse::ok(1, "Fetched")).unwrap();
        assert!(body.get("meta").is_none());
        assert_eq!(body["success"], true);
    }
}
