//! Body, query and path extractors that report failures as 422 envelopes.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::response::{ErrorDetail, Loc};
use crate::models::validate::Validate;

const JSON_DATA_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// JSON body that is deserialized and then validated.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

/// Query string that is deserialized and then validated.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

/// Path parameters; a malformed id is a validation error, not a 400.
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

/// Pull the field path out of a serde message such as
/// `status: unknown variant` or `missing field `email``.
fn body_detail(text: &str) -> ErrorDetail {
    let text = text.strip_prefix(JSON_DATA_PREFIX).unwrap_or(text);
    let mut loc = vec![Loc::from("body")];

    let (path, msg) = match text.split_once(": ") {
        Some((path, msg)) if !path.is_empty() && !path.contains(' ') => (Some(path), msg),
        _ => (None, text),
    };
    if let Some(path) = path.filter(|p| *p != ".") {
        loc.extend(path.split('.').filter(|s| !s.is_empty()).map(|segment| {
            match segment.trim_matches(|c| c == '[' || c == ']').parse::<i64>() {
                Ok(idx) if segment.starts_with('[') => Loc::Index(idx),
                _ => Loc::Key(segment.to_string()),
            }
        }));
    }

    let kind = if let Some(field) = missing_field(msg) {
        loc.push(Loc::Key(field.to_string()));
        "missing"
    } else {
        "value_error"
    };

    // Drop the trailing ` at line N column M` serde adds.
    let msg = msg.split(" at line ").next().unwrap_or(msg);
    ErrorDetail {
        loc: Some(loc),
        msg: msg.to_string(),
        kind: Some(kind.to_string()),
    }
}

fn missing_field(msg: &str) -> Option<&str> {
    let rest = msg.strip_prefix("missing field `")?;
    rest.split('`').next()
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    let detail = match &rejection {
        JsonRejection::JsonDataError(_) => body_detail(&rejection.body_text()),
        JsonRejection::JsonSyntaxError(_) => ErrorDetail {
            loc: Some(vec![Loc::from("body")]),
            msg: "JSON decode error".to_string(),
            kind: Some("json_invalid".to_string()),
        },
        _ => ErrorDetail {
            loc: Some(vec![Loc::from("body")]),
            msg: rejection.body_text(),
            kind: Some("value_error".to_string()),
        },
    };
    AppError::validation(vec![detail])
}

fn location_detail(location: &str, text: String) -> ErrorDetail {
    ErrorDetail {
        loc: Some(vec![Loc::from(location)]),
        msg: text,
        kind: Some("value_error".to_string()),
    }
}

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(json_rejection)?;
        value.validate().map_err(AppError::validation)?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::validation(vec![location_detail("query", e.body_text())]))?;
        value.validate().map_err(AppError::validation)?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| AppError::validation(vec![location_detail("path", e.body_text())]))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_detail() {
        let detail = body_detail(&format!("{JSON_DATA_PREFIX}missing field `email` at line 1 column 2"));
        assert_eq!(detail.path(), "email");
        assert_eq!(detail.msg, "missing field `email`");
        assert_eq!(detail.kind.as_deref(), Some("missing"));
    }

    #[test]
    fn test_nested_path_detail() {
        let detail = body_detail(&format!(
            "{JSON_DATA_PREFIX}status: unknown variant `present`, expected `Present` or `Absent` at line 1 column 19"
        ));
        assert_eq!(detail.path(), "status");
        assert_eq!(detail.kind.as_deref(), Some("value_error"));
        assert!(detail.msg.starts_with("unknown variant"));
    }

    #[test]
    fn test_unstructured_text() {
        let detail = body_detail("Expected request with `Content-Type: application/json`");
        assert_eq!(detail.path(), "");
    }
}
