//! Typed errors and HTTP mapping.

use crate::schema::FieldError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    Integrity(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Field-level errors as `{field: [messages]}` for validation responses.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation(errors) => {
                let mut map = serde_json::Map::new();
                for e in errors {
                    map.insert(e.field.clone(), serde_json::json!(e.messages));
                }
                Some(serde_json::Value::Object(map))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::Integrity(_) => (StatusCode::BAD_REQUEST, "integrity_error"),
            ApiError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        let details = self.details();
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_details_keyed_by_field() {
        let err = ApiError::Validation(vec![FieldError {
            field: "name".into(),
            messages: vec!["name is required".into()],
        }]);
        let details = err.details().unwrap();
        assert_eq!(details["name"][0], "name is required");
    }

    #[test]
    fn non_validation_errors_have_no_details() {
        assert!(ApiError::NotFound("store 1".into()).details().is_none());
        assert!(ApiError::BadRequest("nope".into()).details().is_none());
    }
}
