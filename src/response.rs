//! Response helpers.

use crate::error::ApiError;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

pub fn message(text: &str) -> Json<MessageBody> {
    Json(MessageBody {
        message: text.to_string(),
    })
}

/// Serialize a row and project it through `schema.dump`.
pub fn dump<T: Serialize>(schema: &crate::schema::Schema, row: &T) -> Result<Value, ApiError> {
    let value = serde_json::to_value(row).map_err(|e| ApiError::Internal(format!("serialize: {}", e)))?;
    Ok(schema.dump(&value))
}
