//! Store CRUD handlers: fetch, list, create, delete.

use crate::error::ApiError;
use crate::request::MergedInput;
use crate::response::{dump, message};
use crate::schema::{Field, FieldKind, Schema};
use crate::service::StoreService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::{Arc, OnceLock};

/// Request/response schema for the store resource. `id` and `created_at` are
/// dump-only; only `name` is loaded from request data.
pub fn store_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Arc::new(
                Schema::new("Store")
                    .field(Field::new("id", FieldKind::Integer).dump_only())
                    .field(
                        Field::new("name", FieldKind::String)
                            .required()
                            .min_length(1)
                            .max_length(80),
                    )
                    .field(Field::new("created_at", FieldKind::String).dump_only()),
            )
        })
        .clone()
}

fn parse_id(id_str: &str) -> Result<i64, ApiError> {
    id_str
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid store id".into()))
}

pub async fn get_store(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id_str)?;
    let row = StoreService::fetch(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("store {}", id)))?;
    Ok((StatusCode::OK, Json(dump(&store_schema(), &row)?)))
}

pub async fn delete_store(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id_str)?;
    if !StoreService::delete(&state.pool, id).await? {
        return Err(ApiError::NotFound(format!("store {}", id)));
    }
    Ok((StatusCode::OK, message("Store deleted")))
}

pub async fn list_stores(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let rows = StoreService::list(&state.pool).await?;
    Ok((StatusCode::OK, Json(dump(&store_schema(), &rows)?)))
}

pub async fn create_store(
    State(state): State<AppState>,
    MergedInput(data): MergedInput,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let loaded = store_schema().load(&data).map_err(ApiError::Validation)?;
    let name = loaded
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::BadRequest("name is required".into()))?;
    let row = StoreService::insert(&state.pool, name).await?;
    Ok((StatusCode::CREATED, Json(dump(&store_schema(), &row)?)))
}
