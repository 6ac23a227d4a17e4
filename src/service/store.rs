//! Store persistence over PostgreSQL.

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Clone, Debug, Serialize, FromRow)]
pub struct StoreRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct StoreService;

impl StoreService {
    /// Fetch one store by id. Returns None when absent.
    pub async fn fetch(pool: &PgPool, id: i64) -> Result<Option<StoreRow>, ApiError> {
        tracing::debug!(id, "fetch store");
        let row = sqlx::query_as::<_, StoreRow>("SELECT id, name, created_at FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<StoreRow>, ApiError> {
        tracing::debug!("list stores");
        let rows = sqlx::query_as::<_, StoreRow>("SELECT id, name, created_at FROM stores ORDER BY id")
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    /// Insert one store inside a transaction. A unique-name violation maps to
    /// an integrity error; any other failure during insert maps to an
    /// internal error.
    pub async fn insert(pool: &PgPool, name: &str) -> Result<StoreRow, ApiError> {
        tracing::debug!(name, "insert store");
        let mut tx = pool.begin().await?;
        let res = sqlx::query_as::<_, StoreRow>(
            "INSERT INTO stores (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await;
        match res {
            Ok(row) => {
                tx.commit().await?;
                Ok(row)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                if is_unique_violation(&e) {
                    Err(ApiError::Integrity("A store with that name already exists".into()))
                } else {
                    tracing::error!(error = %e, "store insert failed");
                    Err(ApiError::Internal("Error occurred while inserting the store".into()))
                }
            }
        }
    }

    /// Delete one store by id. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, ApiError> {
        tracing::debug!(id, "delete store");
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
