//! Shared application state for all routes.

use crate::docs::ApiDocs;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Documentation map built once at startup from the registered routes.
    pub docs: Arc<ApiDocs>,
}
