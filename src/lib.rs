//! Storefront: store REST backend with schema-validated requests and a
//! self-generated docs endpoint.

pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod state;

pub use config::Settings;
pub use db::{ensure_database_exists, ensure_store_table};
pub use docs::{docs_routes, ApiDocs, RouteDoc};
pub use error::ApiError;
pub use request::{CiMap, MergedInput};
pub use routes::{common_routes, store_route_docs, store_routes};
pub use schema::{Field, FieldKind, Schema};
pub use service::{StoreRow, StoreService};
pub use state::AppState;
