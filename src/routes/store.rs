//! Store resource routes and their documentation entries.

use crate::docs::RouteDoc;
use crate::handlers::store::{create_store, delete_store, get_store, list_stores, store_schema};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn store_routes(state: AppState) -> Router {
    Router::new()
        .route("/store", get(list_stores).post(create_store))
        .route("/store/:store_id", get(get_store).delete(delete_store))
        .with_state(state)
}

/// Documentation entries for the store resource, collected into [`crate::docs::ApiDocs`]
/// at startup.
pub fn store_route_docs() -> Vec<RouteDoc> {
    let schema = store_schema();
    vec![
        RouteDoc::new("GET", "/store", "List all stores").output(schema.clone()),
        RouteDoc::new("POST", "/store", "Create a store")
            .status(201)
            .input(schema.clone())
            .output(schema.clone()),
        RouteDoc::new("GET", "/store/{store_id}", "Fetch one store by id").output(schema),
        RouteDoc::new("DELETE", "/store/{store_id}", "Delete one store by id"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_cover_all_store_operations() {
        let docs = store_route_docs();
        assert_eq!(docs.len(), 4);
        let post = docs.iter().find(|d| d.method == "POST").unwrap();
        assert_eq!(post.status, 201);
        assert!(post.input.is_some());
        let delete = docs.iter().find(|d| d.method == "DELETE").unwrap();
        assert!(delete.input.is_none() && delete.output.is_none());
    }
}
