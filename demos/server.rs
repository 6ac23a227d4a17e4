//! Demo server: ensures the database and stores table exist, builds the docs
//! map from the registered routes, and mounts common, store, and docs routes.

use axum::Router;
use std::sync::Arc;
use storefront::{
    common_routes, docs_routes, ensure_database_exists, ensure_store_table, store_route_docs,
    store_routes, ApiDocs, AppState, Settings,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("storefront=info".parse()?))
        .init();

    let settings = Settings::from_env();
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;
    ensure_store_table(&pool).await?;

    let docs = ApiDocs::build(&settings.docs_title, env!("CARGO_PKG_VERSION"), store_route_docs());
    let state = AppState {
        pool,
        docs: Arc::new(docs),
    };

    let mut app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(store_routes(state.clone()));
    if settings.docs_enabled {
        app = app.merge(docs_routes(state, &settings.docs_path));
    }
    let app = app.layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(1024 * 1024)));

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
