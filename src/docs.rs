//! API documentation registry. Resource modules contribute their route docs
//! at startup; the collected map is rendered once and served as JSON at a
//! configurable URL.

use crate::schema::{Schema, MAX_DESCRIBE_DEPTH};
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Documentation for one registered route.
#[derive(Clone, Debug)]
pub struct RouteDoc {
    pub method: &'static str,
    pub path: String,
    pub description: String,
    /// Status code of the success response.
    pub status: u16,
    pub input: Option<Arc<Schema>>,
    pub output: Option<Arc<Schema>>,
}

impl RouteDoc {
    pub fn new(method: &'static str, path: &str, description: &str) -> Self {
        RouteDoc {
            method,
            path: path.to_string(),
            description: description.to_string(),
            status: 200,
            input: None,
            output: None,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn input(mut self, schema: Arc<Schema>) -> Self {
        self.input = Some(schema);
        self
    }

    pub fn output(mut self, schema: Arc<Schema>) -> Self {
        self.output = Some(schema);
        self
    }
}

/// All documented routes, rendered once at build time.
pub struct ApiDocs {
    pub title: String,
    pub version: String,
    routes: Vec<RouteDoc>,
    rendered: Value,
}

impl ApiDocs {
    pub fn build(title: &str, version: &str, routes: Vec<RouteDoc>) -> Self {
        let rendered = render(title, version, &routes);
        tracing::info!(routes = routes.len(), "built api docs");
        ApiDocs {
            title: title.to_string(),
            version: version.to_string(),
            routes,
            rendered,
        }
    }

    pub fn routes(&self) -> &[RouteDoc] {
        &self.routes
    }

    /// The pre-rendered documentation map.
    pub fn as_json(&self) -> &Value {
        &self.rendered
    }
}

/// Documentation map keyed by path, then method. Schema trees are bounded to
/// [`MAX_DESCRIBE_DEPTH`].
fn render(title: &str, version: &str, routes: &[RouteDoc]) -> Value {
    let mut paths: Map<String, Value> = Map::new();
    for doc in routes {
        let mut entry = Map::new();
        entry.insert("description".into(), Value::String(doc.description.clone()));
        entry.insert("status".into(), doc.status.into());
        if let Some(ref schema) = doc.input {
            entry.insert("request".into(), schema.describe(MAX_DESCRIBE_DEPTH));
        }
        if let Some(ref schema) = doc.output {
            entry.insert("response".into(), schema.describe(MAX_DESCRIBE_DEPTH));
        }
        let methods = paths
            .entry(doc.path.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(methods) = methods {
            methods.insert(doc.method.to_string(), Value::Object(entry));
        }
    }
    serde_json::json!({
        "title": title,
        "version": version,
        "paths": paths,
    })
}

async fn serve_docs(State(state): State<AppState>) -> Json<Value> {
    Json(state.docs.as_json().clone())
}

/// Serve the documentation map at `path` (e.g. `/docs`). Callers skip
/// mounting this router when docs are disabled.
pub fn docs_routes(state: AppState, path: &str) -> Router {
    Router::new().route(path, get(serve_docs)).with_state(state)
}
