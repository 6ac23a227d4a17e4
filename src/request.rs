//! Request data gathering: values from path, query, header, cookie, and JSON
//! body locations merged into one case-insensitive mapping for schema load.

use crate::error::ApiError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, RawPathParams, Request},
    http::HeaderMap,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// String-keyed map with ASCII-case-insensitive keys. Keys are stored
/// lowercased, matching how HTTP header names arrive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CiMap {
    inner: HashMap<String, Value>,
}

impl CiMap {
    pub fn new() -> Self {
        CiMap {
            inner: HashMap::new(),
        }
    }

    pub fn from_object(obj: &Map<String, Value>) -> Self {
        let mut out = CiMap::new();
        for (k, v) in obj {
            out.insert(k, v.clone());
        }
        out
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.inner.insert(key.to_ascii_lowercase(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(&key.to_ascii_lowercase())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(&key.to_ascii_lowercase())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.inner.remove(&key.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.iter()
    }
}

/// Parse the `Cookie` header into name/value pairs.
pub fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .map(|c| {
            c.split(';')
                .filter_map(|pair| {
                    let mut parts = pair.trim().splitn(2, '=');
                    let name = parts.next()?.trim();
                    if name.is_empty() {
                        return None;
                    }
                    let value = parts.next().unwrap_or("").trim();
                    Some((name.to_string(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Merge request data from all locations into one case-insensitive mapping.
/// Order is path, query, header, cookie, JSON body; a later location
/// overwrites an earlier one. Non-object bodies are rejected.
pub fn merge_request(
    path: &[(String, String)],
    query: &[(String, String)],
    headers: &HeaderMap,
    cookies: &[(String, String)],
    body: Option<Value>,
) -> Result<CiMap, ApiError> {
    let mut out = CiMap::new();
    for (k, v) in path {
        out.insert(k, Value::String(v.clone()));
    }
    for (k, v) in query {
        out.insert(k, Value::String(v.clone()));
    }
    for (name, value) in headers {
        // non-UTF-8 header values are skipped
        if let Ok(s) = value.to_str() {
            out.insert(name.as_str(), Value::String(s.to_string()));
        }
    }
    for (k, v) in cookies {
        out.insert(k, Value::String(v.clone()));
    }
    if let Some(body) = body {
        match body {
            Value::Object(obj) => {
                for (k, v) in obj {
                    out.insert(&k, v);
                }
            }
            _ => return Err(ApiError::BadRequest("body must be a JSON object".into())),
        }
    }
    Ok(out)
}

/// Extractor gathering all request locations into a [`CiMap`]. Handlers pass
/// the result to a schema's `load` for validation.
pub struct MergedInput(pub CiMap);

#[async_trait]
impl<S> FromRequest<S> for MergedInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let path: Vec<(String, String)> = match RawPathParams::from_request_parts(&mut parts, state).await {
            Ok(params) => params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            Err(_) => Vec::new(),
        };
        let query: Vec<(String, String)> = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();
        let headers = parts.headers.clone();
        let cookies = parse_cookies(&headers);

        let req = Request::from_parts(parts, body);
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::BadRequest("unable to read request body".into()))?;
        let body = if bytes.is_empty() {
            None
        } else {
            Some(
                serde_json::from_slice(&bytes)
                    .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))?,
            )
        };

        let merged = merge_request(&path, &query, &headers, &cookies, body)?;
        tracing::debug!(keys = merged.len(), "merged request data");
        Ok(MergedInput(merged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn cimap_lookup_is_case_insensitive() {
        let mut m = CiMap::new();
        m.insert("X-Store-Name", json!("corner"));
        assert_eq!(m.get("x-store-name"), Some(&json!("corner")));
        assert!(m.contains_key("X-STORE-NAME"));
        assert_eq!(m.remove("x-Store-Name"), Some(json!("corner")));
        assert!(m.is_empty());
    }

    #[test]
    fn parse_cookies_splits_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("session=abc; Theme=dark ; flag"));
        let cookies = parse_cookies(&headers);
        assert_eq!(
            cookies,
            vec![
                ("session".to_string(), "abc".to_string()),
                ("Theme".to_string(), "dark".to_string()),
                ("flag".to_string(), "".to_string()),
            ]
        );
    }

    #[test]
    fn parse_cookies_absent_header() {
        assert!(parse_cookies(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn merge_body_overwrites_earlier_locations() {
        let mut headers = HeaderMap::new();
        headers.insert("name", HeaderValue::from_static("from-header"));
        let query = vec![("name".to_string(), "from-query".to_string())];
        let body = json!({"name": "from-body"});
        let merged = merge_request(&[], &query, &headers, &[], Some(body)).unwrap();
        assert_eq!(merged.get("name"), Some(&json!("from-body")));
    }

    #[test]
    fn merge_cookie_overwrites_header() {
        let mut headers = HeaderMap::new();
        headers.insert("theme", HeaderValue::from_static("light"));
        let cookies = vec![("Theme".to_string(), "dark".to_string())];
        let merged = merge_request(&[], &[], &headers, &cookies, None).unwrap();
        assert_eq!(merged.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn merge_skips_non_utf8_header_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-opaque", HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        headers.insert("name", HeaderValue::from_static("readable"));
        let merged = merge_request(&[], &[], &headers, &[], None).unwrap();
        assert!(merged.get("x-opaque").is_none());
        assert_eq!(merged.get("name"), Some(&json!("readable")));
    }

    #[test]
    fn merge_rejects_non_object_body() {
        let err = merge_request(&[], &[], &HeaderMap::new(), &[], Some(json!([1, 2]))).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn merge_keeps_path_values_as_strings() {
        let path = vec![("store_id".to_string(), "42".to_string())];
        let merged = merge_request(&path, &[], &HeaderMap::new(), &[], None).unwrap();
        assert_eq!(merged.get("STORE_ID"), Some(&json!("42")));
    }
}
