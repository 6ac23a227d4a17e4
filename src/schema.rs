//! Declarative request/response schemas: load-side validation, dump-side
//! projection, and field introspection for the docs tree.

use crate::request::CiMap;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Nested schemas in `describe` output are truncated below this depth.
pub const MAX_DESCRIBE_DEPTH: usize = 3;

/// One invalid field with its messages. `field` uses dotted/indexed paths for
/// nested and list elements (e.g. `address.city`, `tags[2]`).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

#[derive(Clone, Debug)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Nested(Arc<Schema>),
    List(Box<FieldKind>),
}

impl FieldKind {
    fn type_name(&self) -> String {
        match self {
            FieldKind::String => "string".into(),
            FieldKind::Integer => "integer".into(),
            FieldKind::Float => "float".into(),
            FieldKind::Boolean => "boolean".into(),
            FieldKind::Nested(_) => "nested".into(),
            FieldKind::List(inner) => format!("list of {}", inner.type_name()),
        }
    }
}

/// Per-field constraints applied after type coercion.
#[derive(Clone, Debug, Default)]
pub struct FieldRules {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl FieldRules {
    fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Present only in dumped output; ignored when loading request data.
    pub dump_only: bool,
    pub rules: FieldRules,
}

impl Field {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Field {
            name: name.to_string(),
            kind,
            required: false,
            dump_only: false,
            rules: FieldRules::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn dump_only(mut self) -> Self {
        self.dump_only = true;
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.rules.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.rules.max_length = Some(n);
        self
    }

    pub fn pattern(mut self, p: &str) -> Self {
        self.rules.pattern = Some(p.to_string());
        self
    }

    pub fn minimum(mut self, n: f64) -> Self {
        self.rules.minimum = Some(n);
        self
    }

    pub fn maximum(mut self, n: f64) -> Self {
        self.rules.maximum = Some(n);
        self
    }
}

/// Named collection of field definitions. Drives request validation (`load`),
/// response projection (`dump`), and the docs tree (`describe`).
#[derive(Clone, Debug)]
pub struct Schema {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: &str) -> Self {
        Schema {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate and coerce merged request data against the declared fields.
    /// Undeclared keys are ignored; `dump_only` fields are skipped. Returns
    /// the coerced object or all field errors collected in one pass.
    pub fn load(&self, data: &CiMap) -> Result<Map<String, Value>, Vec<FieldError>> {
        let mut out = Map::new();
        let mut errors = Vec::new();
        for field in &self.fields {
            if field.dump_only {
                continue;
            }
            let value = data.get(&field.name);
            let missing = value.is_none() || value == Some(&Value::Null);
            if missing {
                if field.required {
                    errors.push(FieldError {
                        field: field.name.clone(),
                        messages: vec![format!("{} is required", field.name)],
                    });
                }
                continue;
            }
            match coerce(&field.name, value.unwrap_or(&Value::Null), &field.kind, &field.rules) {
                Ok(v) => {
                    out.insert(field.name.clone(), v);
                }
                Err(mut field_errors) => errors.append(&mut field_errors),
            }
        }
        if errors.is_empty() {
            Ok(out)
        } else {
            Err(errors)
        }
    }

    /// Project a row (object, or array of objects) onto the declared fields.
    /// Unknown keys are dropped; declared keys absent from the row are omitted.
    pub fn dump(&self, value: &Value) -> Value {
        match value {
            Value::Array(rows) => Value::Array(rows.iter().map(|r| self.dump(r)).collect()),
            Value::Object(obj) => {
                let mut out = Map::new();
                for field in &self.fields {
                    if let Some(v) = obj.get(&field.name) {
                        out.insert(field.name.clone(), dump_value(v, &field.kind));
                    }
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }

    /// Documentation tree of the field definitions. Nested schemas recurse
    /// until `max_depth`; deeper levels are replaced by a truncation marker.
    pub fn describe(&self, max_depth: usize) -> Value {
        let mut fields = Map::new();
        for field in &self.fields {
            fields.insert(field.name.clone(), describe_field(field, max_depth));
        }
        serde_json::json!({
            "schema": self.name,
            "fields": fields,
        })
    }
}

fn dump_value(value: &Value, kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Nested(schema) => schema.dump(value),
        FieldKind::List(inner) => match value {
            Value::Array(items) => Value::Array(items.iter().map(|v| dump_value(v, inner)).collect()),
            other => other.clone(),
        },
        _ => value.clone(),
    }
}

fn describe_field(field: &Field, max_depth: usize) -> Value {
    let mut out = Map::new();
    out.insert("type".into(), Value::String(field.kind.type_name()));
    out.insert("required".into(), Value::Bool(field.required));
    if field.dump_only {
        out.insert("dump_only".into(), Value::Bool(true));
    }
    if !field.rules.is_empty() {
        out.insert("rules".into(), describe_rules(&field.rules));
    }
    if let Some(schema) = innermost_schema(&field.kind) {
        let nested = if max_depth == 0 {
            Value::String("...".into())
        } else {
            schema.describe(max_depth - 1)
        };
        out.insert("of".into(), nested);
    }
    Value::Object(out)
}

fn innermost_schema(kind: &FieldKind) -> Option<&Arc<Schema>> {
    match kind {
        FieldKind::Nested(schema) => Some(schema),
        FieldKind::List(inner) => innermost_schema(inner),
        _ => None,
    }
}

fn describe_rules(rules: &FieldRules) -> Value {
    let mut out = Map::new();
    if let Some(n) = rules.min_length {
        out.insert("min_length".into(), n.into());
    }
    if let Some(n) = rules.max_length {
        out.insert("max_length".into(), n.into());
    }
    if let Some(ref p) = rules.pattern {
        out.insert("pattern".into(), Value::String(p.clone()));
    }
    if let Some(n) = rules.minimum {
        out.insert("minimum".into(), serde_json::json!(n));
    }
    if let Some(n) = rules.maximum {
        out.insert("maximum".into(), serde_json::json!(n));
    }
    Value::Object(out)
}

/// Coerce one value to the field kind. Values merged from path, query, header,
/// and cookie locations arrive as strings, so scalar kinds also accept their
/// string form.
fn coerce(path: &str, value: &Value, kind: &FieldKind, rules: &FieldRules) -> Result<Value, Vec<FieldError>> {
    let fail = |msg: String| {
        Err(vec![FieldError {
            field: path.to_string(),
            messages: vec![msg],
        }])
    };
    match kind {
        FieldKind::String => match value {
            Value::String(s) => {
                if let Err(msgs) = check_string_rules(path, s, rules) {
                    return Err(msgs);
                }
                Ok(Value::String(s.clone()))
            }
            _ => fail(format!("{} must be a string", path)),
        },
        FieldKind::Integer => {
            let n = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            match n {
                Some(n) => {
                    if let Err(msgs) = check_range(path, n as f64, rules) {
                        return Err(msgs);
                    }
                    Ok(Value::Number(n.into()))
                }
                None => fail(format!("{} must be an integer", path)),
            }
        }
        FieldKind::Float => {
            let n = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            match n {
                Some(n) => {
                    if let Err(msgs) = check_range(path, n, rules) {
                        return Err(msgs);
                    }
                    Ok(serde_json::json!(n))
                }
                None => fail(format!("{} must be a number", path)),
            }
        }
        FieldKind::Boolean => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => fail(format!("{} must be a boolean", path)),
        },
        FieldKind::Nested(schema) => match value {
            Value::Object(obj) => {
                let data = CiMap::from_object(obj);
                match schema.load(&data) {
                    Ok(out) => Ok(Value::Object(out)),
                    Err(errors) => Err(errors
                        .into_iter()
                        .map(|e| FieldError {
                            field: format!("{}.{}", path, e.field),
                            messages: e.messages,
                        })
                        .collect()),
                }
            }
            _ => fail(format!("{} must be an object", path)),
        },
        FieldKind::List(inner) => match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                let mut errors = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    match coerce(&format!("{}[{}]", path, i), item, inner, &FieldRules::default()) {
                        Ok(v) => out.push(v),
                        Err(mut e) => errors.append(&mut e),
                    }
                }
                if errors.is_empty() {
                    Ok(Value::Array(out))
                } else {
                    Err(errors)
                }
            }
            _ => fail(format!("{} must be an array", path)),
        },
    }
}

fn check_string_rules(path: &str, s: &str, rules: &FieldRules) -> Result<(), Vec<FieldError>> {
    let mut messages = Vec::new();
    if let Some(min) = rules.min_length {
        if s.chars().count() < min {
            messages.push(format!("{} must be at least {} characters", path, min));
        }
    }
    if let Some(max) = rules.max_length {
        if s.chars().count() > max {
            messages.push(format!("{} must be at most {} characters", path, max));
        }
    }
    if let Some(ref pattern) = rules.pattern {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(s) {
                    messages.push(format!("{} does not match required pattern", path));
                }
            }
            Err(_) => messages.push(format!("invalid pattern for {}", path)),
        }
    }
    if messages.is_empty() {
        Ok(())
    } else {
        Err(vec![FieldError {
            field: path.to_string(),
            messages,
        }])
    }
}

fn check_range(path: &str, n: f64, rules: &FieldRules) -> Result<(), Vec<FieldError>> {
    let mut messages = Vec::new();
    if let Some(min) = rules.minimum {
        if n < min {
            messages.push(format!("{} must be at least {}", path, min));
        }
    }
    if let Some(max) = rules.maximum {
        if n > max {
            messages.push(format!("{} must be at most {}", path, max));
        }
    }
    if messages.is_empty() {
        Ok(())
    } else {
        Err(vec![FieldError {
            field: path.to_string(),
            messages,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address_schema() -> Arc<Schema> {
        Arc::new(
            Schema::new("Address")
                .field(Field::new("city", FieldKind::String).required())
                .field(Field::new("zip", FieldKind::String).pattern(r"^\d{5}$")),
        )
    }

    fn store_like_schema() -> Schema {
        Schema::new("Store")
            .field(Field::new("id", FieldKind::Integer).dump_only())
            .field(Field::new("name", FieldKind::String).required().min_length(1).max_length(80))
            .field(Field::new("rating", FieldKind::Float).minimum(0.0).maximum(5.0))
            .field(Field::new("open", FieldKind::Boolean))
            .field(Field::new("address", FieldKind::Nested(address_schema())))
            .field(Field::new("tags", FieldKind::List(Box::new(FieldKind::String))))
    }

    fn ci(pairs: &[(&str, Value)]) -> CiMap {
        let mut m = CiMap::new();
        for (k, v) in pairs {
            m.insert(k, v.clone());
        }
        m
    }

    #[test]
    fn load_coerces_string_sources() {
        let schema = store_like_schema();
        let data = ci(&[
            ("name", json!("Corner Shop")),
            ("rating", json!("4.5")),
            ("open", json!("TRUE")),
        ]);
        let out = schema.load(&data).unwrap();
        assert_eq!(out["name"], json!("Corner Shop"));
        assert_eq!(out["rating"], json!(4.5));
        assert_eq!(out["open"], json!(true));
    }

    #[test]
    fn load_rejects_missing_required() {
        let schema = store_like_schema();
        let errors = schema.load(&ci(&[("open", json!(true))])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].messages, vec!["name is required"]);
    }

    #[test]
    fn load_treats_null_as_missing() {
        let schema = store_like_schema();
        let errors = schema.load(&ci(&[("name", Value::Null)])).unwrap_err();
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn load_skips_dump_only_and_undeclared() {
        let schema = store_like_schema();
        let data = ci(&[
            ("id", json!(99)),
            ("name", json!("A")),
            ("color", json!("red")),
        ]);
        let out = schema.load(&data).unwrap();
        assert!(!out.contains_key("id"));
        assert!(!out.contains_key("color"));
    }

    #[test]
    fn load_enforces_rules() {
        let schema = store_like_schema();
        let data = ci(&[("name", json!("")), ("rating", json!(9.0))]);
        let errors = schema.load(&data).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[1].messages, vec!["rating must be at most 5"]);
    }

    #[test]
    fn load_nested_errors_use_dotted_paths() {
        let schema = store_like_schema();
        let data = ci(&[
            ("name", json!("A")),
            ("address", json!({"zip": "abc"})),
        ]);
        let mut errors = schema.load(&data).unwrap_err();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        assert_eq!(errors[0].field, "address.city");
        assert_eq!(errors[1].field, "address.zip");
    }

    #[test]
    fn load_list_errors_use_indexed_paths() {
        let schema = store_like_schema();
        let data = ci(&[("name", json!("A")), ("tags", json!(["ok", 3]))]);
        let errors = schema.load(&data).unwrap_err();
        assert_eq!(errors[0].field, "tags[1]");
    }

    #[test]
    fn empty_schema_loads_empty() {
        let schema = Schema::new("Empty");
        assert!(schema.load(&CiMap::new()).unwrap().is_empty());
    }

    #[test]
    fn dump_projects_declared_fields() {
        let schema = store_like_schema();
        let row = json!({"id": 7, "name": "Corner Shop", "secret": "x"});
        let out = schema.dump(&row);
        assert_eq!(out, json!({"id": 7, "name": "Corner Shop"}));
    }

    #[test]
    fn dump_recurses_into_nested_and_lists() {
        let schema = store_like_schema();
        let rows = json!([{"name": "A", "address": {"city": "Oslo", "internal": 1}}]);
        let out = schema.dump(&rows);
        assert_eq!(out[0]["address"], json!({"city": "Oslo"}));
    }

    #[test]
    fn describe_truncates_at_depth() {
        let inner = Arc::new(
            Schema::new("Inner").field(Field::new("child", FieldKind::Nested(address_schema()))),
        );
        let outer = Schema::new("Outer").field(Field::new("inner", FieldKind::Nested(inner)));
        let tree = outer.describe(1);
        assert_eq!(tree["fields"]["inner"]["of"]["schema"], json!("Inner"));
        assert_eq!(tree["fields"]["inner"]["of"]["fields"]["child"]["of"], json!("..."));
    }

    #[test]
    fn describe_lists_rules_and_flags() {
        let tree = store_like_schema().describe(MAX_DESCRIBE_DEPTH);
        assert_eq!(tree["fields"]["id"]["dump_only"], json!(true));
        assert_eq!(tree["fields"]["name"]["rules"]["max_length"], json!(80));
        assert_eq!(tree["fields"]["tags"]["type"], json!("list of string"));
    }
}
