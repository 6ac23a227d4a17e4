//! Environment-driven settings.

/// Runtime settings with defaults suitable for local development.
#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    /// URL path the documentation map is served at.
    pub docs_path: String,
    pub docs_title: String,
    pub docs_enabled: bool,
}

impl Settings {
    /// Read settings from `DATABASE_URL`, `BIND_ADDR`, `DOCS_PATH`,
    /// `DOCS_TITLE`, and `DOCS_ENABLED`.
    pub fn from_env() -> Self {
        Settings {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/storefront".into()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            docs_path: std::env::var("DOCS_PATH")
                .map(|p| normalize_path(&p))
                .unwrap_or_else(|_| "/docs".into()),
            docs_title: std::env::var("DOCS_TITLE").unwrap_or_else(|_| "Storefront API".into()),
            docs_enabled: std::env::var("DOCS_ENABLED")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
        }
    }
}

/// Ensure a leading slash so the value is usable as an axum route path.
fn normalize_path(p: &str) -> String {
    let p = p.trim();
    if p.starts_with('/') {
        p.to_string()
    } else {
        format!("/{}", p)
    }
}

/// Only the listed spellings count as true; anything unrecognized is false.
fn parse_bool(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_adds_leading_slash() {
        assert_eq!(normalize_path("docs"), "/docs");
        assert_eq!(normalize_path("/api/docs"), "/api/docs");
        assert_eq!(normalize_path("  spec "), "/spec");
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("Yes"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("OFF"));
    }

    #[test]
    fn parse_bool_treats_unknown_as_false() {
        assert!(!parse_bool("maybe"));
        assert!(!parse_bool("falsey"));
        assert!(!parse_bool(""));
    }
}
