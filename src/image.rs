//! Image reference resolution
//!
//! The database stores bare filenames; clients receive absolute URLs.
//! Resolution is a pure transform applied at the response boundary, never
//! inside the persisted record.

use axum::http::{header, HeaderMap};

use crate::config::AppConfig;

/// Well-known path prefix under which uploaded images are served
pub const UPLOADS_PATH: &str = "/uploads";

/// Expands a stored image reference into a client-facing absolute URL
///
/// - empty reference -> `None`
/// - reference already carrying a URL scheme -> returned unchanged, which
///   makes the transform idempotent under repeated application
/// - bare filename -> `{base_url}/uploads/{filename}`
pub fn resolve_image_url(base_url: &str, stored: &str) -> Option<String> {
    if stored.is_empty() {
        return None;
    }
    if stored.starts_with("http") {
        return Some(stored.to_string());
    }
    Some(format!(
        "{}{}/{}",
        base_url.trim_end_matches('/'),
        UPLOADS_PATH,
        stored
    ))
}

/// Derives the base URL for the current request
///
/// A configured `BASE_URL` wins; otherwise the URL is rebuilt from the
/// inbound `Host` header. Never hardcoded.
pub fn request_base_url(config: &AppConfig, headers: &HeaderMap) -> String {
    if let Some(base) = &config.base_url {
        return base.trim_end_matches('/').to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");

    format!("http://{}", host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reference_resolves_to_none() {
        assert_eq!(resolve_image_url("http://localhost:8080", ""), None);
    }

    #[test]
    fn bare_filename_gets_base_and_prefix() {
        assert_eq!(
            resolve_image_url("http://localhost:8080", "villa.jpg"),
            Some("http://localhost:8080/uploads/villa.jpg".to_string())
        );
    }

    #[test]
    fn trailing_slash_on_base_is_trimmed() {
        assert_eq!(
            resolve_image_url("http://localhost:8080/", "villa.jpg"),
            Some("http://localhost:8080/uploads/villa.jpg".to_string())
        );
    }

    #[test]
    fn absolute_references_pass_through() {
        for stored in [
            "http://cdn.example.com/villa.jpg",
            "https://cdn.example.com/villa.jpg",
        ] {
            assert_eq!(
                resolve_image_url("http://localhost:8080", stored),
                Some(stored.to_string())
            );
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let base = "http://localhost:8080";
        let once = resolve_image_url(base, "villa.jpg").unwrap();
        let twice = resolve_image_url(base, &once).unwrap();
        assert_eq!(once, twice);
    }
}
