//! Tests for bearer-token verification and admin enforcement

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use tower::ServiceExt;

use realty::config::AppConfig;
use realty::database::{init_db, AppState};
use realty::middleware::{issue_token, Claims};
use realty::route::create_app;

const TEST_SECRET: &str = "test-secret";
const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

struct TestApp {
    app: axum::Router,
    _temp_db: NamedTempFile,
    _upload_guard: TempDir,
}

fn setup_test_app() -> TestApp {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let upload_guard = tempfile::tempdir().expect("Failed to create upload dir");

    let config = AppConfig {
        port: 0,
        db_path: temp_db.path().to_str().unwrap().to_string(),
        upload_dir: upload_guard.path().to_path_buf(),
        base_url: None,
        jwt_secret: TEST_SECRET.to_string(),
    };

    let db = init_db(&config.db_path).expect("Failed to initialize test database");
    let state = AppState {
        db: Arc::new(db),
        config: Arc::new(config),
    };

    TestApp {
        app: create_app(state),
        _temp_db: temp_db,
        _upload_guard: upload_guard,
    }
}

/// Helper function to parse response body as JSON
async fn response_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

fn multipart_property_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in [
        ("title", "Loft"),
        ("price", "1200"),
        ("city", "Denver"),
        ("type", "Apartment"),
        ("listingType", "For Rent"),
        ("address", "12 Main St"),
    ] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nfake-image-bytes\r\n--{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );

    let mut builder = Request::builder().method(method).uri(uri).header(
        "content-type",
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_create_property_without_token_is_rejected() {
    let test = setup_test_app();

    let response = test
        .app
        .oneshot(multipart_property_request("POST", "/properties", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid or missing authorization header");
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let test = setup_test_app();

    let response = test
        .app
        .oneshot(multipart_property_request(
            "POST",
            "/properties",
            Some("not-a-jwt"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_is_rejected() {
    let test = setup_test_app();

    let token = issue_token(1, true, "some-other-secret").unwrap();
    let response = test
        .app
        .oneshot(multipart_property_request(
            "POST",
            "/properties",
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let test = setup_test_app();

    let claims = Claims {
        sub: 1,
        is_admin: true,
        exp: (Utc::now() - Duration::hours(2)).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let response = test
        .app
        .oneshot(multipart_property_request(
            "POST",
            "/properties",
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticated_non_admin_can_create_but_not_mutate() {
    let test = setup_test_app();

    let token = issue_token(5, false, TEST_SECRET).unwrap();

    // Creation needs authentication only
    let response = test
        .app
        .clone()
        .oneshot(multipart_property_request(
            "POST",
            "/properties",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Mutation additionally needs the admin flag
    let response = test
        .app
        .clone()
        .oneshot(multipart_property_request(
            "PUT",
            "/properties/1",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["message"], "Not Authorized");

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/properties/1")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The record is untouched
    let response = test
        .app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/properties/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_token_can_mutate() {
    let test = setup_test_app();

    let admin = issue_token(1, true, TEST_SECRET).unwrap();

    let response = test
        .app
        .clone()
        .oneshot(multipart_property_request(
            "POST",
            "/properties",
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test
        .app
        .clone()
        .oneshot(multipart_property_request(
            "PUT",
            "/properties/1",
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/properties/1")
                .header("Authorization", format!("Bearer {}", admin))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_read_routes_require_token() {
    let test = setup_test_app();

    for uri in [
        "/inquiries/byUser",
        "/inquiries/getAllInquiry",
        "/general-inquiries/getAllgeneralInquiries",
    ] {
        let response = test
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");
    }
}

#[tokio::test]
async fn test_public_routes_need_no_token() {
    let test = setup_test_app();

    for uri in ["/properties", "/properties/search", "/properties/filters"] {
        let response = test
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "uri: {uri}");
    }
}
