//! Bearer-token authentication
//!
//! Protected routes are wrapped in [`auth_middleware`], which verifies the
//! HS256-signed bearer token and stores the decoded [`Claims`] in request
//! extensions. Admin enforcement happens inside the mutation handlers, so
//! an authenticated non-admin still receives the API's own 401 envelope
//! rather than a generic rejection.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::AppState;

/// Identity carried by a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id of the token holder
    pub sub: u64,

    /// Elevated privilege flag required for listing mutation
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,

    /// Expiry as a Unix timestamp
    pub exp: i64,
}

/// Signs a token for the given identity, valid for 24 hours
///
/// Login lives in an external service; this helper exists for tooling and
/// tests that need a valid token against a known secret.
pub fn issue_token(
    user_id: u64,
    is_admin: bool,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id,
        is_admin,
        exp: (Utc::now() + Duration::hours(24)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decodes and validates a bearer token, including expiry
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Extracts claims from an optional bearer token without rejecting
///
/// Used by the public inquiry submission endpoint, where an accompanying
/// token attributes the inquiry to the caller but is never required.
pub fn optional_claims(headers: &HeaderMap, secret: &str) -> Option<Claims> {
    bearer_token(headers).and_then(|token| verify_token(token, secret).ok())
}

/// Middleware guarding protected routes
///
/// Rejects requests without a valid `Authorization: Bearer <token>` header
/// and passes the decoded claims to the handler via request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let unauthorized = |message: &str| {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "message": message
            })),
        )
            .into_response()
    };

    let Some(token) = bearer_token(&headers) else {
        return Err(unauthorized("Invalid or missing authorization header"));
    };

    match verify_token(token, &state.config.jwt_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(error) => {
            tracing::debug!(%error, "rejected bearer token");
            Err(unauthorized("Unauthorized"))
        }
    }
}
