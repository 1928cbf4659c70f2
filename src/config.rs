//! Application configuration
//!
//! All runtime configuration is read from the environment exactly once, in
//! `main`, and carried into handlers through [`AppConfig`]. Components never
//! consult `env::var` at call sites.

use std::env;
use std::path::PathBuf;

/// Runtime configuration shared by every request handler
///
/// # Environment Variables
///
/// - `PORT` - Server port number (default: 8080)
/// - `DATABASE_URL` - Path to the database file (default: "data.db")
/// - `UPLOAD_DIR` - Directory holding uploaded listing images (default: "uploads")
/// - `BASE_URL` - Fixed public base URL for image links; when unset the
///   base URL is derived per request from the `Host` header
/// - `JWT_SECRET` - HS256 signing secret for bearer tokens
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server port number
    pub port: u16,

    /// Path to the embedded database file
    pub db_path: String,

    /// Directory where uploaded image files are stored
    pub upload_dir: PathBuf,

    /// Optional fixed base URL used when resolving stored image references
    pub base_url: Option<String>,

    /// Secret used to sign and verify bearer tokens
    pub jwt_secret: String,
}

impl AppConfig {
    /// Builds the configuration from environment variables
    ///
    /// # Panics
    ///
    /// Panics when `JWT_SECRET` is unset: the server must never start with
    /// token verification silently disabled.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8080);

        let db_path = env::var("DATABASE_URL").unwrap_or_else(|_| "data.db".to_string());

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        let base_url = env::var("BASE_URL").ok().filter(|value| !value.is_empty());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        Self {
            port,
            db_path,
            upload_dir,
            base_url,
            jwt_secret,
        }
    }
}
