//! Configuration module for the gallery backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default upstream API base. Overridable so tests can point at a local mock.
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Media store account name (required for any upstream call)
    pub cloud_name: Option<String>,
    /// Media store API key
    pub api_key: Option<String>,
    /// Media store API secret (basic-auth password and signing secret)
    pub api_secret: Option<String>,
    /// Tag marking a photo as publicly visible
    pub gallery_tag: String,
    /// Tag marking a photo as awaiting moderation
    pub pending_tag: String,
    /// Base URL of the media store API
    pub api_base: String,
    /// Shared secret for admin operations (required for admin routes)
    pub admin_key: Option<String>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Directory holding the built front end
    pub static_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let cloud_name = non_empty(env::var("CLOUDINARY_CLOUD_NAME").ok());
        let api_key = non_empty(env::var("CLOUDINARY_API_KEY").ok());
        let api_secret = non_empty(env::var("CLOUDINARY_API_SECRET").ok());

        let gallery_tag =
            env::var("CLOUDINARY_GALLERY_TAG").unwrap_or_else(|_| "wedding-gallery".to_string());

        // The moderation queue tag is derived from the gallery tag unless set.
        let pending_tag = env::var("CLOUDINARY_PENDING_TAG")
            .unwrap_or_else(|_| format!("{}-pending", gallery_tag));

        let api_base =
            env::var("CLOUDINARY_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let admin_key = non_empty(env::var("PHOTOS_ADMIN_KEY").ok());

        let bind_addr = env::var("PHOTOS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .expect("Invalid PHOTOS_BIND_ADDR format");

        let static_dir = env::var("PHOTOS_STATIC_DIR")
            .unwrap_or_else(|_| "./dist".to_string())
            .into();

        let log_level = env::var("PHOTOS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            cloud_name,
            api_key,
            api_secret,
            gallery_tag,
            pending_tag,
            api_base,
            admin_key,
            bind_addr,
            static_dir,
            log_level,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
