//! Process configuration, read once from the environment at startup.
//!
//! `main.rs` loads an optional `.env` file first, so every variable below can
//! live there during development. Values that fail to parse fall back to their
//! default with a warning instead of aborting the process.

use log::{info, warn};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Credentials for the Cloudinary upload API.
#[derive(Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding `feedback_links` and `feedback_submissions`.
    pub database_path: String,
    /// `None` when any of the three Cloudinary variables is missing.
    pub cloudinary: Option<CloudinaryCredentials>,
    /// Logical folder every uploaded image is filed under.
    pub upload_folder: String,
    pub max_image_bytes: usize,
    /// Upper bound for each database call and each upload.
    pub operation_timeout: Duration,
    /// Debug only: keep links alive after a successful submission.
    pub retain_links: bool,
    /// Expose the read-only `/api/submissions` routes.
    pub reporting_api: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_path: "feedback.sqlite".to_string(),
            cloudinary: None,
            upload_folder: "feedback-images".to_string(),
            max_image_bytes: 5 * 1024 * 1024,
            operation_timeout: Duration::from_secs(60),
            retain_links: false,
            reporting_api: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let cloudinary = match (
            lookup("CLOUDINARY_CLOUD_NAME"),
            lookup("CLOUDINARY_API_KEY"),
            lookup("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryCredentials {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        Self {
            host: lookup("HOST").unwrap_or(default.host),
            port: parse_or(&lookup, "PORT", default.port),
            database_path: lookup("DATABASE_PATH").unwrap_or(default.database_path),
            cloudinary,
            upload_folder: lookup("CLOUDINARY_FOLDER").unwrap_or(default.upload_folder),
            max_image_bytes: parse_or(&lookup, "FEEDBACK_MAX_IMAGE_BYTES", default.max_image_bytes),
            operation_timeout: Duration::from_secs(nonzero_or(
                &lookup,
                "FEEDBACK_OPERATION_TIMEOUT_SECS",
                default.operation_timeout.as_secs(),
            )),
            retain_links: parse_or(&lookup, "FEEDBACK_RETAIN_LINKS", default.retain_links),
            reporting_api: parse_or(&lookup, "FEEDBACK_REPORTING_API", default.reporting_api),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}' ({e}), using default: {default}");
            default
        }),
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

/// Like `parse_or`, but zero is rejected as well.
fn nonzero_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    match parse_or(lookup, key, default) {
        0 => {
            warn!("Invalid {key} value '0' (must be at least 1), using default: {default}");
            default
        }
        value => value,
    }
}
