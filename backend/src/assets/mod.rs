//! External image hosting.
//!
//! Uploaded feedback images never touch the database: they are pushed to the
//! asset store and only the returned public URL is kept on the submission.

pub mod cloudinary;

use async_trait::async_trait;
use thiserror::Error;

/// An image received with a submission, already size- and type-checked.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Durable public https URL.
    pub secure_url: String,
    pub public_id: String,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset store credentials are not configured")]
    NotConfigured,

    #[error("asset store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("asset store rejected the upload (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected asset store response: {0}")]
    MalformedResponse(String),

    #[error("asset upload timed out")]
    TimedOut,
}

impl From<tokio::time::error::Elapsed> for AssetError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AssetError::TimedOut
    }
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Uploads one image resource into `folder`. Never retried by callers.
    async fn upload_image(
        &self,
        folder: &str,
        image: &ImageUpload,
    ) -> Result<UploadedAsset, AssetError>;
}

/// Stand-in used when no credentials are configured: every upload fails, while
/// submissions without an image keep working.
pub struct DisabledAssetStore;

#[async_trait]
impl AssetStore for DisabledAssetStore {
    async fn upload_image(
        &self,
        _folder: &str,
        _image: &ImageUpload,
    ) -> Result<UploadedAsset, AssetError> {
        Err(AssetError::NotConfigured)
    }
}
