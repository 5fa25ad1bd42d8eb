//! Signed uploads to the Cloudinary image API.
//!
//! Requests go to `POST https://api.cloudinary.com/v1_1/{cloud}/image/upload`
//! as multipart forms. The signature is the SHA-256 of the signed parameters
//! (sorted, `key=value` joined by `&`) followed by the API secret.

use super::{AssetError, AssetStore, ImageUpload, UploadedAsset};
use crate::config::CloudinaryCredentials;
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct CloudinaryStore {
    client: Client,
    credentials: CloudinaryCredentials,
}

impl CloudinaryStore {
    pub fn new(credentials: CloudinaryCredentials, timeout: Duration) -> Result<Self, AssetError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/image/upload", API_BASE, self.credentials.cloud_name)
    }
}

/// Canonical string the signature is computed over.
fn string_to_sign(params: &[(&str, &str)]) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn parse_response(status: u16, body: &str) -> Result<UploadedAsset, AssetError> {
    let parsed: UploadResponse = serde_json::from_str(body)
        .map_err(|e| AssetError::MalformedResponse(format!("{e}: {body}")))?;

    if let Some(error) = parsed.error {
        return Err(AssetError::Rejected {
            status,
            message: error.message,
        });
    }
    if !(200..300).contains(&status) {
        return Err(AssetError::Rejected {
            status,
            message: body.to_string(),
        });
    }

    match (parsed.secure_url, parsed.public_id) {
        (Some(secure_url), Some(public_id)) if !secure_url.is_empty() => Ok(UploadedAsset {
            secure_url,
            public_id,
        }),
        _ => Err(AssetError::MalformedResponse(
            "response carries no secure_url".to_string(),
        )),
    }
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    async fn upload_image(
        &self,
        folder: &str,
        image: &ImageUpload,
    ) -> Result<UploadedAsset, AssetError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.credentials.api_secret,
        );

        let file = Part::bytes(image.bytes.clone())
            .file_name(image.filename.clone().unwrap_or_else(|| "upload".to_string()))
            .mime_str(&image.content_type)?;
        let form = Form::new()
            .text("api_key", self.credentials.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", file);

        debug!("Uploading {} bytes to folder '{}'", image.bytes.len(), folder);
        let response = self.client.post(self.upload_url()).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_response(status, &body)
    }
}
