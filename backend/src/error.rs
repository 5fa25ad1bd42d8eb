use crate::assets::AssetError;
use crate::services::views;
use crate::store::StoreError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::{error, warn};
use thiserror::Error;

/// Every way a feedback request can fail.
///
/// Client-side kinds (`InvalidRequest`, `LinkNotFound`, `SubmissionNotFound`) never
/// involve a partial write. Server-side kinds abort the request at the step that
/// failed; nothing is retried.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Same outcome for ids that never existed and ids already used.
    #[error("feedback link not found or expired")]
    LinkNotFound,

    #[error("submission {0} not found")]
    SubmissionNotFound(String),

    #[error("image upload failed: {0}")]
    Upload(#[from] AssetError),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    #[error("unhandled failure: {0}")]
    Unhandled(String),
}

impl FeedbackError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        FeedbackError::InvalidRequest(reason.into())
    }

    /// Text shown to the client. Server-side details stay in the log.
    fn public_message(&self) -> String {
        match self {
            FeedbackError::InvalidRequest(reason) => reason.clone(),
            FeedbackError::LinkNotFound => "Feedback link not found or expired".to_string(),
            FeedbackError::SubmissionNotFound(_) => "Submission not found".to_string(),
            FeedbackError::Upload(_) => "Image upload failed".to_string(),
            FeedbackError::Persistence(_) | FeedbackError::Unhandled(_) => {
                "Server error".to_string()
            }
        }
    }
}

/// Logs a failed request at a level matching who is at fault.
pub fn log_failure(context: &str, err: &FeedbackError) {
    if err.status_code().is_server_error() {
        error!("Error {context}: {err}");
    } else {
        warn!("Rejected {context}: {err}");
    }
}

impl ResponseError for FeedbackError {
    fn status_code(&self) -> StatusCode {
        match self {
            FeedbackError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            FeedbackError::LinkNotFound | FeedbackError::SubmissionNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            FeedbackError::Upload(_)
            | FeedbackError::Persistence(_)
            | FeedbackError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = self.public_message();
        let page = match self {
            FeedbackError::SubmissionNotFound(_) => None,
            FeedbackError::LinkNotFound => views::render_not_found(&message).ok(),
            _ => views::render_error(&message).ok(),
        };

        match page {
            Some(html) => HttpResponse::build(self.status_code())
                .content_type(ContentType::html())
                .body(html),
            None => HttpResponse::build(self.status_code())
                .content_type(ContentType::plaintext())
                .body(message),
        }
    }
}
