//! # Persistence
//!
//! Two logical collections back the feedback workflow:
//! - `feedback_links`: single-use links keyed by their id.
//! - `feedback_submissions`: recorded submissions keyed by a generated id and
//!   indexed by originating link id and by submission time.
//!
//! The traits below are the only surface the rest of the server sees. `main.rs`
//! constructs one [`sqlite::SqliteStore`] and hands it to every request through
//! `FeedbackState`.

pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::model::link::FeedbackLink;
use common::model::submission::FeedbackSubmission;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored submission could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database call timed out")]
    TimedOut,

    #[error("database worker failed: {0}")]
    Worker(String),
}

impl From<tokio::time::error::Elapsed> for StoreError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        StoreError::TimedOut
    }
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Exact match on the link id. Retired and unknown ids both yield `None`.
    async fn find_link(&self, link_id: &str) -> Result<Option<FeedbackLink>, StoreError>;

    /// Provisions a link. Only `--create-link` calls this; the web routes never create links.
    async fn insert_link(&self, link: &FeedbackLink) -> Result<(), StoreError>;

    /// Deletes the link, returning `false` when nothing was there to delete.
    async fn delete_link(&self, link_id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Single atomic insert. Returns once the write is committed.
    async fn insert_submission(&self, submission: &FeedbackSubmission) -> Result<(), StoreError>;

    async fn submission_by_id(
        &self,
        submission_id: &str,
    ) -> Result<Option<FeedbackSubmission>, StoreError>;

    /// Newest first.
    async fn submissions_for_link(
        &self,
        link_id: &str,
    ) -> Result<Vec<FeedbackSubmission>, StoreError>;

    /// Inclusive on both ends, newest first.
    async fn submissions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FeedbackSubmission>, StoreError>;
}
