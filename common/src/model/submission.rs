use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form question to answer mapping. The server does not enforce a schema.
pub type Answers = BTreeMap<String, String>;

/// Request details captured once, when the submission is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub ip_address: String,
    pub user_agent: String,
    pub submitted_at: DateTime<Utc>,
}

/// A recorded feedback submission. Immutable once written.
///
/// `link_id` is a lookup key only: the link it names is usually deleted by the
/// time anyone reads the submission back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub id: String,
    pub link_id: String,
    /// Snapshot of the link's customer name at write time.
    pub customer_name: String,
    pub answers: Answers,
    pub image_url: Option<String>,
    pub metadata: SubmissionMetadata,
}

/// Result of a successful recording, used to render the confirmation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    pub submission_id: String,
    pub customer_name: String,
    pub image_url: Option<String>,
}

impl From<&FeedbackSubmission> for SubmissionRecord {
    fn from(submission: &FeedbackSubmission) -> Self {
        Self {
            submission_id: submission.id.clone(),
            customer_name: submission.customer_name.clone(),
            image_url: submission.image_url.clone(),
        }
    }
}
