use serde::{Deserialize, Serialize};

/// A single-use feedback link as stored in `feedback_links`.
///
/// Links are provisioned with the backend's `--create-link` mode. Whoever holds the `id` may
/// submit feedback exactly once; a successful submission deletes the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackLink {
    /// Opaque capability token, also the path segment of `/feedback/{id}`.
    pub id: String,
    /// Name shown on the form and on the confirmation page.
    pub customer_name: String,
}

impl FeedbackLink {
    pub fn new(id: impl Into<String>, customer_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            customer_name: customer_name.into(),
        }
    }
}

/// What a successful validation hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkInfo {
    pub id: String,
    pub customer_name: String,
}

impl From<FeedbackLink> for LinkInfo {
    fn from(link: FeedbackLink) -> Self {
        Self {
            id: link.id,
            customer_name: link.customer_name,
        }
    }
}
